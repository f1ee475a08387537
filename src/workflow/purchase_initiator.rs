use std::sync::Arc;

use tracing::info;

use crate::domain::{
    entities::{iap_product::IapProduct, iap_transaction::IapPayment},
    platform::payment_queue::PaymentQueue,
};

/// Submits payments and restore requests to the platform queue. Outcomes are
/// reported only through the transaction observer.
pub struct PurchaseInitiator<Q: PaymentQueue> {
    queue: Arc<Q>,
}

impl<Q: PaymentQueue> PurchaseInitiator<Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// Fire-and-forget. If the platform cannot accept the payment, a `Failed`
    /// transaction is delivered later; there is no synchronous error.
    ///
    /// Callers are expected to check [`Self::can_make_payments`] first.
    pub fn purchase(&self, product: &IapProduct) {
        info!(product_id = %product.id, "submitting payment");
        self.queue.add_payment(IapPayment::new(product.id.clone()));
    }

    pub fn restore_purchases(&self) {
        info!("restoring completed transactions");
        self.queue.restore_completed_transactions();
    }

    pub fn can_make_payments(&self) -> bool {
        self.queue.can_make_payments()
    }
}
