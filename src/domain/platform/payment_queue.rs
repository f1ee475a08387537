use std::sync::Arc;

use crate::{
    domain::entities::iap_transaction::{IapPayment, IapTransaction},
    errors::PlatformError,
};

/// The platform payment queue. Implemented by the host's platform bridge; the
/// queue owns the payment state machine and its durability.
pub trait PaymentQueue: Send + Sync {
    /// Submits a payment. The outcome arrives later through
    /// [`TransactionQueueListener::updated_transactions`].
    fn add_payment(&self, payment: IapPayment);

    /// Registers a listener for transaction updates and restore callbacks.
    fn add_transaction_observer(&self, observer: Arc<dyn TransactionQueueListener>);

    /// Removes the transaction from the queue so it is never redelivered.
    fn finish_transaction(&self, transaction: &IapTransaction);

    /// Asks the platform to redeliver every completed non-consumable
    /// transaction as `Restored`.
    fn restore_completed_transactions(&self);

    /// Whether the user is allowed to make payments (false under parental
    /// controls, for example). Callers check this before purchasing; it is
    /// not enforced by the workflow.
    fn can_make_payments(&self) -> bool;
}

/// Callback contract the payment queue invokes, on a thread of its choosing.
pub trait TransactionQueueListener: Send + Sync {
    fn updated_transactions(&self, queue: &dyn PaymentQueue, transactions: &[IapTransaction]);

    fn restore_completed_transactions_finished(&self, queue: &dyn PaymentQueue);

    fn restore_completed_transactions_failed(&self, queue: &dyn PaymentQueue, error: PlatformError);
}
