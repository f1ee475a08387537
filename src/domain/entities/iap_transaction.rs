use chrono::{DateTime, Utc};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::iap_product_id::IapProductId;

/// A request to buy one product, handed to the payment queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapPayment {
    pub product_id: IapProductId,
    pub quantity: u32,
}

impl IapPayment {
    pub fn new(product_id: IapProductId) -> Self {
        Self {
            product_id,
            quantity: 1,
        }
    }
}

/// Lifecycle state of a transaction in the platform payment queue. The
/// discriminants match the platform's raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum IapTransactionState {
    /// Being processed by the store; a later update will follow.
    Purchasing = 0,
    /// Charged successfully; content should be granted.
    Purchased = 1,
    /// Cancelled or failed before being charged.
    Failed = 2,
    /// Re-granted from the user's purchase history.
    Restored = 3,
    /// Awaiting an external action, such as parental approval.
    Deferred = 4,
}

/// A single purchase or restore attempt tracked by the platform payment queue.
/// Created by the platform and observed here, never constructed by the
/// workflow itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapTransaction {
    pub id: String,
    pub payment: IapPayment,
    pub state: IapTransactionState,
    /// For restores, the transaction that originally bought the product.
    pub original: Option<Box<IapTransaction>>,
    pub transaction_date: Option<DateTime<Utc>>,
    /// Platform-provided description of the failure, for `Failed` transactions.
    pub error: Option<String>,
}

impl IapTransaction {
    pub fn new(
        id: impl Into<String>,
        product_id: IapProductId,
        state: IapTransactionState,
    ) -> Self {
        Self {
            id: id.into(),
            payment: IapPayment::new(product_id),
            state,
            original: None,
            transaction_date: None,
            error: None,
        }
    }

    pub fn with_original(mut self, original: IapTransaction) -> Self {
        self.original = Some(Box::new(original));
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn product_id(&self) -> &IapProductId {
        &self.payment.product_id
    }

    /// Product a restore should re-grant: the original transaction's product
    /// if the platform supplied one, otherwise this transaction's own payment.
    pub fn restored_product_id(&self) -> Option<&IapProductId> {
        let id = match &self.original {
            Some(original) => original.product_id(),
            None => self.product_id(),
        };
        (!id.is_empty()).then_some(id)
    }
}
