use super::iap_transaction::IapTransaction;

/// Event raised by the purchase workflow for subscribers such as a UI layer.
///
/// Delivered on whichever task produced it. Subscribers that touch interface
/// state must redispatch onto their own UI scheduling context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IapUpdateNotification {
    /// Content for the transaction's product has been granted.
    ProductPurchased { transaction: IapTransaction },
    /// Content for a previously bought product has been re-granted.
    ProductRestored { transaction: IapTransaction },
    /// A purchase or restore did not succeed.
    PurchaseFailed {
        transaction: Option<IapTransaction>,
        reason: PurchaseFailureReason,
    },
    /// The product catalog request failed at the store or network level.
    CatalogFetchFailed { details: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseFailureReason {
    /// The payment queue reported the transaction as failed.
    TransactionFailed,
    /// A restore finished without restoring any transaction.
    NothingToRestore,
    /// The platform reported an error while restoring.
    RestoreFailed { details: String },
}
