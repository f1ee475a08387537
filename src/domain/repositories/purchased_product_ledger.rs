use crate::domain::entities::iap_product_id::IapProductId;

/// Durable set of products granted to the user.
///
/// All operations are total. A mutation is visible to the next `is_purchased`
/// call immediately, whether or not it reached durable storage.
///
/// Storage failures are logged, not returned. The transaction observer grants
/// content through `mark_purchased` and then finalizes the transaction with
/// the payment queue regardless, so the platform will not redeliver it. A
/// grant that failed to persist is therefore lost once the process exits;
/// hosts recover it by restoring purchases or validating the receipt.
pub trait PurchasedProductLedger: Send + Sync {
    fn is_purchased(&self, product_id: &IapProductId) -> bool;

    fn mark_purchased(&self, product_id: &IapProductId);

    fn mark_unpurchased(&self, product_id: &IapProductId);
}
