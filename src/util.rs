use std::{collections::HashSet, sync::Arc};

use tokio::sync::broadcast;

use crate::{
    config::IapClientConfig,
    data::{
        datasources::purchased_product_datasource::PurchasedProductFileDatasourceImpl,
        repositories::{
            iap_repository_impl::DefaultIapRepository,
            purchased_product_ledger_impl::PurchasedProductLedgerImpl,
        },
    },
    domain::{
        entities::{
            iap_product::IapProduct, iap_product_id::IapProductId,
            iap_update_notification::IapUpdateNotification,
            iap_verification_result::IapVerificationResult,
        },
        platform::{payment_queue::PaymentQueue, product_catalog::ProductCatalog},
        repositories::{
            iap_repository::IapRepository, purchased_product_ledger::PurchasedProductLedger,
        },
    },
    errors::IapClientError,
    secrets::SecretValues,
    workflow::{
        catalog_fetcher::CatalogFetcher, iap_events::IapEvents,
        purchase_initiator::PurchaseInitiator, receipt_validator::ReceiptValidator,
        transaction_observer::TransactionObserver,
    },
};

/// Composition root of the purchase workflow. Owns one instance of every
/// component and registers the transaction observer with the payment queue.
pub struct IapClientUtil<Q, C, L, R>
where
    Q: PaymentQueue,
    C: ProductCatalog,
    L: PurchasedProductLedger + 'static,
    R: IapRepository,
{
    events: IapEvents,
    ledger: Arc<L>,
    catalog_fetcher: CatalogFetcher<C>,
    purchase_initiator: PurchaseInitiator<Q>,
    receipt_validator: ReceiptValidator<R>,
}

impl<Q, C, L, R> IapClientUtil<Q, C, L, R>
where
    Q: PaymentQueue,
    C: ProductCatalog,
    L: PurchasedProductLedger + 'static,
    R: IapRepository,
{
    pub fn from_parts(
        queue: Arc<Q>,
        catalog: C,
        ledger: Arc<L>,
        iap_repository: R,
        event_channel_capacity: usize,
    ) -> Self {
        Self::assemble(
            queue,
            catalog,
            ledger,
            ReceiptValidator::new(iap_repository),
            event_channel_capacity,
        )
    }

    fn assemble(
        queue: Arc<Q>,
        catalog: C,
        ledger: Arc<L>,
        receipt_validator: ReceiptValidator<R>,
        event_channel_capacity: usize,
    ) -> Self {
        let events = IapEvents::new(event_channel_capacity);
        let observer = Arc::new(TransactionObserver::new(ledger.clone(), events.clone()));
        queue.add_transaction_observer(observer);
        Self {
            catalog_fetcher: CatalogFetcher::new(catalog, events.clone()),
            purchase_initiator: PurchaseInitiator::new(queue),
            receipt_validator,
            ledger,
            events,
        }
    }

    /// Subscribes to purchase, restore and failure notifications. Each
    /// subscriber only sees notifications raised after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<IapUpdateNotification> {
        self.events.subscribe()
    }

    pub fn is_purchased(&self, product_id: &IapProductId) -> bool {
        self.ledger.is_purchased(product_id)
    }

    /// Revokes a previously granted product.
    pub fn mark_unpurchased(&self, product_id: &IapProductId) {
        self.ledger.mark_unpurchased(product_id)
    }

    pub async fn fetch_products(
        &self,
        product_ids: HashSet<IapProductId>,
    ) -> Result<Vec<IapProduct>, IapClientError> {
        self.catalog_fetcher.fetch_products(product_ids).await
    }

    pub fn can_make_payments(&self) -> bool {
        self.purchase_initiator.can_make_payments()
    }

    pub fn purchase(&self, product: &IapProduct) {
        self.purchase_initiator.purchase(product)
    }

    pub fn restore_purchases(&self) {
        self.purchase_initiator.restore_purchases()
    }

    pub async fn validate_receipt(&self) -> Result<Option<IapVerificationResult>, IapClientError> {
        self.receipt_validator.validate_receipt().await
    }
}

impl<Q: PaymentQueue, C: ProductCatalog>
    IapClientUtil<
        Q,
        C,
        PurchasedProductLedgerImpl<PurchasedProductFileDatasourceImpl>,
        DefaultIapRepository,
    >
{
    pub fn new(
        config: &IapClientConfig,
        secrets: &SecretValues,
        queue: Arc<Q>,
        catalog: C,
    ) -> Result<Self, IapClientError> {
        let ledger = PurchasedProductLedgerImpl::new(PurchasedProductFileDatasourceImpl::new(
            config.ledger_path.clone(),
        ))?;
        Ok(Self::assemble(
            queue,
            catalog,
            Arc::new(ledger),
            ReceiptValidator::from_config(config, secrets)?,
            config.event_channel_capacity,
        ))
    }
}
