use std::{
    collections::HashSet,
    sync::{PoisonError, RwLock, RwLockWriteGuard},
};

use tracing::{debug, warn};

use crate::{
    data::datasources::purchased_product_datasource::PurchasedProductDatasource,
    domain::{
        entities::iap_product_id::IapProductId,
        repositories::purchased_product_ledger::PurchasedProductLedger,
    },
    errors::IapClientError,
};

pub struct PurchasedProductLedgerImpl<D: PurchasedProductDatasource> {
    datasource: D,
    purchased: RwLock<HashSet<IapProductId>>,
}

impl<D: PurchasedProductDatasource> PurchasedProductLedger for PurchasedProductLedgerImpl<D> {
    fn is_purchased(&self, product_id: &IapProductId) -> bool {
        self.purchased
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(product_id)
    }

    fn mark_purchased(&self, product_id: &IapProductId) {
        let mut purchased = self.write_purchased();
        if purchased.insert(product_id.clone()) {
            debug!(product_id = %product_id, "product marked purchased");
            self.persist(&purchased);
        }
    }

    fn mark_unpurchased(&self, product_id: &IapProductId) {
        let mut purchased = self.write_purchased();
        if purchased.remove(product_id) {
            debug!(product_id = %product_id, "product marked unpurchased");
            self.persist(&purchased);
        }
    }
}

impl<D: PurchasedProductDatasource> PurchasedProductLedgerImpl<D> {
    pub fn new(datasource: D) -> Result<Self, IapClientError> {
        let purchased = datasource.load()?;
        Ok(Self {
            datasource,
            purchased: RwLock::new(purchased),
        })
    }

    fn write_purchased(&self) -> RwLockWriteGuard<'_, HashSet<IapProductId>> {
        self.purchased
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Called with the write lock held, so saves happen in mutation order.
    fn persist(&self, purchased: &HashSet<IapProductId>) {
        if let Err(e) = self.datasource.save(purchased) {
            warn!(error = %e, "purchased product ledger not persisted");
        }
    }
}
