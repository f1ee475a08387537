use std::collections::HashSet;

use async_trait::async_trait;

use crate::{
    domain::entities::{iap_product::IapProduct, iap_product_id::IapProductId},
    errors::PlatformError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductsResponse {
    pub products: Vec<IapProduct>,
    /// Requested identifiers the store does not recognize.
    pub invalid_product_ids: Vec<IapProductId>,
}

/// The platform product catalog. Implemented by the host's platform bridge.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn request_products(
        &self,
        product_ids: &HashSet<IapProductId>,
    ) -> Result<ProductsResponse, PlatformError>;
}
