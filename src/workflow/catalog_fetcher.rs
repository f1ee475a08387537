use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        entities::{
            iap_product::IapProduct, iap_product_id::IapProductId,
            iap_update_notification::IapUpdateNotification,
        },
        platform::product_catalog::ProductCatalog,
    },
    errors::IapClientError,
    workflow::iap_events::IapEvents,
};

struct InFlightRequest {
    request_id: u64,
    supersede: oneshot::Sender<()>,
}

/// Fetches product metadata from the platform catalog.
///
/// At most one request is in flight per fetcher. Starting a new request
/// supersedes the pending one, which then resolves with
/// [`IapClientError::CatalogRequestSuperseded`].
pub struct CatalogFetcher<C: ProductCatalog> {
    catalog: C,
    events: IapEvents,
    next_request_id: AtomicU64,
    in_flight: Mutex<Option<InFlightRequest>>,
}

impl<C: ProductCatalog> CatalogFetcher<C> {
    pub fn new(catalog: C, events: IapEvents) -> Self {
        Self {
            catalog,
            events,
            next_request_id: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Returns every requested product the store recognizes. Identifiers the
    /// store does not know are left out of the result; that is not an error.
    pub async fn fetch_products(
        &self,
        product_ids: HashSet<IapProductId>,
    ) -> Result<Vec<IapProduct>, IapClientError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (supersede, superseded) = oneshot::channel();
        if let Some(previous) = self.lock_in_flight().replace(InFlightRequest {
            request_id,
            supersede,
        }) {
            debug!(
                superseded_request_id = previous.request_id,
                request_id, "superseding in-flight catalog request"
            );
            let _ = previous.supersede.send(());
        }

        let response = tokio::select! {
            response = self.catalog.request_products(&product_ids) => Some(response),
            _ = superseded => None,
        };
        self.clear_in_flight(request_id);

        match response {
            None => Err(IapClientError::CatalogRequestSuperseded),
            Some(Ok(response)) => {
                if !response.invalid_product_ids.is_empty() {
                    info!(
                        invalid_product_ids = ?response.invalid_product_ids,
                        "store did not recognize some product identifiers"
                    );
                }
                Ok(response.products)
            }
            Some(Err(e)) => {
                warn!(error = %e, "product catalog request failed");
                self.events.emit(IapUpdateNotification::CatalogFetchFailed {
                    details: e.to_string(),
                });
                Err(IapClientError::CatalogFetchFailed(e.to_string()))
            }
        }
    }

    fn clear_in_flight(&self, request_id: u64) {
        let mut in_flight = self.lock_in_flight();
        if in_flight.as_ref().map(|r| r.request_id) == Some(request_id) {
            *in_flight = None;
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlightRequest>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::{entities::iap_product::PriceInfo, platform::product_catalog::ProductsResponse},
        errors::PlatformError,
    };

    fn product(sku: &str) -> IapProduct {
        IapProduct {
            id: IapProductId::from(sku),
            display_title: format!("{sku} title"),
            display_description: format!("{sku} description"),
            price_info: PriceInfo {
                price_micros: 990_000,
                currency_iso_4217: "USD".to_owned(),
            },
        }
    }

    /// Knows `com.app.pro` only. When `hang_first` is set, the first request
    /// never completes.
    struct MockCatalog {
        calls: AtomicUsize,
        hang_first: bool,
        fail: bool,
    }

    impl MockCatalog {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                hang_first: false,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ProductCatalog for MockCatalog {
        async fn request_products(
            &self,
            product_ids: &HashSet<IapProductId>,
        ) -> Result<ProductsResponse, PlatformError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_first && call == 0 {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(PlatformError::new("network unreachable"));
            }
            let (known, unknown): (Vec<_>, Vec<_>) = product_ids
                .iter()
                .cloned()
                .partition(|id| id.sku() == "com.app.pro");
            Ok(ProductsResponse {
                products: known.iter().map(|id| product(id.sku())).collect(),
                invalid_product_ids: unknown,
            })
        }
    }

    fn ids(skus: &[&str]) -> HashSet<IapProductId> {
        skus.iter().map(|s| IapProductId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_unknown_identifiers_are_omitted() {
        let fetcher = CatalogFetcher::new(MockCatalog::new(), IapEvents::new(8));
        let products = fetcher
            .fetch_products(ids(&["com.app.pro", "com.app.unknown"]))
            .await
            .unwrap();
        assert_eq!(products, vec![product("com.app.pro")]);
    }

    #[tokio::test]
    async fn test_failure_raises_event_and_allows_next_request() {
        let events = IapEvents::new(8);
        let mut rx = events.subscribe();
        let mut catalog = MockCatalog::new();
        catalog.fail = true;
        let fetcher = CatalogFetcher::new(catalog, events);

        let result = fetcher.fetch_products(ids(&["com.app.pro"])).await;
        assert!(matches!(result, Err(IapClientError::CatalogFetchFailed(_))));
        assert_eq!(
            rx.try_recv().unwrap(),
            IapUpdateNotification::CatalogFetchFailed {
                details: "network unreachable".to_owned()
            }
        );
        assert!(fetcher.lock_in_flight().is_none());

        let result = fetcher.fetch_products(ids(&["com.app.pro"])).await;
        assert!(matches!(result, Err(IapClientError::CatalogFetchFailed(_))));
        assert_eq!(fetcher.catalog.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_request_supersedes_first() {
        let events = IapEvents::new(8);
        let mut rx = events.subscribe();
        let mut catalog = MockCatalog::new();
        catalog.hang_first = true;
        let fetcher = CatalogFetcher::new(catalog, events);

        let (first, second) = tokio::join!(
            fetcher.fetch_products(ids(&["com.app.pro"])),
            fetcher.fetch_products(ids(&["com.app.pro"])),
        );
        assert!(matches!(first, Err(IapClientError::CatalogRequestSuperseded)));
        assert_eq!(second.unwrap(), vec![product("com.app.pro")]);
        assert!(fetcher.lock_in_flight().is_none());
        // Superseding is not a store failure.
        assert!(rx.try_recv().is_err());
    }
}
