use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::IapClientConfig,
    data::{
        datasources::{
            receipt_file_datasource::ReceiptFileDatasourceImpl,
            verify_receipt_api_datasource::VerifyReceiptApiDatasourceImpl,
        },
        repositories::iap_repository_impl::{self, DefaultIapRepository},
    },
    domain::{
        entities::iap_verification_result::{IapVerificationResult, SubscriptionStatus},
        repositories::iap_repository::IapRepository,
    },
    errors::IapClientError,
    secrets::{IapSecretsConfig, SecretValues},
};

/// Reconciles the local receipt against the verification endpoint's view.
pub struct ReceiptValidator<R: IapRepository> {
    iap_repository: R,
}

impl<R: IapRepository> ReceiptValidator<R> {
    pub fn new(iap_repository: R) -> Self {
        Self { iap_repository }
    }

    /// Sends the local receipt for verification.
    ///
    /// Returns `Ok(None)` without contacting the endpoint if the platform has
    /// not issued a receipt yet. Network failures are returned as
    /// [`IapClientError::ValidationTransportFailed`] and are not retried.
    ///
    /// If the response has no `latest_receipt_info` array, the result holds
    /// the whole response as JSON text in place of transaction identifiers
    /// and `used_raw_fallback` is set.
    pub async fn validate_receipt(&self) -> Result<Option<IapVerificationResult>, IapClientError> {
        let Some(encoded_receipt) = self.iap_repository.load_encoded_receipt().await? else {
            debug!("no local receipt; skipping validation");
            return Ok(None);
        };
        let result = self.iap_repository.verify_receipt(&encoded_receipt).await?;
        info!(
            transactions = result.transaction_ids.len(),
            status = ?result.status,
            used_raw_fallback = result.used_raw_fallback,
            "receipt validated"
        );
        if let Some(expiration_time) = result.expiration_time {
            update_expiration(expiration_time);
        }
        Ok(Some(result))
    }
}

impl ReceiptValidator<DefaultIapRepository> {
    pub fn from_config(
        config: &IapClientConfig,
        secrets: &SecretValues,
    ) -> Result<Self, IapClientError> {
        Ok(Self::new(DefaultIapRepository::new(
            ReceiptFileDatasourceImpl::new(
                config.receipt_path.clone(),
                config.encoded_receipt_path.clone(),
            ),
            VerifyReceiptApiDatasourceImpl::new(
                config.verify_receipt_url.clone(),
                config.sandbox_verify_receipt_url.clone(),
                secrets.get(&IapSecretsConfig::AppStoreSharedSecret)?,
                config.exclude_old_transactions,
            ),
        )))
    }
}

/// Expiration of the last `latest_receipt_info` entry of a verification
/// response, from its `expires_date` field.
pub fn expiration_date_from_response(response: &Value) -> Option<DateTime<Utc>> {
    iap_repository_impl::expiration_date_from_response(response)
}

/// Classifies the subscription against the current time. The status is only
/// logged for now; hosts that need it call [`SubscriptionStatus::at`].
pub fn update_expiration(expiration_time: DateTime<Utc>) -> SubscriptionStatus {
    let status = SubscriptionStatus::at(expiration_time, Utc::now());
    info!(%expiration_time, ?status, "subscription expiration updated");
    status
}
