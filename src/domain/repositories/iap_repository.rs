use async_trait::async_trait;

use crate::{
    domain::entities::iap_verification_result::IapVerificationResult, errors::IapClientError,
};

#[async_trait]
pub trait IapRepository: Send + Sync {
    /// Reads the local receipt and returns it as base64 text, persisting the
    /// text for reuse by the host. `None` if the platform has not issued a
    /// receipt yet.
    async fn load_encoded_receipt(&self) -> Result<Option<String>, IapClientError>;

    /// Sends the encoded receipt to the verification endpoint.
    async fn verify_receipt(
        &self,
        encoded_receipt: &str,
    ) -> Result<IapVerificationResult, IapClientError>;
}
