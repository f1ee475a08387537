use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    constants::SANDBOX_RECEIPT_SENT_TO_PRODUCTION_STATUS,
    data::models::verify_receipt::request_body_model::VerifyReceiptRequestBodyModel,
    errors::IapClientError,
};

#[async_trait]
pub trait VerifyReceiptApiDatasource: Send + Sync {
    /// verifyReceipt:
    /// https://developer.apple.com/documentation/appstorereceipts/verifyreceipt
    ///
    /// encoded_receipt:
    ///   The base64-encoded receipt data.
    ///
    /// Returns the response body as untyped JSON, since callers need the raw
    /// document when it lacks the expected shape.
    async fn verify_receipt(&self, encoded_receipt: &str) -> Result<Value, IapClientError>;
}

pub struct VerifyReceiptApiDatasourceImpl {
    client: reqwest::Client,
    verify_receipt_url: String,
    sandbox_verify_receipt_url: Option<String>,
    shared_secret: String,
    exclude_old_transactions: bool,
}

#[async_trait]
impl VerifyReceiptApiDatasource for VerifyReceiptApiDatasourceImpl {
    async fn verify_receipt(&self, encoded_receipt: &str) -> Result<Value, IapClientError> {
        let body = VerifyReceiptRequestBodyModel {
            receipt_data: encoded_receipt,
            password: &self.shared_secret,
            exclude_old_transactions: self.exclude_old_transactions.then_some(true),
        };
        self.callout_with_sandbox_fallback(&body).await
    }
}

impl VerifyReceiptApiDatasourceImpl {
    pub fn new(
        verify_receipt_url: String,
        sandbox_verify_receipt_url: Option<String>,
        shared_secret: &str,
        exclude_old_transactions: bool,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_receipt_url,
            sandbox_verify_receipt_url,
            shared_secret: shared_secret.to_owned(),
            exclude_old_transactions,
        }
    }

    async fn callout_with_sandbox_fallback(
        &self,
        body: &VerifyReceiptRequestBodyModel<'_>,
    ) -> Result<Value, IapClientError> {
        // As per Apple's documentation, always verify against production
        // first. A receipt from the test environment is answered with status
        // 21007, in which case the same request is repeated against sandbox.
        //
        // If the sandbox callout fails, the production response is returned.
        let production_response = self
            .callout(&self.verify_receipt_url, body, "verifyReceipt")
            .await?;
        let status = production_response.get("status").and_then(Value::as_i64);
        match (status, &self.sandbox_verify_receipt_url) {
            (Some(SANDBOX_RECEIPT_SENT_TO_PRODUCTION_STATUS), Some(sandbox_url)) => {
                debug!("sandbox receipt sent to production; retrying against sandbox");
                self.callout(sandbox_url, body, "verifyReceipt (sandbox)")
                    .await
                    .or_else(|sandbox_error| {
                        warn!(error = %sandbox_error, "sandbox verification failed");
                        Ok(production_response)
                    })
            }
            _ => Ok(production_response),
        }
    }

    async fn callout(
        &self,
        url: &str,
        body: &VerifyReceiptRequestBodyModel<'_>,
        function_name: &str,
    ) -> Result<Value, IapClientError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| IapClientError::transport(function_name, e))?;

        if !response.status().is_success() {
            return Err(IapClientError::invalid_response(
                function_name,
                format!(
                    "callout returned with {} status code; {}",
                    response.status(),
                    response.text().await.unwrap_or_default()
                ),
            ));
        }

        response.json().await.map_err(|e| {
            IapClientError::invalid_response(
                function_name,
                format!("failed to parse callout response; {}", e),
            )
        })
    }
}
