use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    data::{
        datasources::{
            receipt_file_datasource::{ReceiptFileDatasource, ReceiptFileDatasourceImpl},
            utils::parse_receipt_date,
            verify_receipt_api_datasource::{
                VerifyReceiptApiDatasource, VerifyReceiptApiDatasourceImpl,
            },
        },
        models::verify_receipt::latest_receipt_info_model::LatestReceiptInfoModel,
    },
    domain::{
        entities::iap_verification_result::IapVerificationResult,
        repositories::iap_repository::IapRepository,
    },
    errors::IapClientError,
};

pub struct IapRepositoryImpl<A: ReceiptFileDatasource, B: VerifyReceiptApiDatasource> {
    receipt_file_datasource: A,
    verify_receipt_api_datasource: B,
}

/// Repository reading the receipt from disk and verifying it over HTTP.
pub type DefaultIapRepository =
    IapRepositoryImpl<ReceiptFileDatasourceImpl, VerifyReceiptApiDatasourceImpl>;

#[async_trait]
impl<A: ReceiptFileDatasource, B: VerifyReceiptApiDatasource> IapRepository
    for IapRepositoryImpl<A, B>
{
    async fn load_encoded_receipt(&self) -> Result<Option<String>, IapClientError> {
        let Some(receipt) = self.receipt_file_datasource.read_receipt().await? else {
            return Ok(None);
        };
        let encoded = BASE64_STANDARD.encode(receipt);
        self.receipt_file_datasource
            .persist_encoded_receipt(&encoded)
            .await?;
        Ok(Some(encoded))
    }

    async fn verify_receipt(
        &self,
        encoded_receipt: &str,
    ) -> Result<IapVerificationResult, IapClientError> {
        let response = self
            .verify_receipt_api_datasource
            .verify_receipt(encoded_receipt)
            .await?;
        Ok(IapVerificationResult::from_verify_receipt_response(&response))
    }
}

impl DefaultIapRepository {
    pub fn new(
        receipt_file_datasource: ReceiptFileDatasourceImpl,
        verify_receipt_api_datasource: VerifyReceiptApiDatasourceImpl,
    ) -> Self {
        Self {
            receipt_file_datasource,
            verify_receipt_api_datasource,
        }
    }
}

impl IapVerificationResult {
    fn from_verify_receipt_response(response: &Value) -> Self {
        let status = response.get("status").and_then(Value::as_i64);
        match response["latest_receipt_info"].as_array() {
            Some(entries) => Self {
                transaction_ids: entries
                    .iter()
                    .filter_map(|entry| {
                        LatestReceiptInfoModel::deserialize(entry)
                            .map_err(|e| warn!(error = %e, "skipping malformed receipt entry"))
                            .ok()
                    })
                    .map(|entry| entry.transaction_id)
                    .collect(),
                expiration_time: expiration_date_from_response(response),
                status,
                used_raw_fallback: false,
            },
            None => {
                // Response did not have the expected shape. Callers get the
                // whole document back as the single "identifier".
                warn!(
                    ?status,
                    "verification response lacks latest_receipt_info; returning raw response"
                );
                Self {
                    transaction_ids: vec![response.to_string()],
                    expiration_time: None,
                    status,
                    used_raw_fallback: true,
                }
            }
        }
    }
}

/// Expiration of the last entry of `latest_receipt_info`, parsed from its
/// `expires_date` field. `None` if the array, the entry, or the field is
/// missing, or if the date cannot be parsed.
pub(crate) fn expiration_date_from_response(response: &Value) -> Option<DateTime<Utc>> {
    let expires_date = response
        .get("latest_receipt_info")?
        .as_array()?
        .last()?
        .get("expires_date")?
        .as_str()?;
    let parsed = parse_receipt_date(expires_date);
    if parsed.is_none() {
        debug!(expires_date, "unrecognized expires_date format");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    struct StaticReceiptFile {
        receipt: Option<Vec<u8>>,
        persisted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReceiptFileDatasource for StaticReceiptFile {
        async fn read_receipt(&self) -> Result<Option<Vec<u8>>, IapClientError> {
            Ok(self.receipt.clone())
        }

        async fn persist_encoded_receipt(&self, encoded: &str) -> Result<(), IapClientError> {
            self.persisted.lock().unwrap().push(encoded.to_owned());
            Ok(())
        }
    }

    struct StaticVerifyReceiptApi {
        response: Value,
        received: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VerifyReceiptApiDatasource for StaticVerifyReceiptApi {
        async fn verify_receipt(&self, encoded_receipt: &str) -> Result<Value, IapClientError> {
            self.received
                .lock()
                .unwrap()
                .push(encoded_receipt.to_owned());
            Ok(self.response.clone())
        }
    }

    fn repository(
        receipt: Option<Vec<u8>>,
        response: Value,
    ) -> IapRepositoryImpl<StaticReceiptFile, StaticVerifyReceiptApi> {
        IapRepositoryImpl {
            receipt_file_datasource: StaticReceiptFile {
                receipt,
                persisted: Mutex::new(vec![]),
            },
            verify_receipt_api_datasource: StaticVerifyReceiptApi {
                response,
                received: Mutex::new(vec![]),
            },
        }
    }

    #[tokio::test]
    async fn test_encodes_and_persists_receipt() {
        let repo = repository(Some(b"receipt".to_vec()), json!({}));
        let encoded = repo.load_encoded_receipt().await.unwrap();
        assert_eq!(encoded.as_deref(), Some("cmVjZWlwdA=="));
        assert_eq!(
            *repo.receipt_file_datasource.persisted.lock().unwrap(),
            vec!["cmVjZWlwdA==".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_no_receipt_is_not_persisted() {
        let repo = repository(None, json!({}));
        assert_eq!(repo.load_encoded_receipt().await.unwrap(), None);
        let persisted = repo.receipt_file_datasource.persisted.lock().unwrap();
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn test_maps_latest_receipt_info_to_transaction_ids() {
        let repo = repository(
            Some(b"receipt".to_vec()),
            json!({
                "status": 0,
                "latest_receipt_info": [
                    {"transaction_id": "1000", "expires_date": "2029-01-01 00:00:00 Etc/GMT"},
                    {
                        "transaction_id": "1001",
                        "expires_date": "2030-01-01 00:00:00 UTC",
                        "quantity": "1"
                    }
                ]
            }),
        );
        let result = repo.verify_receipt("cmVjZWlwdA==").await.unwrap();
        assert_eq!(result.transaction_ids, vec!["1000", "1001"]);
        assert_eq!(
            result.expiration_time,
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(result.status, Some(0));
        assert!(!result.used_raw_fallback);
        assert_eq!(
            *repo.verify_receipt_api_datasource.received.lock().unwrap(),
            vec!["cmVjZWlwdA==".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_skips_entries_without_transaction_id() {
        let repo = repository(
            Some(b"receipt".to_vec()),
            json!({"latest_receipt_info": [{"product_id": "x"}, {"transaction_id": "7"}]}),
        );
        let result = repo.verify_receipt("x").await.unwrap();
        assert_eq!(result.transaction_ids, vec!["7"]);
        assert_eq!(result.expiration_time, None);
    }

    #[tokio::test]
    async fn test_falls_back_to_raw_response() {
        let response = json!({"status": 21002});
        let repo = repository(Some(b"receipt".to_vec()), response.clone());
        let result = repo.verify_receipt("x").await.unwrap();
        assert_eq!(result.transaction_ids, vec![response.to_string()]);
        assert!(result.used_raw_fallback);
        assert_eq!(result.status, Some(21002));
    }

    #[tokio::test]
    async fn test_non_array_latest_receipt_info_falls_back() {
        let response = json!({"latest_receipt_info": "oops"});
        let repo = repository(Some(b"receipt".to_vec()), response.clone());
        let result = repo.verify_receipt("x").await.unwrap();
        assert_eq!(result.transaction_ids, vec![response.to_string()]);
        assert!(result.used_raw_fallback);
    }

    #[tokio::test]
    async fn test_string_status_does_not_force_fallback() {
        let repo = repository(
            Some(b"receipt".to_vec()),
            json!({"status": "0", "latest_receipt_info": [{"transaction_id": "1001"}]}),
        );
        let result = repo.verify_receipt("x").await.unwrap();
        assert_eq!(result.transaction_ids, vec!["1001"]);
        assert!(!result.used_raw_fallback);
        assert_eq!(result.status, None);
    }

    #[tokio::test]
    async fn test_unexpected_top_level_fields_do_not_force_fallback() {
        let repo = repository(
            Some(b"receipt".to_vec()),
            json!({
                "environment": 1,
                "latest_receipt_info": [{"transaction_id": "1001"}]
            }),
        );
        let result = repo.verify_receipt("x").await.unwrap();
        assert_eq!(result.transaction_ids, vec!["1001"]);
        assert!(!result.used_raw_fallback);
    }

    #[test]
    fn test_expiration_uses_last_entry() {
        let response = json!({"latest_receipt_info": [
            {"transaction_id": "1", "expires_date": "2030-01-01 00:00:00 UTC"},
            {"transaction_id": "2", "expires_date": "2031-06-01 12:00:00 Etc/GMT"}
        ]});
        assert_eq!(
            expiration_date_from_response(&response),
            Some(Utc.with_ymd_and_hms(2031, 6, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_expiration_absent_when_key_missing() {
        assert_eq!(expiration_date_from_response(&json!({})), None);
        assert_eq!(
            expiration_date_from_response(
                &json!({"latest_receipt_info": [{"transaction_id": "1"}]})
            ),
            None
        );
        assert_eq!(
            expiration_date_from_response(&json!({"latest_receipt_info": []})),
            None
        );
    }
}
