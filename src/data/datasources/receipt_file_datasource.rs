use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::IapClientError;

#[async_trait]
pub trait ReceiptFileDatasource: Send + Sync {
    /// Reads the platform-issued receipt blob. `None` if no receipt exists.
    async fn read_receipt(&self) -> Result<Option<Vec<u8>>, IapClientError>;

    /// Stores the base64 receipt text where the host application can reuse it.
    async fn persist_encoded_receipt(&self, encoded_receipt: &str) -> Result<(), IapClientError>;
}

pub struct ReceiptFileDatasourceImpl {
    receipt_path: PathBuf,
    encoded_receipt_path: Option<PathBuf>,
}

#[async_trait]
impl ReceiptFileDatasource for ReceiptFileDatasourceImpl {
    async fn read_receipt(&self) -> Result<Option<Vec<u8>>, IapClientError> {
        let exists = tokio::fs::try_exists(&self.receipt_path)
            .await
            .map_err(|e| IapClientError::ReceiptUnreadable(e.to_string()))?;
        if !exists {
            return Ok(None);
        }
        tokio::fs::read(&self.receipt_path)
            .await
            .map(Some)
            .map_err(|e| {
                IapClientError::ReceiptUnreadable(format!(
                    "{}: {}",
                    self.receipt_path.display(),
                    e
                ))
            })
    }

    async fn persist_encoded_receipt(&self, encoded_receipt: &str) -> Result<(), IapClientError> {
        let Some(path) = &self.encoded_receipt_path else {
            return Ok(());
        };
        tokio::fs::write(path, encoded_receipt)
            .await
            .map_err(|e| IapClientError::ReceiptPersistFailed(format!("{}: {}", path.display(), e)))
    }
}

impl ReceiptFileDatasourceImpl {
    pub fn new(receipt_path: PathBuf, encoded_receipt_path: Option<PathBuf>) -> Self {
        Self {
            receipt_path,
            encoded_receipt_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_receipt_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let datasource = ReceiptFileDatasourceImpl::new(dir.path().join("receipt"), None);
        assert_eq!(datasource.read_receipt().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reads_receipt_and_persists_encoded_text() {
        let dir = tempfile::tempdir().unwrap();
        let receipt_path = dir.path().join("receipt");
        let encoded_path = dir.path().join("receipt.b64");
        tokio::fs::write(&receipt_path, b"\x30\x82\x01")
            .await
            .unwrap();
        let datasource = ReceiptFileDatasourceImpl::new(receipt_path, Some(encoded_path.clone()));

        assert_eq!(
            datasource.read_receipt().await.unwrap(),
            Some(b"\x30\x82\x01".to_vec())
        );
        datasource.persist_encoded_receipt("MIIB").await.unwrap();
        assert_eq!(
            tokio::fs::read_to_string(encoded_path).await.unwrap(),
            "MIIB"
        );
    }
}
