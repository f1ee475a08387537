use thiserror::Error;

#[derive(Debug, Error)]
pub enum IapClientError {
    #[error("Product catalog request failed: {0}.")]
    CatalogFetchFailed(String),
    #[error("Product catalog request was superseded by a newer request.")]
    CatalogRequestSuperseded,

    #[error("Local receipt could not be read: {0}.")]
    ReceiptUnreadable(String),
    #[error("Encoded receipt could not be persisted: {0}.")]
    ReceiptPersistFailed(String),
    #[error("Error calling out to receipt verification endpoint ({function_name}): {details}.")]
    ValidationTransportFailed {
        function_name: String,
        details: String,
    },
    #[error("Invalid response from receipt verification endpoint ({function_name}): {details}.")]
    ValidationInvalidResponse {
        function_name: String,
        details: String,
    },

    #[error("Purchased product ledger could not be persisted: {0}.")]
    LedgerPersistFailed(String),

    #[error("Missing secret '{0}'.")]
    SecretMissing(&'static str),
    #[error("Invalid configuration value for '{key}': {details}.")]
    InvalidConfig { key: &'static str, details: String },
}

impl IapClientError {
    pub(crate) fn transport(function_name: &str, details: impl std::fmt::Debug) -> Self {
        Self::ValidationTransportFailed {
            function_name: function_name.to_owned(),
            details: format!("{:?}", details),
        }
    }

    pub(crate) fn invalid_response(function_name: &str, details: impl Into<String>) -> Self {
        Self::ValidationInvalidResponse {
            function_name: function_name.to_owned(),
            details: details.into(),
        }
    }
}

/// Failure reported by a platform collaborator (payment queue or product
/// catalog). The platform's error is opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
