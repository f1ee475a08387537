use std::path::PathBuf;

use crate::{
    constants::{
        DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_LEDGER_PATH, DEFAULT_RECEIPT_PATH,
        PRODUCTION_VERIFY_RECEIPT_URL, SANDBOX_VERIFY_RECEIPT_URL,
    },
    errors::IapClientError,
};

#[derive(Debug, Clone)]
pub struct IapClientConfig {
    /// Receipt verification endpoint tried first.
    pub verify_receipt_url: String,
    /// Endpoint retried when the first one reports a sandbox receipt. `None`
    /// disables the retry.
    pub sandbox_verify_receipt_url: Option<String>,
    /// Location of the platform-issued receipt blob.
    pub receipt_path: PathBuf,
    /// Where the base64 receipt text is persisted for reuse by the host, if
    /// anywhere.
    pub encoded_receipt_path: Option<PathBuf>,
    /// JSON file backing the purchased-product ledger.
    pub ledger_path: PathBuf,
    pub event_channel_capacity: usize,
    pub exclude_old_transactions: bool,
}

impl Default for IapClientConfig {
    fn default() -> Self {
        Self {
            verify_receipt_url: PRODUCTION_VERIFY_RECEIPT_URL.to_owned(),
            sandbox_verify_receipt_url: Some(SANDBOX_VERIFY_RECEIPT_URL.to_owned()),
            receipt_path: PathBuf::from(DEFAULT_RECEIPT_PATH),
            encoded_receipt_path: None,
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            exclude_old_transactions: false,
        }
    }
}

impl IapClientConfig {
    /// Builds the config from `IAP_*` environment variables (after loading
    /// `.env`, if present). Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, IapClientError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, IapClientError> {
        let mut config = Self::default();
        if let Some(url) = lookup("IAP_VERIFY_RECEIPT_URL") {
            config.verify_receipt_url = url;
        }
        if let Some(url) = lookup("IAP_SANDBOX_VERIFY_RECEIPT_URL") {
            config.sandbox_verify_receipt_url = (!url.is_empty()).then_some(url);
        }
        if let Some(path) = lookup("IAP_RECEIPT_PATH") {
            config.receipt_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("IAP_ENCODED_RECEIPT_PATH") {
            config.encoded_receipt_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(path) = lookup("IAP_LEDGER_PATH") {
            config.ledger_path = PathBuf::from(path);
        }
        if let Some(capacity) = lookup("IAP_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = match capacity.parse::<usize>() {
                Ok(0) => {
                    return Err(IapClientError::InvalidConfig {
                        key: "IAP_EVENT_CHANNEL_CAPACITY",
                        details: "must be greater than zero".to_owned(),
                    })
                }
                Ok(c) => c,
                Err(e) => {
                    return Err(IapClientError::InvalidConfig {
                        key: "IAP_EVENT_CHANNEL_CAPACITY",
                        details: e.to_string(),
                    })
                }
            };
        }
        if let Some(flag) = lookup("IAP_EXCLUDE_OLD_TRANSACTIONS") {
            let exclude = flag.parse::<bool>().map_err(|e| IapClientError::InvalidConfig {
                key: "IAP_EXCLUDE_OLD_TRANSACTIONS",
                details: e.to_string(),
            })?;
            config.exclude_old_transactions = exclude;
        }
        Ok(config)
    }
}
