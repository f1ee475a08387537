use std::{collections::HashMap, fmt};

use crate::errors::IapClientError;

pub const APP_STORE_SHARED_SECRET: &str = "APP_STORE_SHARED_SECRET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IapSecretsConfig {
    /// App-specific shared secret sent as `password` with every receipt
    /// verification request.
    AppStoreSharedSecret,
}

impl IapSecretsConfig {
    pub const ALL: [IapSecretsConfig; 1] = [IapSecretsConfig::AppStoreSharedSecret];

    pub fn key(&self) -> &'static str {
        match self {
            IapSecretsConfig::AppStoreSharedSecret => APP_STORE_SHARED_SECRET,
        }
    }
}

/// Secret values loaded from the secret store (the process environment, after
/// `.env` has been applied). Values are never printed.
#[derive(Clone, Default)]
pub struct SecretValues {
    values: HashMap<IapSecretsConfig, String>,
}

impl SecretValues {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let values = IapSecretsConfig::ALL
            .iter()
            .filter_map(|secret| {
                std::env::var(secret.key())
                    .ok()
                    .filter(|value| !value.is_empty())
                    .map(|value| (*secret, value))
            })
            .collect();
        Self { values }
    }

    pub fn with(mut self, secret: IapSecretsConfig, value: impl Into<String>) -> Self {
        self.values.insert(secret, value.into());
        self
    }

    pub fn get(&self, secret: &IapSecretsConfig) -> Result<&str, IapClientError> {
        self.values
            .get(secret)
            .map(String::as_str)
            .ok_or(IapClientError::SecretMissing(secret.key()))
    }
}

impl fmt::Debug for SecretValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.keys().map(|k| (k.key(), "<redacted>")))
            .finish()
    }
}
