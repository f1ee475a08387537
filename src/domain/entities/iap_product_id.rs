use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque store identifier of a purchasable item (the product's SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IapProductId(pub String);

impl IapProductId {
    pub fn new(sku: impl Into<String>) -> Self {
        Self(sku.into())
    }

    pub fn sku(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for IapProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IapProductId {
    fn from(sku: &str) -> Self {
        Self(sku.to_owned())
    }
}
