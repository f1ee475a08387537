use chrono::{DateTime, Utc};

/// Server-side view of the local receipt. Derived per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapVerificationResult {
    /// Transaction identifiers from `latest_receipt_info`, or a single entry
    /// holding the whole response as JSON text if that array was missing.
    pub transaction_ids: Vec<String>,
    /// Expiration of the most recent entry, for subscriptions.
    pub expiration_time: Option<DateTime<Utc>>,
    /// Raw `status` field of the response, when present.
    pub status: Option<i64>,
    /// Set when `transaction_ids` holds the raw-response fallback instead of
    /// real identifiers.
    pub used_raw_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl SubscriptionStatus {
    /// A subscription is active strictly before its expiration time.
    pub fn at(expiration_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if expiration_time > now {
            SubscriptionStatus::Active
        } else {
            SubscriptionStatus::Inactive
        }
    }
}
