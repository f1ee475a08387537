#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst, TimestampMilliSeconds};

/// Entry of `latest_receipt_info` in a verifyReceipt response.
///
/// https://developer.apple.com/documentation/appstorereceipts/responsebody/latest_receipt_info
///
/// Numeric values are delivered as strings by the endpoint; plain JSON numbers
/// are accepted as well.
#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct LatestReceiptInfoModel {
    /// A unique identifier for a transaction such as a purchase, restore, or
    /// renewal.
    pub(crate) transaction_id: String,
    /// The transaction identifier of the original purchase.
    pub(crate) original_transaction_id: Option<String>,
    /// The unique identifier of the product purchased.
    pub(crate) product_id: Option<String>,
    /// The number of consumable products purchased.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub(crate) quantity: Option<u32>,
    /// The time the App Store charged the user's account, in a date-time
    /// format similar to ISO 8601.
    pub(crate) purchase_date: Option<String>,
    /// The time a subscription expires or when it will renew, in a date-time
    /// format similar to ISO 8601.
    pub(crate) expires_date: Option<String>,
    /// The time a subscription expires or when it will renew, in UNIX epoch
    /// time format, in milliseconds.
    #[serde_as(
        as = "Option<PickFirst<(TimestampMilliSeconds<String>, TimestampMilliSeconds<i64>)>>"
    )]
    pub(crate) expires_date_ms: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_accepts_stringly_and_plain_numbers() {
        let stringly: LatestReceiptInfoModel = serde_json::from_value(json!({
            "transaction_id": "1001",
            "quantity": "2",
            "expires_date_ms": "1893456000000"
        }))
        .unwrap();
        let plain: LatestReceiptInfoModel = serde_json::from_value(json!({
            "transaction_id": "1001",
            "quantity": 2,
            "expires_date_ms": 1893456000000_i64
        }))
        .unwrap();
        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for model in [stringly, plain] {
            assert_eq!(model.quantity, Some(2));
            assert_eq!(model.expires_date_ms, Some(expected));
        }
    }

    #[test]
    fn test_optional_fields_may_be_missing() {
        let model: LatestReceiptInfoModel =
            serde_json::from_value(json!({"transaction_id": "1001"})).unwrap();
        assert_eq!(model.quantity, None);
        assert_eq!(model.expires_date, None);
        assert_eq!(model.expires_date_ms, None);
    }
}
