use serde::Serialize;

/// Request body for the verifyReceipt endpoint.
///
/// https://developer.apple.com/documentation/appstorereceipts/requestbody
///
/// Deliberately not `Debug`, since it carries the shared secret.
#[derive(Serialize)]
pub(crate) struct VerifyReceiptRequestBodyModel<'a> {
    /// The Base64-encoded receipt data.
    #[serde(rename = "receipt-data")]
    pub(crate) receipt_data: &'a str,
    /// Your app's shared secret, which is a hexadecimal string.
    pub(crate) password: &'a str,
    /// Set this value to true for the response to include only the latest
    /// renewal transaction for any subscriptions.
    #[serde(
        rename = "exclude-old-transactions",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) exclude_old_transactions: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_wire_field_names() {
        let body = VerifyReceiptRequestBodyModel {
            receipt_data: "MIIB",
            password: "secret",
            exclude_old_transactions: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"receipt-data": "MIIB", "password": "secret"})
        );
    }
}
