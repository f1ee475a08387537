use super::iap_product_id::IapProductId;

/// Product metadata as reported by the platform store. Only lives for the
/// duration of one catalog request; never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapProduct {
    pub id: IapProductId,
    pub display_title: String,
    pub display_description: String,
    pub price_info: PriceInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceInfo {
    /// Price in micro-units of the currency (1,000,000 = 1 unit).
    pub price_micros: i64,
    /// ISO 4217 currency code of the storefront.
    pub currency_iso_4217: String,
}
