/// Legacy App Store receipt verification endpoint (production).
pub const PRODUCTION_VERIFY_RECEIPT_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";

/// Legacy App Store receipt verification endpoint (sandbox).
pub const SANDBOX_VERIFY_RECEIPT_URL: &str = "https://sandbox.itunes.apple.com/verifyReceipt";

/// Status returned by the production endpoint when it is handed a receipt from
/// the sandbox environment.
pub const SANDBOX_RECEIPT_SENT_TO_PRODUCTION_STATUS: i64 = 21007;

pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// How many finalized transaction ids are remembered to suppress redeliveries.
pub const FINALIZED_TRANSACTION_CAPACITY: usize = 1024;

pub const DEFAULT_RECEIPT_PATH: &str = "StoreKit/receipt";
pub const DEFAULT_LEDGER_PATH: &str = "purchased_products.json";
