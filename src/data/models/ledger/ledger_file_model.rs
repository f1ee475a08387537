use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::entities::iap_product_id::IapProductId;

/// On-disk layout of the purchased-product ledger.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct LedgerFileModel {
    #[serde(default)]
    pub(crate) purchased_product_ids: BTreeSet<IapProductId>,
}
