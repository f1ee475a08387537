use std::{
    collections::{BTreeSet, HashSet},
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{
    data::models::ledger::ledger_file_model::LedgerFileModel,
    domain::entities::iap_product_id::IapProductId, errors::IapClientError,
};

pub trait PurchasedProductDatasource: Send + Sync {
    /// Loads the persisted set. A ledger that was never written is empty.
    fn load(&self) -> Result<HashSet<IapProductId>, IapClientError>;

    fn save(&self, product_ids: &HashSet<IapProductId>) -> Result<(), IapClientError>;
}

pub struct PurchasedProductFileDatasourceImpl {
    path: PathBuf,
}

impl PurchasedProductDatasource for PurchasedProductFileDatasourceImpl {
    fn load(&self) -> Result<HashSet<IapProductId>, IapClientError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(IapClientError::LedgerPersistFailed(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let model: LedgerFileModel = serde_json::from_slice(&contents).map_err(|e| {
            IapClientError::LedgerPersistFailed(format!(
                "failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(model.purchased_product_ids.into_iter().collect())
    }

    fn save(&self, product_ids: &HashSet<IapProductId>) -> Result<(), IapClientError> {
        let model = LedgerFileModel {
            purchased_product_ids: product_ids.iter().cloned().collect::<BTreeSet<_>>(),
        };
        let contents = serde_json::to_vec_pretty(&model)
            .map_err(|e| IapClientError::LedgerPersistFailed(e.to_string()))?;

        // Stage next to the ledger and rename over it, so a crash never
        // leaves a truncated ledger behind.
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write = || -> io::Result<()> {
            fs::create_dir_all(parent)?;
            let mut staged = NamedTempFile::new_in(parent)?;
            staged.write_all(&contents)?;
            staged.as_file().sync_all()?;
            staged.persist(&self.path)?;
            Ok(())
        };
        write().map_err(|e| {
            IapClientError::LedgerPersistFailed(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl PurchasedProductFileDatasourceImpl {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
