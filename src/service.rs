use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::engine;
use crate::error::{ErrorCode, RuleError};
use crate::models::rule::{MiningParams, Rule};
use crate::models::transaction::{Transaction, normalize_items};
use crate::store::dataset::DatasetStore;

// ---------------------------------------------------------------------------
// AppService: unified core logic for CLI / HTTP / MCP
// ---------------------------------------------------------------------------

pub struct AppService {
    store: Mutex<DatasetStore>,
    defaults: MiningParams,
}

impl AppService {
    /// Open the dataset at `path` with the built-in threshold defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_defaults(path, MiningParams::default())
    }

    /// Open the dataset at `path`, using `defaults` for thresholds a request
    /// leaves out.
    pub fn with_defaults(path: impl Into<PathBuf>, defaults: MiningParams) -> Self {
        let store = DatasetStore::open(path);
        info!(
            path = %store.path().display(),
            transactions = store.len(),
            "dataset opened"
        );
        Self {
            store: Mutex::new(store),
            defaults,
        }
    }

    pub fn defaults(&self) -> MiningParams {
        self.defaults
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.lock().path().to_path_buf()
    }

    /// One writer at a time; a panic while holding the lock cannot leave the
    /// list half-updated, so a poisoned lock is simply reclaimed.
    fn lock(&self) -> MutexGuard<'_, DatasetStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Dataset operations
    // -----------------------------------------------------------------------

    /// Snapshot of every stored transaction.
    pub fn list(&self) -> Vec<Transaction> {
        let store = self.lock();
        debug!(transactions = store.len(), "list called");
        store.all().to_vec()
    }

    /// Trim and append a transaction. Returns it as stored.
    pub fn add<S: AsRef<str>>(&self, raw: &[S]) -> Result<Transaction> {
        let items = normalize_items(raw)?;
        let mut store = self.lock();
        store.append(items.clone())?;
        debug!(
            index = store.len() - 1,
            items = items.len(),
            "transaction added"
        );
        Ok(items)
    }

    /// Trim and replace the transaction at `index`. Returns it as stored.
    pub fn update<S: AsRef<str>>(&self, index: usize, raw: &[S]) -> Result<Transaction> {
        let items = normalize_items(raw)?;
        let mut store = self.lock();
        store.update_at(index, items.clone())?;
        debug!(index, items = items.len(), "transaction updated");
        Ok(items)
    }

    /// Remove the transaction at `index`, shifting later ones down.
    pub fn delete(&self, index: usize) -> Result<Transaction> {
        let mut store = self.lock();
        let removed = store.delete_at(index)?;
        debug!(index, remaining = store.len(), "transaction deleted");
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        let mut store = self.lock();
        let dropped = store.len();
        store.clear()?;
        debug!(dropped, "dataset cleared");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rule generation
    // -----------------------------------------------------------------------

    /// Mine rules over the current dataset. An empty dataset is a client
    /// error; a dataset that simply yields no rules is not.
    pub fn generate_rules(&self, params: &MiningParams) -> Result<Vec<Rule>> {
        debug!(
            min_support = params.min_support,
            min_confidence = params.min_confidence,
            "generate_rules called"
        );
        let snapshot = {
            let store = self.lock();
            if store.is_empty() {
                bail!(RuleError::new(ErrorCode::EmptyDataset, "Dataset is empty"));
            }
            store.all().to_vec()
        };

        let rules = engine::mine(&snapshot, params)?;
        debug!(
            transactions = snapshot.len(),
            rules = rules.len(),
            "generate_rules completed"
        );
        Ok(rules)
    }
}

/// Resolve the dataset path: an explicit override wins over the configured one.
pub fn resolve_dataset_path(cli_override: Option<&Path>, configured: &Path) -> PathBuf {
    cli_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| configured.to_path_buf())
}
