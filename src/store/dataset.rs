use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::RuleError;
use crate::models::transaction::Transaction;

/// Ordered list of transactions mirrored to a JSON file.
///
/// Every mutation rewrites the whole file before returning. A failed write
/// leaves the in-memory list mutated: the change is applied but not durable.
/// The store does no locking of its own; callers sharing it across threads
/// wrap it in a mutex, and two processes on the same file can lose updates.
pub struct DatasetStore {
    path: PathBuf,
    transactions: Vec<Transaction>,
}

impl DatasetStore {
    /// Load the dataset at `path`. A missing, unreadable or corrupt file
    /// yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let transactions = load(&path);
        debug!(
            path = %path.display(),
            transactions = transactions.len(),
            "dataset loaded"
        );
        Self { path, transactions }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn append(&mut self, transaction: Transaction) -> Result<()> {
        self.transactions.push(transaction);
        self.flush()
    }

    pub fn update_at(&mut self, index: usize, transaction: Transaction) -> Result<()> {
        let len = self.transactions.len();
        let slot = self
            .transactions
            .get_mut(index)
            .ok_or_else(|| RuleError::invalid_index(index, len))?;
        *slot = transaction;
        self.flush()
    }

    /// Remove the transaction at `index`; later transactions shift down by one.
    pub fn delete_at(&mut self, index: usize) -> Result<Transaction> {
        if index >= self.transactions.len() {
            return Err(RuleError::invalid_index(index, self.transactions.len()).into());
        }
        let removed = self.transactions.remove(index);
        self.flush()?;
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.transactions.clear();
        self.flush()
    }

    /// Rewrite the backing file from memory.
    pub fn flush(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.transactions)
            .map_err(|e| RuleError::storage(format!("Failed to encode dataset: {e}")))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                RuleError::storage(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        fs::write(&self.path, content).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "dataset write failed");
            RuleError::storage(format!(
                "Failed to write dataset {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }
}

fn load(path: &Path) -> Vec<Transaction> {
    if !path.exists() {
        return Vec::new();
    }
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "dataset unreadable, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&content) {
        Ok(transactions) => transactions,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "dataset corrupt, starting empty");
            Vec::new()
        }
    }
}
