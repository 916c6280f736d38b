use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::{
    Cents, Ledger, NewTransaction, Summary, Transaction, TransactionFilter, TransactionId,
    balance, summarize,
};
use crate::io::{ExportFormat, Exporter, ImportResult, Importer};
use crate::storage::JsonStore;

use super::AppError;

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, tests, scripts).
///
/// Owns the session ledger; every mutating operation flushes it to the store.
pub struct LedgerService {
    ledger: Ledger,
    store: JsonStore,
}

/// Outcome of replacing the ledger from an import file
#[derive(Debug, Clone, Copy)]
pub struct ImportOutcome {
    pub imported: usize,
    pub replaced: usize,
}

impl LedgerService {
    pub fn new(ledger: Ledger, store: JsonStore) -> Self {
        Self { ledger, store }
    }

    /// Open the ledger stored at the given path (empty if the file does not exist yet).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = JsonStore::new(path);
        let ledger = store.load()?;
        Ok(Self::new(ledger, store))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn data_path(&self) -> &Path {
        self.store.path()
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a new transaction and save.
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction, AppError> {
        let transaction = self.ledger.add(new)?.clone();
        self.store.save(&self.ledger)?;

        info!(
            id = transaction.id,
            kind = %transaction.kind,
            amount_cents = transaction.amount_cents,
            category = %transaction.category,
            "Transaction added"
        );
        Ok(transaction)
    }

    /// Delete a transaction by id and save.
    pub fn delete_transaction(&mut self, id: TransactionId) -> Result<Transaction, AppError> {
        let removed = self.ledger.delete(id)?;
        self.store.save(&self.ledger)?;

        info!(id, "Transaction deleted");
        Ok(removed)
    }

    pub fn get_transaction(&self, id: TransactionId) -> Result<&Transaction, AppError> {
        self.ledger
            .get(id)
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// List transactions matching the filter, in insertion order.
    pub fn list_transactions<'a>(
        &'a self,
        filter: &'a TransactionFilter,
    ) -> impl Iterator<Item = &'a Transaction> + Clone + 'a {
        self.ledger.find(filter)
    }

    // ========================
    // Summary operations
    // ========================

    /// Per-category and overall totals over the filtered transactions.
    pub fn summary(&self, filter: &TransactionFilter) -> Summary {
        summarize(self.ledger.find(filter))
    }

    /// Current balance across the whole ledger.
    pub fn balance(&self) -> Cents {
        balance(self.ledger.transactions())
    }

    // ========================
    // Import / export
    // ========================

    /// Write every transaction to `path`. Returns the number written.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<usize, AppError> {
        let file = File::create(path).map_err(|e| AppError::io(path, e))?;
        let count = Exporter::new(self.ledger.transactions())
            .export(BufWriter::new(file), format)
            .map_err(|e| AppError::export(path, e))?;

        info!(path = %path.display(), %format, count, "Ledger exported");
        Ok(count)
    }

    /// Read and validate an import file without touching the ledger.
    pub fn preview_import(&self, path: &Path) -> Result<ImportResult, AppError> {
        let file = File::open(path).map_err(|e| AppError::io(path, e))?;
        let result =
            Importer::read_json(BufReader::new(file)).map_err(|e| AppError::malformed(path, e))?;

        debug!(
            path = %path.display(),
            total = result.total,
            errors = result.errors.len(),
            "Import file read"
        );
        Ok(result)
    }

    /// Replace the ledger with the content of an import file and save.
    /// Any invalid record rejects the whole import and leaves the ledger unchanged.
    pub fn import(&mut self, path: &Path) -> Result<ImportOutcome, AppError> {
        let result = self.preview_import(path)?;

        if let Some(first) = result.errors.first() {
            warn!(
                path = %path.display(),
                errors = result.errors.len(),
                "Import rejected"
            );
            return Err(AppError::InvalidRecord {
                index: first.index,
                reason: first.to_string(),
            });
        }

        let replaced = self.ledger.len();
        self.ledger.replace(result.transactions)?;
        self.store.save(&self.ledger)?;

        info!(
            path = %path.display(),
            imported = self.ledger.len(),
            replaced,
            "Ledger imported"
        );
        Ok(ImportOutcome {
            imported: self.ledger.len(),
            replaced,
        })
    }
}
