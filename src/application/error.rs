use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{LedgerError, ParseCentsError, ParseTransactionTypeError, TransactionId};
use crate::io::ExportError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(String),

    #[error("Transaction ID {0} is already in use")]
    DuplicateTransactionId(TransactionId),

    #[error("Invalid record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Transaction ID {0} not found")]
    TransactionNotFound(TransactionId),

    #[error("No transaction ID left to assign; pass an explicit ID")]
    IdsExhausted,

    #[error("Could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed ledger data in {}: {source}", .path.display())]
    MalformedData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not write CSV to {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl AppError {
    /// Bad input: amount, type, id clash, no id left or an invalid imported record.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidAmount(_)
                | AppError::InvalidTransactionType(_)
                | AppError::DuplicateTransactionId(_)
                | AppError::IdsExhausted
                | AppError::InvalidRecord { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::TransactionNotFound(_))
    }

    /// File access or unreadable file contents.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            AppError::Io { .. } | AppError::MalformedData { .. } | AppError::Csv { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        AppError::MalformedData {
            path: path.into(),
            source,
        }
    }

    /// Attach the output path to a failed export.
    pub(crate) fn export(path: impl Into<PathBuf>, err: ExportError) -> Self {
        match err {
            ExportError::Io(source) => AppError::io(path, source),
            ExportError::Csv(source) => AppError::Csv {
                path: path.into(),
                source,
            },
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NonPositiveAmount(_) | LedgerError::AmountTooLarge(_) => {
                AppError::InvalidAmount(err.to_string())
            }
            LedgerError::DuplicateId(id) => AppError::DuplicateTransactionId(id),
            LedgerError::NotFound(id) => AppError::TransactionNotFound(id),
            LedgerError::IdsExhausted => AppError::IdsExhausted,
        }
    }
}

impl From<ParseCentsError> for AppError {
    fn from(err: ParseCentsError) -> Self {
        AppError::InvalidAmount(err.to_string())
    }
}

impl From<ParseTransactionTypeError> for AppError {
    fn from(err: ParseTransactionTypeError) -> Self {
        AppError::InvalidTransactionType(err.0)
    }
}
