use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::domain::{Transaction, format_cents};
use crate::storage::write_transactions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Same JSON array layout as the data file; can be imported back
    Json,
    /// Spreadsheet-friendly view, export only
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Guess the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format '{}' (expected json or csv)", other)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure while writing an export; the caller knows the destination.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Exporter for writing ledger transactions to external files
pub struct Exporter<'a> {
    transactions: &'a [Transaction],
}

impl<'a> Exporter<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self { transactions }
    }

    pub fn export<W: Write>(&self, writer: W, format: ExportFormat) -> Result<usize, ExportError> {
        match format {
            ExportFormat::Json => self.export_json(writer),
            ExportFormat::Csv => self.export_csv(writer),
        }
    }

    /// Export transactions as a JSON array, in ledger order
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<usize, ExportError> {
        write_transactions(&mut writer, self.transactions).map_err(std::io::Error::from)?;
        writer.flush()?;
        Ok(self.transactions.len())
    }

    /// Export transactions to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "type", "amount", "category", "description", "date"])?;

        for transaction in self.transactions {
            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.kind.to_string(),
                format_cents(transaction.amount_cents),
                transaction.category.clone(),
                transaction.description.clone(),
                transaction
                    .date
                    .format(crate::domain::DATE_FORMAT)
                    .to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(self.transactions.len())
    }
}
