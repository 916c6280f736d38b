// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDateTime;
use tally::application::LedgerService;
use tally::domain::{Cents, NewTransaction, Transaction, parse_timestamp};
use tempfile::TempDir;

/// Helper to create a service backed by a data file in a temporary directory
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(data_path(&temp_dir))?;
    Ok((service, temp_dir))
}

/// Path of the data file used by `test_service`
pub fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("ledger_data.json")
}

/// Helper to parse "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS"
pub fn parse_date(date_str: &str) -> NaiveDateTime {
    parse_timestamp(date_str).unwrap()
}

pub fn income(amount: Cents, category: &str, date: &str) -> NewTransaction {
    NewTransaction::income(amount, category).with_date(parse_date(date))
}

pub fn expense(amount: Cents, category: &str, date: &str) -> NewTransaction {
    NewTransaction::expense(amount, category).with_date(parse_date(date))
}

/// Test fixture: a small month of activity
pub struct SampleMonth;

impl SampleMonth {
    /// Salary, rent and a few groceries in January 2024
    pub fn record(service: &mut LedgerService) -> Result<Vec<Transaction>> {
        let entries = [
            income(250000, "salary", "2024-01-01 09:00:00"),
            expense(90000, "rent", "2024-01-02 10:00:00"),
            expense(4520, "groceries", "2024-01-05 18:30:00"),
            expense(3180, "Groceries", "2024-01-12 18:10:00").with_description("weekly shop"),
            income(1500, "groceries", "2024-01-13 11:00:00").with_description("refund"),
            expense(2500, "dining", "2024-01-20 20:45:00"),
        ];

        let mut recorded = Vec::new();
        for entry in entries {
            recorded.push(service.add_transaction(entry)?);
        }
        Ok(recorded)
    }
}
