use std::collections::HashSet;
use std::io::Read;

use serde::Deserialize;

use crate::domain::{
    MAX_AMOUNT_CENTS, Transaction, TransactionId, TransactionType, cents_from_f64, format_cents,
    parse_timestamp,
};

/// Result of reading an import file
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Records that passed validation, in file order
    pub transactions: Vec<Transaction>,
    /// Number of records in the file
    pub total: usize,
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Problem with a single record of an import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    /// 1-based position of the record in the array
    pub index: usize,
    pub field: Option<String>,
    pub error: String,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Loosely typed record: the shape must be right, the values are checked afterwards
/// so that every bad record can be reported, not only the first one.
///
/// Import is more lenient than loading the data file: the type is matched
/// case-insensitively and `id` may be omitted. The data file is only ever written
/// by the store, so `JsonStore::load` reads it with the strict `Transaction` layout.
#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    id: Option<TransactionId>,
    #[serde(rename = "type")]
    kind: String,
    amount: f64,
    category: String,
    #[serde(default)]
    description: String,
    date: String,
}

/// Importer for JSON files in the ledger's own layout
pub struct Importer;

impl Importer {
    /// Parse and validate a JSON array of transactions.
    ///
    /// Structural problems (not an array, missing keys, wrong JSON types) fail the
    /// whole read. Value problems are collected per record in the result.
    pub fn read_json<R: Read>(reader: R) -> serde_json::Result<ImportResult> {
        let records: Vec<RawTransaction> = serde_json::from_reader(reader)?;
        Ok(Self::validate(records))
    }

    fn validate(records: Vec<RawTransaction>) -> ImportResult {
        let total = records.len();
        let mut errors = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut pending: Vec<(usize, Option<TransactionId>, Transaction)> =
            Vec::with_capacity(total);

        for (position, raw) in records.into_iter().enumerate() {
            let index = position + 1;
            let mut fail = |field: &str, error: String| {
                errors.push(ImportError {
                    index,
                    field: Some(field.to_string()),
                    error,
                });
            };

            let kind = match raw.kind.parse::<TransactionType>() {
                Ok(kind) => kind,
                Err(e) => {
                    fail("type", e.to_string());
                    continue;
                }
            };

            let amount_cents = match cents_from_f64(raw.amount) {
                Some(cents) if cents > 0 => cents,
                Some(_) => {
                    fail("amount", format!("amount must be greater than zero (got {})", raw.amount));
                    continue;
                }
                None => {
                    fail(
                        "amount",
                        format!(
                            "amount {} is out of range (maximum {})",
                            raw.amount,
                            format_cents(MAX_AMOUNT_CENTS)
                        ),
                    );
                    continue;
                }
            };

            let Some(date) = parse_timestamp(&raw.date) else {
                fail("date", format!("invalid date '{}'", raw.date));
                continue;
            };

            if let Some(id) = raw.id {
                if !seen_ids.insert(id) {
                    fail("id", format!("duplicate id {}", id));
                    continue;
                }
            }

            pending.push((
                index,
                raw.id,
                Transaction {
                    id: raw.id.unwrap_or_default(),
                    kind,
                    amount_cents,
                    category: raw.category,
                    description: raw.description,
                    date,
                },
            ));
        }

        // Records without an id get fresh ones after the highest id in the file.
        let mut next_id = match seen_ids.iter().copied().max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        let mut transactions = Vec::with_capacity(pending.len());
        for (index, id, mut transaction) in pending {
            if id.is_none() {
                let Some(assigned) = next_id else {
                    errors.push(ImportError {
                        index,
                        field: Some("id".to_string()),
                        error: "no transaction id left to assign".to_string(),
                    });
                    continue;
                };
                transaction.id = assigned;
                next_id = assigned.checked_add(1);
            }
            transactions.push(transaction);
        }
        errors.sort_by_key(|e| e.index);

        ImportResult {
            transactions,
            total,
            errors,
        }
    }
}
