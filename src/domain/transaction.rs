use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::Cents;

pub type TransactionId = u64;

/// Timestamp layout used in the data file, e.g. `2024-01-15 09:30:00`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in (salary, refunds, interest)
    Income,
    /// Money going out (groceries, rent, bills)
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Sign applied to an amount of this type when computing a balance.
    pub fn signed(&self, amount_cents: Cents) -> Cents {
        match self {
            TransactionType::Income => amount_cents,
            TransactionType::Expense => -amount_cents,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(ParseTransactionTypeError(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTransactionTypeError(pub String);

impl std::fmt::Display for ParseTransactionTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown transaction type '{}' (expected income or expense)",
            self.0
        )
    }
}

impl std::error::Error for ParseTransactionTypeError {}

/// A single income or expense record.
///
/// Field order matches the persisted JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Amount in cents (always positive); written to JSON as a decimal
    #[serde(rename = "amount", with = "crate::domain::decimal_amount")]
    pub amount_cents: Cents,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "timestamp")]
    pub date: NaiveDateTime,
}

impl Transaction {
    /// Contribution of this transaction to the balance.
    pub fn signed_amount(&self) -> Cents {
        self.kind.signed(self.amount_cents)
    }
}

/// A transaction that has not been added to a ledger yet.
/// The ledger assigns an id unless one is provided.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id: Option<TransactionId>,
    pub kind: TransactionType,
    pub amount_cents: Cents,
    pub category: String,
    pub description: String,
    pub date: NaiveDateTime,
}

impl NewTransaction {
    pub fn new(kind: TransactionType, amount_cents: Cents, category: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            amount_cents,
            category: category.into(),
            description: String::new(),
            date: now(),
        }
    }

    pub fn income(amount_cents: Cents, category: impl Into<String>) -> Self {
        Self::new(TransactionType::Income, amount_cents, category)
    }

    pub fn expense(amount_cents: Cents, category: impl Into<String>) -> Self {
        Self::new(TransactionType::Expense, amount_cents, category)
    }

    pub fn with_id(mut self, id: TransactionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = date;
        self
    }

    pub(crate) fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount_cents: self.amount_cents,
            category: self.category,
            description: self.description,
            date: self.date,
        }
    }
}

/// Optional predicates for querying transactions. The default matches everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Inclusive lower bound on the calendar date
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound on the calendar date
    pub to_date: Option<NaiveDate>,
    pub kind: Option<TransactionType>,
    /// Case-insensitive category match
    pub category: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let date = transaction.date.date();
        self.from_date.is_none_or(|from| date >= from)
            && self.to_date.is_none_or(|to| date <= to)
            && self.kind.is_none_or(|kind| transaction.kind == kind)
            && self
                .category
                .as_deref()
                .is_none_or(|category| same_category(&transaction.category, category))
    }
}

/// Categories compare case-insensitively ("Food" and "food" are one category).
pub fn same_category(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Current local time truncated to whole seconds, the precision kept on disk.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Parse a timestamp as written in the data file, or a bare `YYYY-MM-DD` date
/// (taken as midnight).
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    NaiveDateTime::parse_from_str(input, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{DATE_FORMAT, parse_timestamp};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| {
            D::Error::custom(format!(
                "invalid date '{}', expected YYYY-MM-DD HH:MM:SS or YYYY-MM-DD",
                raw
            ))
        })
    }
}
