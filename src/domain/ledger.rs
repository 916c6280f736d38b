use std::collections::HashSet;

use super::{
    Cents, MAX_AMOUNT_CENTS, NewTransaction, Transaction, TransactionFilter, TransactionId,
};

/// In-memory, insertion-ordered collection of transactions.
/// The single source of truth for a session; persistence lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    /// Next id to hand out. Only ever grows, so ids are not reused after a delete.
    /// `None` once `TransactionId::MAX` has been taken.
    next_id: Option<TransactionId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            next_id: Some(1),
        }
    }

    /// Build a ledger from persisted records, keeping their order.
    /// Every record must have an amount in range and a unique id.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Result<Self, LedgerError> {
        let mut seen = HashSet::with_capacity(transactions.len());
        for transaction in &transactions {
            validate_amount(transaction.amount_cents)?;
            if !seen.insert(transaction.id) {
                return Err(LedgerError::DuplicateId(transaction.id));
            }
        }

        let next_id = match transactions.iter().map(|t| t.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        Ok(Self {
            transactions,
            next_id,
        })
    }

    /// Replace the whole content of the ledger. On error the ledger is left untouched.
    pub fn replace(&mut self, transactions: Vec<Transaction>) -> Result<(), LedgerError> {
        *self = Self::from_transactions(transactions)?;
        Ok(())
    }

    /// Append a transaction, assigning the next free id when none is given.
    pub fn add(&mut self, new: NewTransaction) -> Result<&Transaction, LedgerError> {
        validate_amount(new.amount_cents)?;

        let id = match new.id {
            Some(id) if self.get(id).is_some() => return Err(LedgerError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_id.ok_or(LedgerError::IdsExhausted)?,
        };
        self.next_id = match (self.next_id, id.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };

        self.transactions.push(new.into_transaction(id));
        let index = self.transactions.len() - 1;
        Ok(&self.transactions[index])
    }

    /// Hard-delete the transaction with the given id, returning it.
    /// The relative order of the remaining transactions is preserved.
    pub fn delete(&mut self, id: TransactionId) -> Result<Transaction, LedgerError> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        Ok(self.transactions.remove(index))
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Lazily iterate over the transactions matching `filter`, in insertion order.
    /// The iterator can be cloned to walk the same selection again.
    pub fn find<'a>(
        &'a self,
        filter: &'a TransactionFilter,
    ) -> impl Iterator<Item = &'a Transaction> + Clone + 'a {
        self.transactions.iter().filter(move |t| filter.matches(t))
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_amount(amount_cents: Cents) -> Result<(), LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::NonPositiveAmount(amount_cents));
    }
    if amount_cents > MAX_AMOUNT_CENTS {
        return Err(LedgerError::AmountTooLarge(amount_cents));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    NonPositiveAmount(Cents),
    AmountTooLarge(Cents),
    DuplicateId(TransactionId),
    NotFound(TransactionId),
    /// Every id up to `TransactionId::MAX` has been handed out
    IdsExhausted,
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::NonPositiveAmount(cents) => write!(
                f,
                "amount must be greater than zero (got {})",
                super::format_cents(*cents)
            ),
            LedgerError::AmountTooLarge(cents) => write!(
                f,
                "amount {} exceeds the maximum of {}",
                super::format_cents(*cents),
                super::format_cents(MAX_AMOUNT_CENTS)
            ),
            LedgerError::DuplicateId(id) => write!(f, "transaction id {} is already in use", id),
            LedgerError::NotFound(id) => write!(f, "transaction id {} not found", id),
            LedgerError::IdsExhausted => write!(f, "no transaction id left to assign"),
        }
    }
}

impl std::error::Error for LedgerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransactionType, parse_timestamp};

    fn ledger_with(entries: &[(TransactionType, Cents, &str)]) -> Ledger {
        let mut ledger = Ledger::new();
        for (kind, amount, category) in entries {
            ledger
                .add(NewTransaction::new(*kind, *amount, *category))
                .unwrap();
        }
        ledger
    }

    fn ids(ledger: &Ledger) -> Vec<TransactionId> {
        ledger.transactions().iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let ledger = ledger_with(&[
            (TransactionType::Income, 10000, "salary"),
            (TransactionType::Expense, 4000, "food"),
        ]);

        assert_eq!(ids(&ledger), vec![1, 2]);
        assert_eq!(ledger.transactions()[1].category, "food");
    }

    #[test]
    fn test_add_rejects_non_positive_amount() {
        let mut ledger = Ledger::new();

        assert_eq!(
            ledger.add(NewTransaction::expense(0, "food")).unwrap_err(),
            LedgerError::NonPositiveAmount(0)
        );
        assert_eq!(
            ledger.add(NewTransaction::income(-100, "salary")).unwrap_err(),
            LedgerError::NonPositiveAmount(-100)
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_add_with_explicit_id() {
        let mut ledger = Ledger::new();
        ledger
            .add(NewTransaction::income(500, "gift").with_id(10))
            .unwrap();
        let next = ledger.add(NewTransaction::expense(100, "food")).unwrap();

        assert_eq!(next.id, 11);
        assert_eq!(
            ledger
                .add(NewTransaction::expense(100, "food").with_id(10))
                .unwrap_err(),
            LedgerError::DuplicateId(10)
        );
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut ledger = ledger_with(&[
            (TransactionType::Income, 100, "a"),
            (TransactionType::Income, 200, "b"),
        ]);

        ledger.delete(2).unwrap();
        let added = ledger.add(NewTransaction::income(300, "c")).unwrap();

        assert_eq!(added.id, 3);
    }

    #[test]
    fn test_delete_preserves_order() {
        let mut ledger = ledger_with(&[
            (TransactionType::Income, 100, "a"),
            (TransactionType::Expense, 200, "b"),
            (TransactionType::Income, 300, "c"),
            (TransactionType::Expense, 400, "d"),
        ]);

        let removed = ledger.delete(2).unwrap();

        assert_eq!(removed.category, "b");
        assert_eq!(ids(&ledger), vec![1, 3, 4]);
    }

    #[test]
    fn test_delete_unknown_id_leaves_ledger_unchanged() {
        let mut ledger = ledger_with(&[(TransactionType::Income, 100, "a")]);
        let before = ledger.clone();

        assert_eq!(ledger.delete(42), Err(LedgerError::NotFound(42)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_find_filters_and_restarts() {
        let ledger = ledger_with(&[
            (TransactionType::Income, 100, "salary"),
            (TransactionType::Expense, 200, "Food"),
            (TransactionType::Expense, 300, "rent"),
            (TransactionType::Expense, 400, "food"),
        ]);
        let filter = TransactionFilter {
            category: Some("food".into()),
            ..Default::default()
        };

        let matches = ledger.find(&filter);
        let first_pass: Vec<_> = matches.clone().map(|t| t.id).collect();
        let second_pass: Vec<_> = matches.map(|t| t.id).collect();

        assert_eq!(first_pass, vec![2, 4]);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_find_without_filter_returns_all_in_order() {
        let ledger = ledger_with(&[
            (TransactionType::Expense, 300, "c"),
            (TransactionType::Income, 100, "a"),
        ]);
        let all = TransactionFilter::default();

        let found: Vec<_> = ledger.find(&all).map(|t| t.category.as_str()).collect();
        assert_eq!(found, vec!["c", "a"]);
    }

    #[test]
    fn test_from_transactions_validates() {
        let date = parse_timestamp("2024-01-01").unwrap();
        let tx = |id, amount_cents| Transaction {
            id,
            kind: TransactionType::Expense,
            amount_cents,
            category: "misc".into(),
            description: String::new(),
            date,
        };

        let ledger = Ledger::from_transactions(vec![tx(4, 100), tx(2, 100)]).unwrap();
        assert_eq!(ids(&ledger), vec![4, 2]);

        assert_eq!(
            Ledger::from_transactions(vec![tx(1, 100), tx(1, 200)]),
            Err(LedgerError::DuplicateId(1))
        );
        assert_eq!(
            Ledger::from_transactions(vec![tx(1, 0)]),
            Err(LedgerError::NonPositiveAmount(0))
        );
        assert_eq!(
            Ledger::from_transactions(vec![tx(1, MAX_AMOUNT_CENTS + 1)]),
            Err(LedgerError::AmountTooLarge(MAX_AMOUNT_CENTS + 1))
        );
    }

    #[test]
    fn test_from_transactions_with_largest_id() {
        let date = parse_timestamp("2024-01-01").unwrap();
        let last = Transaction {
            id: TransactionId::MAX,
            kind: TransactionType::Income,
            amount_cents: 100,
            category: "misc".into(),
            description: String::new(),
            date,
        };

        let mut ledger = Ledger::from_transactions(vec![last]).unwrap();

        assert_eq!(
            ledger.add(NewTransaction::income(100, "misc")).unwrap_err(),
            LedgerError::IdsExhausted
        );
        // Explicit ids below the maximum are still accepted
        let added = ledger
            .add(NewTransaction::income(100, "misc").with_id(7))
            .unwrap();
        assert_eq!(added.id, 7);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_explicit_largest_id_stops_id_assignment() {
        let mut ledger = Ledger::new();
        ledger
            .add(NewTransaction::income(100, "a").with_id(TransactionId::MAX))
            .unwrap();

        assert_eq!(
            ledger.add(NewTransaction::income(100, "b")).unwrap_err(),
            LedgerError::IdsExhausted
        );
        assert_eq!(ids(&ledger), vec![TransactionId::MAX]);
    }

    #[test]
    fn test_add_rejects_amount_above_limit() {
        let mut ledger = Ledger::new();

        assert_eq!(
            ledger
                .add(NewTransaction::income(MAX_AMOUNT_CENTS + 1, "lottery"))
                .unwrap_err(),
            LedgerError::AmountTooLarge(MAX_AMOUNT_CENTS + 1)
        );
        assert!(ledger.is_empty());

        let added = ledger
            .add(NewTransaction::income(MAX_AMOUNT_CENTS, "lottery"))
            .unwrap();
        assert_eq!(added.amount_cents, MAX_AMOUNT_CENTS);
    }

    #[test]
    fn test_replace_is_all_or_nothing() {
        let mut ledger = ledger_with(&[(TransactionType::Income, 100, "a")]);
        let before = ledger.clone();
        let mut bad = before.transactions().to_vec();
        bad.push(bad[0].clone());

        assert!(ledger.replace(bad).is_err());
        assert_eq!(ledger, before);
    }
}
