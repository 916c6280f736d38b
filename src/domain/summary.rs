use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionType, same_category};

/// Sum of all income amounts.
pub fn total_income<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Cents {
    sum_of_kind(transactions, TransactionType::Income)
}

/// Sum of all expense amounts.
pub fn total_expense<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Cents {
    sum_of_kind(transactions, TransactionType::Expense)
}

/// Balance = total income - total expense
pub fn balance<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Cents {
    sum_cents(transactions.into_iter().map(Transaction::signed_amount))
}

fn sum_of_kind<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    kind: TransactionType,
) -> Cents {
    sum_cents(
        transactions
            .into_iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount_cents),
    )
}

/// Totals are accumulated wide and clamped to the `Cents` range, so no sum panics.
fn sum_cents(amounts: impl Iterator<Item = Cents>) -> Cents {
    clamp_cents(amounts.map(i128::from).sum())
}

fn clamp_cents(total: i128) -> Cents {
    Cents::try_from(total).unwrap_or(if total < 0 { Cents::MIN } else { Cents::MAX })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Spelling of the category as first seen
    pub category: String,
    #[serde(with = "crate::domain::decimal_amount")]
    pub income: Cents,
    #[serde(with = "crate::domain::decimal_amount")]
    pub expense: Cents,
    /// Signed subtotal: income - expense
    #[serde(with = "crate::domain::decimal_amount")]
    pub net: Cents,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// One entry per category, in order of first appearance
    pub categories: Vec<CategoryTotal>,
    #[serde(with = "crate::domain::decimal_amount")]
    pub total_income: Cents,
    #[serde(with = "crate::domain::decimal_amount")]
    pub total_expense: Cents,
    #[serde(with = "crate::domain::decimal_amount")]
    pub balance: Cents,
    pub count: usize,
}

impl Summary {
    pub fn category(&self, name: &str) -> Option<&CategoryTotal> {
        self.categories
            .iter()
            .find(|c| same_category(&c.category, name))
    }
}

/// Group transactions by category and compute overall totals in a single pass.
/// The category subtotals always add up to `balance`.
pub fn summarize<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Summary {
    let mut categories: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions {
        let index = match categories
            .iter()
            .position(|c| same_category(&c.category, &transaction.category))
        {
            Some(index) => index,
            None => {
                categories.push(CategoryTotal {
                    category: transaction.category.clone(),
                    income: 0,
                    expense: 0,
                    net: 0,
                    count: 0,
                });
                categories.len() - 1
            }
        };

        let entry = &mut categories[index];
        match transaction.kind {
            TransactionType::Income => {
                entry.income = entry.income.saturating_add(transaction.amount_cents)
            }
            TransactionType::Expense => {
                entry.expense = entry.expense.saturating_add(transaction.amount_cents)
            }
        }
        entry.net = entry.net.saturating_add(transaction.signed_amount());
        entry.count += 1;
    }

    let total_income = sum_cents(categories.iter().map(|c| c.income));
    let total_expense = sum_cents(categories.iter().map(|c| c.expense));
    let count: usize = categories.iter().map(|c| c.count).sum();

    Summary {
        categories,
        total_income,
        total_expense,
        balance: clamp_cents(i128::from(total_income) - i128::from(total_expense)),
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ledger, MAX_AMOUNT_CENTS, NewTransaction, TransactionFilter, now};

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        for new in [
            NewTransaction::income(10000, "salary"),
            NewTransaction::expense(4000, "food"),
            NewTransaction::expense(1550, "Food"),
            NewTransaction::income(2500, "food").with_description("refund"),
            NewTransaction::expense(80000, "rent"),
        ] {
            ledger.add(new).unwrap();
        }
        ledger
    }

    #[test]
    fn test_totals_empty() {
        let empty: &[Transaction] = &[];
        assert_eq!(total_income(empty), 0);
        assert_eq!(total_expense(empty), 0);
        assert_eq!(balance(empty), 0);

        let summary = summarize(empty);
        assert!(summary.categories.is_empty());
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_totals() {
        let ledger = sample_ledger();
        let transactions = ledger.transactions();

        assert_eq!(total_income(transactions), 12500);
        assert_eq!(total_expense(transactions), 85550);
        assert_eq!(balance(transactions), 12500 - 85550);
    }

    #[test]
    fn test_salary_and_food_example() {
        let mut ledger = Ledger::new();
        ledger.add(NewTransaction::income(10000, "salary")).unwrap();
        ledger.add(NewTransaction::expense(4000, "food")).unwrap();

        let summary = summarize(ledger.transactions());

        assert_eq!(balance(ledger.transactions()), 6000);
        assert_eq!(summary.balance, 6000);
        assert_eq!(summary.category("salary").unwrap().net, 10000);
        assert_eq!(summary.category("food").unwrap().net, -4000);
    }

    #[test]
    fn test_summary_groups_case_insensitively_in_first_seen_order() {
        let summary = summarize(sample_ledger().transactions());

        let names: Vec<_> = summary
            .categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["salary", "food", "rent"]);

        let food = summary.category("FOOD").unwrap();
        assert_eq!(food.count, 3);
        assert_eq!(food.income, 2500);
        assert_eq!(food.expense, 5550);
        assert_eq!(food.net, -3050);
    }

    #[test]
    fn test_category_subtotals_sum_to_balance() {
        let summary = summarize(sample_ledger().transactions());

        let sum_of_nets: Cents = summary.categories.iter().map(|c| c.net).sum();
        assert_eq!(sum_of_nets, summary.balance);
        assert_eq!(summary.total_income - summary.total_expense, summary.balance);
        assert_eq!(summary.count, 5);
    }

    #[test]
    fn test_summary_of_filtered_selection() {
        let ledger = sample_ledger();
        let filter = TransactionFilter {
            kind: Some(TransactionType::Expense),
            ..Default::default()
        };

        let summary = summarize(ledger.find(&filter));

        assert_eq!(summary.total_income, 0);
        assert_eq!(summary.total_expense, 85550);
        assert_eq!(summary.categories.len(), 2);
    }

    #[test]
    fn test_totals_of_largest_amounts() {
        let mut ledger = Ledger::new();
        ledger
            .add(NewTransaction::income(MAX_AMOUNT_CENTS, "sale"))
            .unwrap();
        ledger
            .add(NewTransaction::income(MAX_AMOUNT_CENTS, "sale"))
            .unwrap();
        ledger
            .add(NewTransaction::expense(MAX_AMOUNT_CENTS, "purchase"))
            .unwrap();

        let summary = summarize(ledger.transactions());

        assert_eq!(total_income(ledger.transactions()), 2 * MAX_AMOUNT_CENTS);
        assert_eq!(balance(ledger.transactions()), MAX_AMOUNT_CENTS);
        assert_eq!(summary.balance, MAX_AMOUNT_CENTS);
        assert_eq!(summary.category("sale").unwrap().income, 2 * MAX_AMOUNT_CENTS);
    }

    #[test]
    fn test_totals_beyond_cents_range_saturate() {
        let huge = |kind| Transaction {
            id: 1,
            kind,
            amount_cents: Cents::MAX,
            category: "overflow".into(),
            description: String::new(),
            date: now(),
        };
        let transactions = [
            huge(TransactionType::Income),
            huge(TransactionType::Income),
            huge(TransactionType::Expense),
            huge(TransactionType::Expense),
            huge(TransactionType::Expense),
        ];

        assert_eq!(total_income(&transactions), Cents::MAX);
        assert_eq!(total_expense(&transactions), Cents::MAX);
        assert_eq!(balance(&transactions), -Cents::MAX);

        let summary = summarize(&transactions);
        assert_eq!(summary.total_income, Cents::MAX);
        assert_eq!(summary.balance, 0);
        assert_eq!(summary.count, 5);
    }
}
