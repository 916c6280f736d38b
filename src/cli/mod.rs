use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

use crate::application::LedgerService;
use crate::domain::{
    NewTransaction, Summary, Transaction, TransactionFilter, TransactionId, TransactionType,
    format_cents, format_signed_cents, parse_cents, parse_timestamp,
};
use crate::io::ExportFormat;
use crate::storage::DEFAULT_DATA_FILE;

/// Tally - Personal Finance Ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Track income and expenses in a plain JSON ledger")]
#[command(version)]
pub struct Cli {
    /// Ledger data file
    #[arg(short, long, env = "TALLY_FILE", default_value = DEFAULT_DATA_FILE, global = true)]
    pub file: PathBuf,

    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an income or expense transaction
    Add {
        /// Transaction type: income or expense
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Amount (e.g., "50.00" or "50"), must be greater than zero
        amount: String,

        /// Category (e.g., "salary", "groceries")
        #[arg(short, long)]
        category: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Date of the transaction (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS", defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List transactions, optionally filtered
    View {
        /// Only income or only expense
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Filter by category (case-insensitive)
        #[arg(short, long)]
        category: Option<String>,

        /// From date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// To date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a single transaction
    Show {
        /// Transaction ID
        id: TransactionId,
    },

    /// Totals per category plus overall income, expense and balance
    Summary {
        /// Only income or only expense
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Restrict to one category (case-insensitive)
        #[arg(short, long)]
        category: Option<String>,

        /// From date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// To date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the current balance (total income - total expense)
    Balance,

    /// Delete a transaction by ID
    Delete {
        /// Transaction ID
        id: TransactionId,
    },

    /// Export all transactions to a file
    Export {
        /// Output file
        output: PathBuf,

        /// Format: json, csv (default: from the file extension, else json)
        #[arg(long)]
        format: Option<String>,
    },

    /// Replace the ledger with the transactions of a JSON file
    Import {
        /// Input file, in the same layout as the data file
        input: PathBuf,

        /// Validate and report without importing
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut service = LedgerService::open(&self.file)
            .with_context(|| format!("Failed to open ledger {}", self.file.display()))?;

        match self.command {
            Commands::Add {
                kind,
                amount,
                category,
                description,
                date,
            } => {
                let kind: TransactionType = kind.parse()?;
                let amount_cents = parse_cents(&amount)
                    .with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", amount))?;

                let mut new = NewTransaction::new(kind, amount_cents, category)
                    .with_description(description);
                if let Some(date_str) = date {
                    let date = parse_timestamp(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?;
                    new = new.with_date(date);
                }

                let transaction = service.add_transaction(new)?;
                println!(
                    "Recorded {}: {} ({}) ID: {}",
                    transaction.kind,
                    format_cents(transaction.amount_cents),
                    transaction.category,
                    transaction.id
                );
            }

            Commands::View {
                kind,
                category,
                from,
                to,
                limit,
            } => {
                let filter = build_filter(kind, category, from, to)?;
                let transactions: Vec<&Transaction> = service
                    .list_transactions(&filter)
                    .take(limit.unwrap_or(usize::MAX))
                    .collect();
                print_transactions(&transactions);
            }

            Commands::Show { id } => {
                let transaction = service.get_transaction(id)?;
                print_transaction(transaction);
            }

            Commands::Summary {
                kind,
                category,
                from,
                to,
                format,
            } => {
                let filter = build_filter(kind, category, from, to)?;
                let summary = service.summary(&filter);

                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                    "table" => print_summary(&summary, &filter),
                    other => anyhow::bail!("Invalid format '{}'. Valid: table, json", other),
                }
            }

            Commands::Balance => {
                println!("Current balance: {}", format_cents(service.balance()));
            }

            Commands::Delete { id } => {
                let removed = service.delete_transaction(id)?;
                println!(
                    "Deleted transaction {}: {} {} ({})",
                    removed.id,
                    removed.kind,
                    format_cents(removed.amount_cents),
                    removed.category
                );
            }

            Commands::Export { output, format } => {
                let format = match format {
                    Some(f) => f.parse::<ExportFormat>().map_err(anyhow::Error::msg)?,
                    None => ExportFormat::from_path(&output),
                };
                let count = service.export(&output, format)?;
                println!(
                    "Exported {} transaction(s) to {} ({})",
                    count,
                    output.display(),
                    format
                );
            }

            Commands::Import { input, dry_run } => {
                run_import_command(&mut service, &input, dry_run)?;
            }
        }

        Ok(())
    }
}

fn run_import_command(service: &mut LedgerService, input: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        let result = service.preview_import(input)?;

        println!("Validation {}", if result.is_valid() { "successful" } else { "failed" });
        println!("  Records: {}", result.total);
        println!("  Valid:   {}", result.transactions.len());
        println!("  Errors:  {}", result.errors.len());

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for error in result.errors.iter().take(10) {
                println!("  Record {}: {}", error.index, error);
            }
            if result.errors.len() > 10 {
                println!("  ... and {} more errors", result.errors.len() - 10);
            }
        }
        return Ok(());
    }

    let outcome = service
        .import(input)
        .with_context(|| format!("Import from {} failed, ledger unchanged", input.display()))?;
    println!("Import complete");
    println!("  Imported: {}", outcome.imported);
    println!("  Replaced: {}", outcome.replaced);
    println!("  Saved to: {}", service.data_path().display());
    Ok(())
}

fn build_filter(
    kind: Option<String>,
    category: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<TransactionFilter> {
    let kind = kind.map(|k| k.parse::<TransactionType>()).transpose()?;
    let from_date = from
        .map(|s| parse_date(&s))
        .transpose()
        .context("Invalid from date")?;
    let to_date = to
        .map(|s| parse_date(&s))
        .transpose()
        .context("Invalid to date")?;

    Ok(TransactionFilter {
        from_date,
        to_date,
        kind,
        category,
    })
}

fn print_transactions(transactions: &[&Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:>5} {:<20} {:<8} {:<15} {:>12} DESCRIPTION",
        "ID", "DATE", "TYPE", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(80));

    for transaction in transactions {
        println!(
            "{:>5} {:<20} {:<8} {:<15} {:>12} {}",
            transaction.id,
            transaction.date.format("%Y-%m-%d %H:%M:%S"),
            transaction.kind,
            truncate(&transaction.category, 15),
            format_signed_cents(transaction.signed_amount()),
            truncate(&transaction.description, 30)
        );
    }
}

fn print_transaction(transaction: &Transaction) {
    println!("Transaction: {}", transaction.id);
    println!(
        "  Date:        {}",
        transaction.date.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Type:        {}", transaction.kind);
    println!("  Amount:      {}", format_cents(transaction.amount_cents));
    println!("  Category:    {}", transaction.category);
    if !transaction.description.is_empty() {
        println!("  Description: {}", transaction.description);
    }
}

fn print_summary(summary: &Summary, filter: &TransactionFilter) {
    println!("Financial Summary");
    match (filter.from_date, filter.to_date) {
        (None, None) => {}
        (from, to) => println!(
            "Period: {} to {}",
            from.map(|d| d.to_string()).unwrap_or_else(|| "start".into()),
            to.map(|d| d.to_string()).unwrap_or_else(|| "today".into())
        ),
    }
    println!();

    if !summary.categories.is_empty() {
        println!(
            "{:<20} {:>12} {:>12} {:>12} {:>6}",
            "CATEGORY", "INCOME", "EXPENSE", "NET", "COUNT"
        );
        println!("{}", "-".repeat(66));
        for category in &summary.categories {
            println!(
                "{:<20} {:>12} {:>12} {:>12} {:>6}",
                truncate(&category.category, 20),
                format_cents(category.income),
                format_cents(category.expense),
                format_signed_cents(category.net),
                category.count
            );
        }
        println!("{}", "-".repeat(66));
        println!();
    }

    println!("Total Income:   {:>15}", format_cents(summary.total_income));
    println!("Total Expense:  {:>15}", format_cents(summary.total_expense));
    println!("{}", "-".repeat(32));
    println!("Balance:        {:>15}", format_cents(summary.balance));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}
