//! Transaction command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use fincoach_core::db::{Database, TransactionInsertResult};
use fincoach_core::import::parse_csv;
use fincoach_core::models::{Category, NewTransaction};
use rust_decimal::Decimal;

use super::{format_amount, parse_date, parse_optional_date, truncate};

pub fn cmd_tx_add(
    db: &Database,
    profile_id: i64,
    date: &str,
    amount: Decimal,
    category: Category,
    note: &str,
) -> Result<()> {
    db.require_profile(profile_id)?;
    let tx = NewTransaction {
        date: parse_date(date, "transaction")?,
        amount,
        category,
        note: note.to_string(),
        import_hash: None,
    };

    match db.insert_transaction(profile_id, &tx)? {
        TransactionInsertResult::Inserted(id) | TransactionInsertResult::Duplicate(id) => {
            println!(
                "✅ Recorded transaction {}: {} {} {}",
                id,
                tx.date,
                format_amount(tx.amount),
                tx.category
            );
        }
    }
    Ok(())
}

pub fn cmd_tx_list(
    db: &Database,
    profile_id: i64,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let from = parse_optional_date(from, "--from")?;
    let to = parse_optional_date(to, "--to")?;
    let transactions = db.list_transactions(profile_id, from, to)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  fincoach tx import --profile {} --file bank.csv", profile_id);
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &transactions {
        println!(
            "   {} │ {:>20} │ {:<13} │ {}",
            tx.date,
            format_amount(tx.amount),
            tx.category,
            truncate(&tx.note, 30)
        );
    }

    let net: Decimal = transactions.iter().map(|t| t.amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} transactions, net {}", transactions.len(), format_amount(net));

    Ok(())
}

pub fn cmd_tx_import(db: &Database, profile_id: i64, file: &Path) -> Result<()> {
    db.require_profile(profile_id)?;

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing {}...", file.display());

    let transactions = parse_csv(csv_file).context("Failed to parse CSV")?;
    println!("   Parsed {} transactions", transactions.len());

    let summary = db.import_transactions(profile_id, &transactions)?;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {}", summary.inserted);
    println!("   Skipped (duplicates): {}", summary.duplicates);

    Ok(())
}
