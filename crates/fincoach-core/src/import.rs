//! CSV transaction import
//!
//! Expected header: `date,amount,category,note`. Expenses are negative.
//! Each row gets an import hash so importing the same file twice does not
//! duplicate transactions.

use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, NewTransaction};

const EXPECTED_HEADERS: [&str; 4] = ["date", "amount", "category", "note"];

/// Parse a CSV file into transactions ready for insertion
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    check_headers(&headers)?;

    let mut transactions = Vec::new();
    // Identical rows within one file are distinct transactions
    let mut seen: HashMap<String, u32> = HashMap::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = i + 2;

        let date_str = field(&record, 0, "date", line)?;
        let date = parse_date(date_str).map_err(|e| at_line(line, e))?;

        let amount_str = field(&record, 1, "amount", line)?;
        let amount = parse_amount(amount_str).map_err(|e| at_line(line, e))?;

        let category = match record.get(2).filter(|s| !s.is_empty()) {
            Some(s) => Category::from_str(s)
                .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?,
            None => Category::Other,
        };

        let note = record.get(3).unwrap_or_default().to_string();

        let row_key = row_key(&date, &amount, category, &note);
        let ordinal = seen.entry(row_key.clone()).or_insert(0);
        let import_hash = generate_hash(&row_key, *ordinal);
        *ordinal += 1;

        transactions.push(NewTransaction {
            date,
            amount,
            category,
            note,
            import_hash: Some(import_hash),
        });
    }

    debug!(count = transactions.len(), "Parsed CSV");
    Ok(transactions)
}

fn check_headers(headers: &StringRecord) -> Result<()> {
    let found: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let matches = found.len() >= 3
        && found
            .iter()
            .zip(EXPECTED_HEADERS.iter())
            .all(|(found, expected)| found == expected);
    if !matches {
        return Err(Error::Import(format!(
            "Unexpected CSV header '{}', expected '{}'",
            headers.iter().collect::<Vec<_>>().join(","),
            EXPECTED_HEADERS.join(",")
        )));
    }
    Ok(())
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str, line: usize) -> Result<&'r str> {
    record
        .get(index)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import(format!("line {}: missing {}", line, name)))
}

fn at_line(line: usize, e: Error) -> Error {
    match e {
        Error::Import(msg) => Error::Import(format!("line {}: {}", line, msg)),
        other => other,
    }
}

fn row_key(date: &NaiveDate, amount: &Decimal, category: Category, note: &str) -> String {
    // normalize() so "10" and "10.00" hash the same
    format!("{}|{}|{}|{}", date, amount.normalize(), category, note)
}

/// SHA-256 over the row contents and its ordinal among identical rows
fn generate_hash(row_key: &str, ordinal: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(row_key.as_bytes());
    hasher.update(b"|");
    hasher.update(ordinal.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols, commas and
/// accounting-style parentheses
fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    Decimal::from_str(&cleaned).map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}
