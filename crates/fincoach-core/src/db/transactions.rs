//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_col, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

/// Result of inserting a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionInsertResult {
    /// Transaction was inserted successfully, contains new transaction ID
    Inserted(i64),
    /// Transaction was a duplicate, contains existing transaction ID
    Duplicate(i64),
}

/// Counts from a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

impl Database {
    /// Insert a transaction (skips duplicates of the profile's earlier imports)
    pub fn insert_transaction(
        &self,
        profile_id: i64,
        tx: &NewTransaction,
    ) -> Result<TransactionInsertResult> {
        let conn = self.conn()?;

        if let Some(hash) = &tx.import_hash {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE profile_id = ? AND import_hash = ?",
                    params![profile_id, hash],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (profile_id, date, amount, category, note, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                profile_id,
                tx.date.to_string(),
                tx.amount.to_string(),
                tx.category.as_str(),
                tx.note,
                tx.import_hash,
            ],
        )?;

        Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()))
    }

    /// Insert a batch of parsed transactions, counting duplicates
    pub fn import_transactions(
        &self,
        profile_id: i64,
        transactions: &[NewTransaction],
    ) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for tx in transactions {
            match self.insert_transaction(profile_id, tx)? {
                TransactionInsertResult::Inserted(_) => summary.inserted += 1,
                TransactionInsertResult::Duplicate(_) => summary.duplicates += 1,
            }
        }

        tracing::info!(
            profile_id,
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            "Imported transactions"
        );
        Ok(summary)
    }

    /// List a profile's transactions in an inclusive date range, oldest first
    pub fn list_transactions(
        &self,
        profile_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, date, amount, category, note
            FROM transactions
            WHERE profile_id = ?1
              AND (?2 IS NULL OR date >= ?2)
              AND (?3 IS NULL OR date <= ?3)
            ORDER BY date, id
            "#,
        )?;

        let transactions = stmt
            .query_map(
                params![
                    profile_id,
                    from.map(|d| d.to_string()),
                    to.map(|d| d.to_string())
                ],
                |row| {
                    Ok(Transaction {
                        id: row.get(0)?,
                        date: parse_col(row, 1)?,
                        amount: parse_col(row, 2)?,
                        category: parse_col(row, 3)?,
                        note: row.get(4)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    pub fn count_transactions(&self, profile_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE profile_id = ?",
            params![profile_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
