//! CSV export of transactions.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::error::{BudgetError, Result};
use crate::fs::write_atomic;
use crate::storage::{Category, Transaction};

/// Column names, in order.
pub const CSV_HEADER: [&str; 5] = ["Date", "Category", "Description", "Amount", "Type"];

/// Label used when a transaction's category no longer exists.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Write one row per transaction, in input order, after the header.
///
/// Dates are the calendar day in `zone`.
pub fn write_csv<W: io::Write, Tz: TimeZone>(
    writer: W,
    transactions: &[Transaction],
    categories: &HashMap<i64, Category>,
    zone: &Tz,
) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv.write_record(CSV_HEADER)?;
    for tx in transactions {
        let category = categories
            .get(&tx.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY);
        let kind = if tx.is_income { "Income" } else { "Expense" };
        csv.write_record([
            tx.date.with_timezone(zone).format("%Y-%m-%d").to_string().as_str(),
            category,
            tx.description.as_str(),
            format!("{:.2}", tx.amount).as_str(),
            kind,
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn to_csv_bytes<Tz: TimeZone>(
    transactions: &[Transaction],
    categories: &HashMap<i64, Category>,
    zone: &Tz,
) -> Result<Vec<u8>>
where
    Tz::Offset: std::fmt::Display,
{
    let mut buffer = Vec::new();
    write_csv(&mut buffer, transactions, categories, zone)?;
    Ok(buffer)
}

/// `budget_tracker_export_<yyyyMMdd_HHmmss>.csv`
pub fn export_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("budget_tracker_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write an export file into `dir`, creating the directory if needed.
///
/// The file name and the row dates both use `now`'s time zone.
///
/// # Returns
///
/// Path of the written file.
pub fn export_to_dir<Tz: TimeZone>(
    dir: &Path,
    transactions: &[Transaction],
    categories: &HashMap<i64, Category>,
    now: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    std::fs::create_dir_all(dir).map_err(|e| {
        BudgetError::Export(format!("Cannot create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(export_file_name(now));
    let data = to_csv_bytes(transactions, categories, &now.timezone())?;
    write_atomic(&path, &data)
        .map_err(|e| BudgetError::Export(format!("Cannot write {}: {}", path.display(), e)))?;

    tracing::debug!("Exported {} transactions to {}", transactions.len(), path.display());
    Ok(path)
}
