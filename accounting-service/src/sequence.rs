//! Document-number generation
//!
//! Every numbered document in the platform (journal entries, donation
//! receipts, seva bookings, purchases, payroll, verifications, ...) uses the
//! same format: `PREFIX/YYYY/NNNN`, sequential per temple and year, suffix
//! zero-padded to four digits. Hundi collections carry the hundi code inside
//! the prefix (`HUNDI/<code>/YYYY/NNNN`).
//!
//! Generation reads the highest existing suffix inside the caller's
//! transaction. Concurrent writers can still observe the same maximum; the
//! insert then trips the per-temple unique constraint on the number column
//! and the caller regenerates once (see [`is_unique_violation`]).

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::error::AccountingResult;

/// Format a document number from its parts.
pub fn format_document_number(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{}/{}/{:04}", prefix, year, sequence)
}

/// Extract the numeric suffix of a document number, if any.
pub fn sequence_suffix(number: &str) -> Option<u32> {
    number.rsplit('/').next()?.parse().ok()
}

/// True when the error is a PostgreSQL unique-constraint violation (23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Next document number for the current calendar year.
pub async fn next_document_number<'e, E>(
    executor: E,
    temple_id: Uuid,
    table: &str,
    column: &str,
    prefix: &str,
) -> AccountingResult<String>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let year = Utc::now().date_naive().year();
    next_document_number_for_year(executor, temple_id, table, column, prefix, year).await
}

/// Next document number for an explicit year.
///
/// `table` and `column` are compile-time literals at every call site, never
/// user input.
pub async fn next_document_number_for_year<'e, E>(
    executor: E,
    temple_id: Uuid,
    table: &str,
    column: &str,
    prefix: &str,
    year: i32,
) -> AccountingResult<String>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let sql = format!(
        "SELECT MAX(CAST(substring({column} from '[0-9]+$') AS INTEGER)) \
         FROM {table} WHERE temple_id = $1 AND {column} LIKE $2",
        column = column,
        table = table,
    );

    let last: Option<i32> = sqlx::query_scalar(&sql)
        .bind(temple_id)
        .bind(format!("{}/{}/%", prefix, year))
        .fetch_one(executor)
        .await?;

    let next = last.unwrap_or(0) + 1;
    Ok(format_document_number(prefix, year, next as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_document_number() {
        assert_eq!(format_document_number("JE", 2026, 1), "JE/2026/0001");
        assert_eq!(format_document_number("JE", 2026, 42), "JE/2026/0042");
        assert_eq!(format_document_number("PUR", 2026, 9999), "PUR/2026/9999");
        // Past four digits the number keeps growing rather than wrapping
        assert_eq!(format_document_number("JE", 2026, 10000), "JE/2026/10000");
    }

    #[test]
    fn test_hundi_prefix_keeps_code() {
        assert_eq!(
            format_document_number("HUNDI/MAIN", 2026, 7),
            "HUNDI/MAIN/2026/0007"
        );
    }

    #[test]
    fn test_sequence_suffix() {
        assert_eq!(sequence_suffix("JE/2026/0042"), Some(42));
        assert_eq!(sequence_suffix("HUNDI/MAIN/2026/0007"), Some(7));
        assert_eq!(sequence_suffix("JE/2026/10000"), Some(10000));
        assert_eq!(sequence_suffix("not-a-number/"), None);
    }

    #[test]
    fn test_sequence_is_gapless_when_serial() {
        let mut last = 0;
        for n in 1..=25u32 {
            let number = format_document_number("SEV", 2026, n);
            let suffix = sequence_suffix(&number).unwrap();
            assert_eq!(suffix, last + 1);
            last = suffix;
        }
    }
}
