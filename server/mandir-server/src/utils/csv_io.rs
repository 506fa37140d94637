//! CSV parsing and writing helpers for bulk import/export endpoints.
//!
//! Import endpoints are lenient per row: a bad row is recorded (or skipped,
//! for bank statements) without aborting the batch.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ApiError;

/// Date formats accepted across bulk imports, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y"];

/// Parse a date in any of the accepted formats.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse an amount cell. Bank exports often carry thousands separators and
/// blank cells for the unused side.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '\u{20b9}')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Serialize rows to a CSV string with headers.
pub fn to_csv_string<T: Serialize>(rows: &[T]) -> Result<String, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ApiError::internal(format!("CSV serialization failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::internal(format!("CSV encoding failed: {}", e)))
}

/// Read all records from CSV text with headers.
pub fn read_csv_records(body: &str) -> Result<(csv::StringRecord, Vec<csv::StringRecord>), ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApiError::bad_request(format!("Invalid CSV header: {}", e)))?
        .clone();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ApiError::bad_request(format!("Invalid CSV row: {}", e)))?;
        records.push(record);
    }
    Ok((headers, records))
}

/// Column lookup by header name, case-insensitive.
pub fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flexible_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 4, 15).unwrap();
        assert_eq!(parse_flexible_date("2026-04-15"), Some(expected));
        assert_eq!(parse_flexible_date("15/04/2026"), Some(expected));
        assert_eq!(parse_flexible_date("15-04-2026"), Some(expected));
        assert_eq!(parse_flexible_date(" 2026-04-15 "), Some(expected));
        assert_eq!(parse_flexible_date("April 15"), None);
        assert_eq!(parse_flexible_date(""), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,25,000.50"), Some(Decimal::new(12500050, 2)));
        assert_eq!(parse_amount("500"), Some(Decimal::new(500, 0)));
        assert_eq!(parse_amount(" 42.00 "), Some(Decimal::new(4200, 2)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
    }

    #[test]
    fn test_read_csv_and_column_lookup() {
        let body = "Date,Description,Debit,Credit\n2026-04-01,Opening,100.00,\n";
        let (headers, records) = read_csv_records(body).unwrap();
        assert_eq!(column_index(&headers, "date"), Some(0));
        assert_eq!(column_index(&headers, "DEBIT"), Some(2));
        assert_eq!(column_index(&headers, "Balance"), None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(1), Some("Opening"));
    }

    #[test]
    fn test_to_csv_string() {
        #[derive(Serialize)]
        struct Row {
            name: String,
            amount: Decimal,
        }
        let rows = vec![Row {
            name: "Annadanam".to_string(),
            amount: Decimal::new(50000, 2),
        }];
        let out = to_csv_string(&rows).unwrap();
        assert!(out.starts_with("name,amount"));
        assert!(out.contains("Annadanam,500.00"));
    }
}
