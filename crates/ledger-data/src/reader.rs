//! CSV ingestion for the Ledger Dashboard.
//!
//! Turns the bytes of an uploaded file into a [`TransactionTable`]: the
//! `date` column becomes the date/time index and every other column is kept,
//! typed as numeric when all of its non-empty cells are numbers.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use ledger_core::models::{Column, ColumnValues, TransactionTable};
use ledger_core::{LedgerError, Result};
use tracing::debug;

/// Header name of the date index column.
pub const DATE_COLUMN: &str = "date";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Date-with-time layouts, tried in order. `%.f` also matches no fraction.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, tried in order. Slash dates are month-first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse one date cell. Offsets in RFC 3339 values are dropped and the local
/// wall-clock time is kept.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Read an uploaded file held in memory.
///
/// Input with no header line yields an empty table. A header without a
/// `date` column, or a date cell that cannot be parsed, is an error.
pub fn read_transactions(bytes: &[u8]) -> Result<TransactionTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        debug!("Upload has no header row; treating it as empty");
        return Ok(TransactionTable::default());
    }

    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| LedgerError::MissingColumn(DATE_COLUMN.to_string()))?;

    let mut dates = Vec::new();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| LedgerError::DateParse {
            row,
            value: raw_date.to_string(),
        })?;
        dates.push(date);

        for (col, column_cells) in cells.iter_mut().enumerate() {
            if col != date_idx {
                column_cells.push(record.get(col).unwrap_or("").to_string());
            }
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells)
        .enumerate()
        .filter(|(idx, _)| *idx != date_idx)
        .map(|(_, (name, column_cells))| Column {
            name: name.to_string(),
            values: classify(column_cells),
        })
        .collect();

    debug!(
        "Read {} rows with {} columns besides {:?}",
        dates.len(),
        columns.len(),
        DATE_COLUMN
    );

    Ok(TransactionTable { dates, columns })
}

/// Read a transaction file from disk.
pub fn read_transactions_from_path(path: &Path) -> Result<TransactionTable> {
    let bytes = std::fs::read(path).map_err(|source| LedgerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} bytes from {}", bytes.len(), path.display());
    read_transactions(&bytes)
}

// ── Private ───────────────────────────────────────────────────────────────────

/// Numeric when every non-empty cell parses. Empty cells and non-finite
/// values (`NaN`, `inf`) are missing.
fn classify(cells: Vec<String>) -> ColumnValues {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|c| {
            if c.is_empty() {
                Some(None)
            } else {
                c.parse::<f64>().ok().map(|v| v.is_finite().then_some(v))
            }
        })
        .collect();

    match parsed {
        Some(values) => ColumnValues::Numeric(values),
        None => ColumnValues::Text(cells),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    // ── parse_date ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024/01/05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01/05/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("20240105"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date(" 2024-01-05 "), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_date_with_time() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(13, 45, 10)
            .unwrap();
        assert_eq!(parse_date("2024-01-05 13:45:10"), Some(expected));
        assert_eq!(parse_date("2024-01-05T13:45:10"), Some(expected));
        assert_eq!(parse_date("2024-01-05T13:45:10+02:00"), Some(expected));
        assert!(parse_date("2024-01-05 13:45:10.250").is_some());
        assert!(parse_date("2024-01-05 13:45").is_some());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    // ── read_transactions ────────────────────────────────────────────────────

    #[test]
    fn test_read_basic_file() {
        let csv = "date,debit,credit\n2024-01-05,10,40\n2024-01-20,5,5\n2024-02-01,0,20\n";
        let table = read_transactions(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.dates[0], ymd(2024, 1, 5));
        assert_eq!(
            table.numeric_column("debit").unwrap(),
            &[Some(10.0), Some(5.0), Some(0.0)]
        );
        assert_eq!(
            table.numeric_column("credit").unwrap(),
            &[Some(40.0), Some(5.0), Some(20.0)]
        );
        assert!(table.column("date").is_none());
    }

    #[test]
    fn test_read_keeps_column_order_and_types() {
        let csv = "description,date,debit,credit,fees\nrent,2024-03-01,900,,1.5\nsalary,2024-03-25,,3000,\n";
        let table = read_transactions(csv.as_bytes()).unwrap();

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["description", "debit", "credit", "fees"]);
        assert!(!table.columns[0].is_numeric());
        assert_eq!(table.numeric_column("debit").unwrap(), &[Some(900.0), None]);
        assert_eq!(table.numeric_column("fees").unwrap(), &[Some(1.5), None]);
    }

    #[test]
    fn test_read_strips_bom_and_whitespace() {
        let csv = "\u{feff}date , debit, credit\n 2024-01-05 , 10 , 40 \n";
        let table = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.numeric_column("credit").unwrap(), &[Some(40.0)]);
    }

    #[test]
    fn test_read_empty_input() {
        let table = read_transactions(b"").unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_read_header_only() {
        let table = read_transactions(b"date,debit,credit\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_read_missing_date_column() {
        let err = read_transactions(b"day,debit,credit\n2024-01-05,1,2\n").unwrap_err();
        assert!(matches!(err, LedgerError::MissingColumn(c) if c == "date"));
    }

    #[test]
    fn test_read_malformed_date() {
        let csv = "date,debit,credit\n2024-01-05,1,2\nsoon,3,4\n";
        match read_transactions(csv.as_bytes()) {
            Err(LedgerError::DateParse { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "soon");
            }
            other => panic!("expected DateParse, got {other:?}"),
        }
    }

    #[test]
    fn test_read_text_amount_column_is_kept_as_text() {
        let csv = "date,debit,credit\n2024-01-05,ten,2\n";
        let table = read_transactions(csv.as_bytes()).unwrap();
        assert!(!table.column("debit").unwrap().is_numeric());
        assert!(matches!(
            table.numeric_column("debit"),
            Err(LedgerError::NonNumericColumn { .. })
        ));
    }

    #[test]
    fn test_read_nan_cell_is_missing() {
        let csv = "date,debit,credit\n2024-01-05,NaN,2\n";
        let table = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(table.numeric_column("debit").unwrap(), &[None]);
    }

    #[test]
    fn test_read_infinite_cells_are_missing() {
        let csv = "date,debit,credit\n2024-01-05,inf,-Infinity\n2024-01-06,1,2\n";
        let table = read_transactions(csv.as_bytes()).unwrap();
        assert!(table.column("debit").unwrap().is_numeric());
        assert_eq!(table.numeric_column("debit").unwrap(), &[None, Some(1.0)]);
        assert_eq!(table.numeric_column("credit").unwrap(), &[None, Some(2.0)]);
    }

    #[test]
    fn test_read_ragged_rows_fail() {
        let csv = "date,debit,credit\n2024-01-05,1,2,3\n";
        assert!(matches!(
            read_transactions(csv.as_bytes()),
            Err(LedgerError::CsvParse(_))
        ));
    }

    // ── read_transactions_from_path ──────────────────────────────────────────

    #[test]
    fn test_read_from_path() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "date,debit,credit").unwrap();
        writeln!(file, "2024-06-03,12.5,0").unwrap();
        file.flush().unwrap();

        let table = read_transactions_from_path(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.numeric_column("debit").unwrap(), &[Some(12.5)]);
    }

    #[test]
    fn test_read_from_missing_path() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("absent.csv");
        match read_transactions_from_path(&path) {
            Err(LedgerError::FileRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected FileRead, got {other:?}"),
        }
    }
}
