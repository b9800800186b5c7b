//! End-to-end analysis pipeline.
//!
//! Ingest → derive → aggregate, returning a [`Dashboard`] ready for the
//! presentation layer. Every call recomputes everything from the input.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use ledger_core::models::{MonthlyRow, NetAmountStrategy, TransactionTable, WeekdayRow};
use ledger_core::Result;
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{LedgerAggregator, MonthlyTotals};
use crate::derive::derive_ledger;
use crate::reader::{read_transactions, read_transactions_from_path};

// ── Public types ──────────────────────────────────────────────────────────────

/// All derived tables of one upload.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Strategy the net amounts were derived with.
    pub strategy: NetAmountStrategy,
    /// Number of input rows.
    pub rows: usize,
    /// Merged monthly table, chronological.
    pub monthly: Vec<MonthlyRow>,
    /// Weekday table, always Monday to Friday.
    pub weekday: Vec<WeekdayRow>,
    /// Totals across the monthly table.
    pub totals: MonthlyTotals,
    /// Extra numeric columns summed into the weekday table.
    pub extra_columns: Vec<String>,
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
}

impl Dashboard {
    /// `true` when the input had no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run derivation and aggregation over an already ingested table.
pub fn analyze_table(table: &TransactionTable, strategy: NetAmountStrategy) -> Result<Dashboard> {
    let start = Instant::now();

    let ledger = derive_ledger(table, strategy)?;
    let monthly = LedgerAggregator::monthly_table(&ledger);
    let weekday = LedgerAggregator::weekday_sum(&ledger);
    let totals = LedgerAggregator::calculate_totals(&monthly);

    debug!(
        "Analysed {} rows into {} months in {:.3}s",
        ledger.len(),
        monthly.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Dashboard {
        strategy,
        rows: ledger.len(),
        monthly,
        weekday,
        totals,
        extra_columns: ledger.extra_columns,
        generated_at: Utc::now().to_rfc3339(),
    })
}

/// Full pipeline over the bytes of an uploaded file.
pub fn analyze_bytes(bytes: &[u8], strategy: NetAmountStrategy) -> Result<Dashboard> {
    analyze_table(&read_transactions(bytes)?, strategy)
}

/// Full pipeline over a file on disk.
pub fn analyze_path(path: &Path, strategy: NetAmountStrategy) -> Result<Dashboard> {
    analyze_table(&read_transactions_from_path(path)?, strategy)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
