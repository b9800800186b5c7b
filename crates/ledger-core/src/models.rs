use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};

// ── NetAmountStrategy ─────────────────────────────────────────────────────────

/// Determines which side of a transaction counts as positive net amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetAmountStrategy {
    /// `credit - debit`: money coming in is positive.
    #[default]
    #[serde(rename = "credit")]
    CreditBased,
    /// `debit - credit`: money going out is positive.
    #[serde(rename = "debit")]
    DebitBased,
}

impl NetAmountStrategy {
    /// Both strategies, in the order they are offered to the user.
    pub const ALL: [NetAmountStrategy; 2] = [Self::CreditBased, Self::DebitBased];

    /// Net amount of a single transaction.
    ///
    /// An exact-zero difference is returned as `0.0` so that `-0.0` never
    /// reaches the aggregates or the charts.
    pub fn net_amount(self, debit: f64, credit: f64) -> f64 {
        let diff = match self {
            Self::CreditBased => credit - debit,
            Self::DebitBased => debit - credit,
        };
        if diff == 0.0 {
            0.0
        } else {
            diff
        }
    }

    /// Like [`net_amount`](Self::net_amount) but propagates a missing side.
    /// A non-finite result (an overflow, or an infinite input) is missing too.
    pub fn net_amount_opt(self, debit: Option<f64>, credit: Option<f64>) -> Option<f64> {
        let net = self.net_amount(debit?, credit?);
        net.is_finite().then_some(net)
    }

    /// Short identifier used on the command line and in form fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditBased => "credit",
            Self::DebitBased => "debit",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditBased => "Credit Based",
            Self::DebitBased => "Debit Based",
        }
    }
}

impl fmt::Display for NetAmountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetAmountStrategy {
    type Err = LedgerError;

    /// Accepts `credit`/`debit` as well as the long forms `credit-based`,
    /// `credit based` (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        let normalised = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalised.as_str() {
            "credit" | "credit based" => Ok(Self::CreditBased),
            "debit" | "debit based" => Ok(Self::DebitBased),
            _ => Err(LedgerError::InvalidStrategy(s.to_string())),
        }
    }
}

// ── Ingested table ────────────────────────────────────────────────────────────

/// Cell values of one non-date column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Every non-empty cell parsed as a number. Empty cells are `None`.
    Numeric(Vec<Option<f64>>),
    /// At least one cell is not a number; raw (trimmed) cell text is kept.
    Text(Vec<String>),
}

/// One named column of an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    /// Borrow the numeric cells, or report the first cell that is not a number.
    ///
    /// Row numbers in the error are 1-based data rows (the header excluded).
    pub fn as_numeric(&self) -> Result<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(values) => Ok(values),
            ColumnValues::Text(cells) => {
                let (idx, value) = cells
                    .iter()
                    .enumerate()
                    .find(|(_, c)| !c.is_empty() && c.parse::<f64>().is_err())
                    .map(|(i, c)| (i, c.clone()))
                    .unwrap_or_default();
                Err(LedgerError::NonNumericColumn {
                    column: self.name.clone(),
                    row: idx + 1,
                    value,
                })
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }
}

/// An uploaded file held in memory: the parsed date index plus every other
/// column, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTable {
    pub dates: Vec<NaiveDateTime>,
    pub columns: Vec<Column>,
}

impl TransactionTable {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Look up a column by its exact header name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column that must exist and hold numbers.
    pub fn numeric_column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.column(name)
            .ok_or_else(|| LedgerError::MissingColumn(name.to_string()))?
            .as_numeric()
    }
}

// ── Ledger ────────────────────────────────────────────────────────────────────

/// A transaction with its derived net amount attached.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub date: NaiveDateTime,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    /// `None` when either side is missing.
    pub net_amount: Option<f64>,
    /// Values of [`Ledger::extra_columns`], index-aligned.
    pub extras: Vec<Option<f64>>,
}

/// All entries of one upload after net-amount derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub strategy: NetAmountStrategy,
    /// Names of the numeric columns other than `debit` and `credit`.
    pub extra_columns: Vec<String>,
    pub entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Aggregates ────────────────────────────────────────────────────────────────

/// Output of one monthly reduction (sum, mean or median).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAggregate {
    /// Last calendar day of the month, the bucket key.
    pub month_end: NaiveDate,
    /// Display label, e.g. `"January 2024"`.
    pub month_label: String,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub net_amount: Option<f64>,
}

/// One row of the merged monthly table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    pub month_label: String,
    /// Sum of debits in the month.
    pub debit: f64,
    /// Sum of credits in the month.
    pub credit: f64,
    pub sum_net_amount: f64,
    pub avg_net_amount: Option<f64>,
    pub median_net_amount: Option<f64>,
}

/// One row of the weekday table. Every value is `None` for a weekday that
/// has no records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayRow {
    /// Full weekday name, `"Monday"` … `"Friday"`.
    pub day: String,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub net_amount: Option<f64>,
    /// Sums of the extra numeric columns, keyed by column name.
    #[serde(default)]
    pub extras: BTreeMap<String, Option<f64>>,
}

impl WeekdayRow {
    /// A row with every value missing.
    pub fn missing(day: impl Into<String>, extra_columns: &[String]) -> Self {
        Self {
            day: day.into(),
            debit: None,
            credit: None,
            net_amount: None,
            extras: extra_columns.iter().map(|c| (c.clone(), None)).collect(),
        }
    }
}
