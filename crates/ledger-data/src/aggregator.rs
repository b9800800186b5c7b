//! Monthly and weekday aggregation of a derived [`Ledger`].
//!
//! Monthly reductions bucket entries by the last day of their calendar month;
//! the three reductions (sum, mean, median) are computed independently and
//! then inner-joined on their display label. The weekday table always has
//! five rows, Monday to Friday.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use ledger_core::formatting::{month_end, month_label, weekday_name};
use ledger_core::models::{Ledger, LedgerEntry, MonthlyAggregate, MonthlyRow, WeekdayRow};
use ledger_core::stats;

/// Weekdays kept by [`LedgerAggregator::weekday_sum`], in display order.
pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

// ── MonthlyTotals ─────────────────────────────────────────────────────────────

/// Column totals across every row of the merged monthly table.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct MonthlyTotals {
    pub debit: f64,
    pub credit: f64,
    pub net_amount: f64,
    /// Number of months (rows) represented.
    pub months: usize,
}

// ── LedgerAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that reduces ledger entries by month and by weekday.
pub struct LedgerAggregator;

impl LedgerAggregator {
    /// Per-month sums of debit, credit and net amount.
    pub fn monthly_sum(ledger: &Ledger) -> Vec<MonthlyAggregate> {
        Self::aggregate_by_month(ledger, |values| Some(stats::sum(values)))
    }

    /// Per-month arithmetic means of debit, credit and net amount.
    pub fn monthly_average(ledger: &Ledger) -> Vec<MonthlyAggregate> {
        Self::aggregate_by_month(ledger, stats::mean)
    }

    /// Per-month medians of debit, credit and net amount.
    pub fn monthly_median(ledger: &Ledger) -> Vec<MonthlyAggregate> {
        Self::aggregate_by_month(ledger, stats::median)
    }

    /// Inner-join the three monthly reductions on their month label.
    ///
    /// Rows keep the order of `sum`. A label missing from `average` or
    /// `median` drops the row. Only the summed debit and credit survive.
    pub fn merge_monthly(
        sum: &[MonthlyAggregate],
        average: &[MonthlyAggregate],
        median: &[MonthlyAggregate],
    ) -> Vec<MonthlyRow> {
        let by_label = |rows: &[MonthlyAggregate]| -> HashMap<String, Option<f64>> {
            rows.iter()
                .map(|r| (r.month_label.clone(), r.net_amount))
                .collect()
        };
        let averages = by_label(average);
        let medians = by_label(median);

        sum.iter()
            .filter_map(|s| {
                let avg = averages.get(&s.month_label)?;
                let med = medians.get(&s.month_label)?;
                Some(MonthlyRow {
                    month_label: s.month_label.clone(),
                    debit: s.debit.unwrap_or(0.0),
                    credit: s.credit.unwrap_or(0.0),
                    sum_net_amount: s.net_amount.unwrap_or(0.0),
                    avg_net_amount: *avg,
                    median_net_amount: *med,
                })
            })
            .collect()
    }

    /// Sum, average and median merged into one table.
    pub fn monthly_table(ledger: &Ledger) -> Vec<MonthlyRow> {
        Self::merge_monthly(
            &Self::monthly_sum(ledger),
            &Self::monthly_average(ledger),
            &Self::monthly_median(ledger),
        )
    }

    /// Sum every numeric column per weekday, Monday to Friday.
    ///
    /// Weekend entries are dropped. A weekday with no entries yields a row of
    /// missing values.
    pub fn weekday_sum(ledger: &Ledger) -> Vec<WeekdayRow> {
        let mut groups: [Vec<&LedgerEntry>; 5] = Default::default();
        for entry in &ledger.entries {
            let idx = entry.date.weekday().num_days_from_monday() as usize;
            if let Some(group) = groups.get_mut(idx) {
                group.push(entry);
            }
        }

        WEEKDAYS
            .iter()
            .zip(groups)
            .map(|(&day, group)| {
                let name = weekday_name(day);
                if group.is_empty() {
                    return WeekdayRow::missing(name, &ledger.extra_columns);
                }
                let extras: BTreeMap<String, Option<f64>> = ledger
                    .extra_columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        let total = stats::sum(group.iter().map(|e| e.extras[i]));
                        (column.clone(), Some(total))
                    })
                    .collect();
                WeekdayRow {
                    day: name.to_string(),
                    debit: Some(stats::sum(group.iter().map(|e| e.debit))),
                    credit: Some(stats::sum(group.iter().map(|e| e.credit))),
                    net_amount: Some(stats::sum(group.iter().map(|e| e.net_amount))),
                    extras,
                }
            })
            .collect()
    }

    /// Sum up the merged monthly rows.
    pub fn calculate_totals(rows: &[MonthlyRow]) -> MonthlyTotals {
        rows.iter().fold(
            MonthlyTotals {
                months: rows.len(),
                ..MonthlyTotals::default()
            },
            |mut totals, row| {
                totals.debit += row.debit;
                totals.credit += row.credit;
                totals.net_amount += row.sum_net_amount;
                totals
            },
        )
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic monthly driver.
    ///
    /// `reduce` collapses the values of one column within one month.
    fn aggregate_by_month(
        ledger: &Ledger,
        reduce: impl Fn(Vec<Option<f64>>) -> Option<f64>,
    ) -> Vec<MonthlyAggregate> {
        // BTreeMap keeps the buckets chronological.
        let mut buckets: BTreeMap<NaiveDate, Vec<&LedgerEntry>> = BTreeMap::new();
        for entry in &ledger.entries {
            buckets
                .entry(month_end(entry.date.date()))
                .or_default()
                .push(entry);
        }

        buckets
            .into_iter()
            .map(|(month_end, entries)| {
                let column = |f: fn(&LedgerEntry) -> Option<f64>| -> Option<f64> {
                    reduce(entries.iter().map(|e| f(e)).collect())
                };
                MonthlyAggregate {
                    month_end,
                    month_label: month_label(month_end),
                    debit: column(|e| e.debit),
                    credit: column(|e| e.credit),
                    net_amount: column(|e| e.net_amount),
                }
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
