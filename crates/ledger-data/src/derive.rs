//! Net-amount derivation.

use ledger_core::models::{Ledger, LedgerEntry, NetAmountStrategy, TransactionTable};
use ledger_core::Result;
use tracing::debug;

pub const DEBIT_COLUMN: &str = "debit";
pub const CREDIT_COLUMN: &str = "credit";

/// Attach a net amount to every row of `table`.
///
/// The `debit` and `credit` columns must exist and be numeric. A table with
/// no rows is returned as an empty ledger without touching any column.
pub fn derive_ledger(table: &TransactionTable, strategy: NetAmountStrategy) -> Result<Ledger> {
    if table.is_empty() {
        return Ok(Ledger {
            strategy,
            ..Ledger::default()
        });
    }

    let debits = table.numeric_column(DEBIT_COLUMN)?;
    let credits = table.numeric_column(CREDIT_COLUMN)?;

    let extras: Vec<(&str, &[Option<f64>])> = table
        .columns
        .iter()
        .filter(|c| c.name != DEBIT_COLUMN && c.name != CREDIT_COLUMN)
        .filter_map(|c| c.as_numeric().ok().map(|v| (c.name.as_str(), v)))
        .collect();

    let entries = table
        .dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let debit = debits[i];
            let credit = credits[i];
            LedgerEntry {
                date,
                debit,
                credit,
                net_amount: strategy.net_amount_opt(debit, credit),
                extras: extras.iter().map(|(_, values)| values[i]).collect(),
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "Derived {} net amounts ({} strategy, {} extra numeric columns)",
        entries.len(),
        strategy,
        extras.len()
    );

    Ok(Ledger {
        strategy,
        extra_columns: extras.iter().map(|(name, _)| name.to_string()).collect(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_transactions;
    use ledger_core::LedgerError;

    fn ledger_from(csv: &str, strategy: NetAmountStrategy) -> Result<Ledger> {
        derive_ledger(&read_transactions(csv.as_bytes())?, strategy)
    }

    #[test]
    fn test_credit_based_net_amounts() {
        let csv = "date,debit,credit\n2024-01-05,10,40\n2024-01-20,5,5\n2024-02-01,0,20\n";
        let ledger = ledger_from(csv, NetAmountStrategy::CreditBased).unwrap();

        let nets: Vec<Option<f64>> = ledger.entries.iter().map(|e| e.net_amount).collect();
        assert_eq!(nets, vec![Some(30.0), Some(0.0), Some(20.0)]);
        assert!(ledger.entries[1].net_amount.unwrap().is_sign_positive());
    }

    #[test]
    fn test_debit_based_net_amounts() {
        let csv = "date,debit,credit\n2024-01-05,10,40\n2024-01-20,5,5\n";
        let ledger = ledger_from(csv, NetAmountStrategy::DebitBased).unwrap();

        assert_eq!(ledger.strategy, NetAmountStrategy::DebitBased);
        assert_eq!(ledger.entries[0].net_amount, Some(-30.0));
        let zero = ledger.entries[1].net_amount.unwrap();
        assert_eq!(zero, 0.0);
        assert!(zero.is_sign_positive());
    }

    #[test]
    fn test_missing_side_gives_missing_net() {
        let csv = "date,debit,credit\n2024-01-05,,40\n";
        let ledger = ledger_from(csv, NetAmountStrategy::CreditBased).unwrap();
        assert_eq!(ledger.entries[0].net_amount, None);
        assert_eq!(ledger.entries[0].credit, Some(40.0));
    }

    #[test]
    fn test_extra_numeric_columns_are_carried() {
        let csv = "date,note,debit,credit,fees\n2024-01-05,coffee,4,0,0.5\n";
        let ledger = ledger_from(csv, NetAmountStrategy::CreditBased).unwrap();
        assert_eq!(ledger.extra_columns, vec!["fees".to_string()]);
        assert_eq!(ledger.entries[0].extras, vec![Some(0.5)]);
    }

    #[test]
    fn test_missing_credit_column_fails() {
        let csv = "date,debit\n2024-01-05,10\n";
        let err = ledger_from(csv, NetAmountStrategy::CreditBased).unwrap_err();
        assert!(matches!(err, LedgerError::MissingColumn(c) if c == "credit"));
    }

    #[test]
    fn test_non_numeric_debit_fails() {
        let csv = "date,debit,credit\n2024-01-05,lots,10\n";
        let err = ledger_from(csv, NetAmountStrategy::CreditBased).unwrap_err();
        assert!(matches!(err, LedgerError::NonNumericColumn { column, .. } if column == "debit"));
    }

    #[test]
    fn test_empty_table_skips_column_checks() {
        let ledger = ledger_from("", NetAmountStrategy::CreditBased).unwrap();
        assert!(ledger.is_empty());

        let ledger = ledger_from("date,debit\n", NetAmountStrategy::CreditBased).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_overflowing_net_amount_is_missing() {
        let csv = "date,debit,credit\n2024-01-05,-1.7e308,1.7e308\n2024-01-06,50,20\n";
        let ledger = ledger_from(csv, NetAmountStrategy::CreditBased).unwrap();
        assert_eq!(ledger.entries[0].net_amount, None);
        assert_eq!(ledger.entries[1].net_amount, Some(-30.0));
    }
}
