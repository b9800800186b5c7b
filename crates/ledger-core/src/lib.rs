//! Shared domain types for the Ledger Dashboard.
//!
//! Holds the transaction and aggregate models, the net-amount strategy, the
//! error type, small statistics helpers, number formatting and the CLI
//! settings shared by every other crate in the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod stats;

pub use error::{LedgerError, Result};
pub use models::NetAmountStrategy;
