//! Data layer for the Ledger Dashboard.
//!
//! Reads uploaded transaction files into memory, derives per-row net amounts,
//! reduces them into monthly and weekday tables, and runs the end-to-end
//! analysis pipeline. Nothing here depends on a UI runtime.

pub mod aggregator;
pub mod analysis;
pub mod derive;
pub mod reader;

pub use ledger_core as core;
