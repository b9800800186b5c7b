//! Presentation layer for the Ledger Dashboard.
//!
//! Provides themes, server-rendered SVG bar charts and the HTML page that
//! binds them to the derived monthly and weekday tables.

pub mod charts;
pub mod markup;
pub mod page;
pub mod themes;

pub use ledger_core as core;
