//! HTTP runtime for the Ledger Dashboard.
//!
//! Serves the upload page, accepts multipart uploads, runs the analysis
//! pipeline per request and answers with the rendered dashboard or JSON.

pub mod server;
pub mod upload;

pub use ledger_core as core;
pub use ledger_data as data;
