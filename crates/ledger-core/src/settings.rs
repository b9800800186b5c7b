use clap::Parser;
use std::path::PathBuf;

use crate::error::{LedgerError, Result};
use crate::models::NetAmountStrategy;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Browser dashboard for monthly and weekday analysis of transaction CSVs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ledger-dashboard",
    about = "Browser dashboard for monthly and weekday analysis of transaction CSVs",
    version
)]
pub struct Settings {
    /// Address the HTTP server binds to
    #[arg(long, env = "LEDGER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port the HTTP server listens on
    #[arg(long, env = "LEDGER_PORT", default_value = "8501")]
    pub port: u16,

    /// Default net-amount strategy (credit = credit - debit)
    #[arg(long, default_value = "credit", value_parser = ["credit", "debit"])]
    pub strategy: String,

    /// Currency label shown on chart axes and tables
    #[arg(long, default_value = "CHF")]
    pub currency: String,

    /// Display theme
    #[arg(long, default_value = "light", value_parser = ["light", "dark"])]
    pub theme: String,

    /// CSV file analysed at startup and shown until the first upload
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and resolve derived values.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`load`](Self::load) but with an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    /// Apply the `--debug` flag.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Check what clap cannot: a non-blank host, and `--input` / `--log-file`
    /// paths that do not name directories.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(LedgerError::Config("--host must not be empty".to_string()));
        }
        for (flag, path) in [("--input", &self.input), ("--log-file", &self.log_file)] {
            if let Some(path) = path.as_ref().filter(|p| p.is_dir()) {
                return Err(LedgerError::Config(format!(
                    "{} {} is a directory",
                    flag,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// The configured default strategy.
    pub fn net_amount_strategy(&self) -> Result<NetAmountStrategy> {
        self.strategy.parse()
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
