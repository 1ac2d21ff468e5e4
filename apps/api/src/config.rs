use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    File,
    Postgres,
}

impl FromStr for LedgerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LedgerBackend::File),
            "postgres" | "postgresql" => Ok(LedgerBackend::Postgres),
            other => bail!("LEDGER_BACKEND must be 'file' or 'postgres', got '{other}'"),
        }
    }
}

/// Document format served by the seating chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Pdf,
    Markdown,
}

impl FromStr for ChartFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ChartFormat::Pdf),
            "markdown" | "md" => Ok(ChartFormat::Markdown),
            other => bail!("CHART_FORMAT must be 'pdf' or 'markdown', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a value is present but invalid, or if the chosen
/// ledger backend is missing what it needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ledger_backend: LedgerBackend,
    pub ledger_path: PathBuf,
    /// Required only for the postgres backend.
    pub database_url: Option<String>,
    pub ledger_timeout: Duration,
    /// Catalog JSON file; the synthetic catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    pub catalog_seed: u64,
    pub chart_format: ChartFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ledger_backend: LedgerBackend = lookup("LEDGER_BACKEND")
            .unwrap_or_else(|| "file".to_string())
            .parse()?;

        let database_url = lookup("DATABASE_URL");
        if ledger_backend == LedgerBackend::Postgres && database_url.is_none() {
            bail!("Required environment variable 'DATABASE_URL' is not set (LEDGER_BACKEND=postgres)");
        }

        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            ledger_backend,
            ledger_path: lookup("LEDGER_PATH")
                .unwrap_or_else(|| "exam_assignments.log".to_string())
                .into(),
            database_url,
            ledger_timeout: Duration::from_millis(
                lookup("LEDGER_TIMEOUT_MS")
                    .unwrap_or_else(|| "5000".to_string())
                    .parse::<u64>()
                    .context("LEDGER_TIMEOUT_MS must be a whole number of milliseconds")?,
            ),
            catalog_path: lookup("CATALOG_PATH").map(PathBuf::from),
            catalog_seed: lookup("CATALOG_SEED")
                .unwrap_or_else(|| "0".to_string())
                .parse::<u64>()
                .context("CATALOG_SEED must be an unsigned integer")?,
            chart_format: lookup("CHART_FORMAT")
                .unwrap_or_else(|| "pdf".to_string())
                .parse()?,
        })
    }
}
