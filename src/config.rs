//! Runtime settings read from the environment (and `.env` via `dotenvy`).

use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_LOG_FILE: &str = "logs/gradebook.log";
const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Settings shared by all subcommands. CLI flags take precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct GradebookConfig {
    /// `LOG_FILE_PATH`: JSON log file; rotated daily.
    pub log_file_path: String,
    /// `GRADEBOOK_API_TOKEN`: bearer token for HTTP sources.
    pub api_token: Option<String>,
    /// `GRADEBOOK_CONCURRENCY`: students graded in parallel by `report`.
    pub concurrency: usize,
    /// `GRADEBOOK_HTTP_TIMEOUT_SECS`: per-request timeout for HTTP sources.
    pub http_timeout: Duration,
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            log_file_path: DEFAULT_LOG_FILE.to_string(),
            api_token: None,
            concurrency: DEFAULT_CONCURRENCY,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl GradebookConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("LOG_FILE_PATH") {
            config.log_file_path = path;
        }

        config.api_token = lookup("GRADEBOOK_API_TOKEN").filter(|t| !t.is_empty());

        if let Some(raw) = lookup("GRADEBOOK_CONCURRENCY") {
            let concurrency: usize = raw
                .parse()
                .with_context(|| format!("GRADEBOOK_CONCURRENCY must be an integer, got '{raw}'"))?;
            anyhow::ensure!(concurrency > 0, "GRADEBOOK_CONCURRENCY must be at least 1");
            config.concurrency = concurrency;
        }

        if let Some(raw) = lookup("GRADEBOOK_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().with_context(|| {
                format!("GRADEBOOK_HTTP_TIMEOUT_SECS must be an integer, got '{raw}'")
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
