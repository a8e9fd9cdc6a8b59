use anyhow::{bail, Context, Result};

use crate::analysis::AnalyzerConfig;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// Serve the canned fallback analysis when the remote call fails.
    pub fallback_on_error: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            analyzer: AnalyzerConfig::from_env()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            fallback_on_error: match std::env::var("ANALYSIS_FALLBACK") {
                Ok(v) => parse_flag(&v).context("ANALYSIS_FALLBACK must be true or false")?,
                Err(_) => false,
            },
        })
    }

    /// Defaults for everything except the analyzer settings.
    #[cfg(test)]
    pub fn with_analyzer(analyzer: AnalyzerConfig) -> Self {
        Config {
            analyzer,
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            fallback_on_error: false,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("unrecognised flag value '{other}'"),
    }
}
