use anyhow::{ensure, Context, Result};

use crate::layout::composer::DEFAULT_SPLIT_LIMIT_CHARS;
use crate::layout::packer::DEFAULT_PAGE_BUDGET;
use crate::layout::CompositionConfig;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub composition: CompositionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            composition: CompositionConfig {
                page_budget: positive_env("PAGE_BUDGET", DEFAULT_PAGE_BUDGET)?,
                split_limit_chars: positive_env("SPLIT_LIMIT_CHARS", DEFAULT_SPLIT_LIMIT_CHARS)?,
            },
        })
    }
}

fn positive_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match std::env::var(key) {
        Ok(raw) => parse_positive(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let value = raw
        .trim()
        .parse::<T>()
        .ok()
        .with_context(|| format!("{key} must be a positive integer, got '{raw}'"))?;
    ensure!(value > T::default(), "{key} must be greater than 0");
    Ok(value)
}
