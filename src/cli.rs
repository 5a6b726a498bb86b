//! Command-line interface parsing for Teamdeck
//!
//! This module handles parsing of CLI arguments using clap, covering the
//! cache controls (--max-age-ms, --no-cache, --clear-cache) and the
//! directory endpoint override (--base-url).

use clap::Parser;
use thiserror::Error;

use crate::data::members::DEFAULT_BASE_URL;
use crate::loader::DEFAULT_MAX_AGE_MS;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// Teamdeck - Browse your team directory with cached member profiles
#[derive(Parser, Debug)]
#[command(name = "teamdeck")]
#[command(about = "Team directory browser with cached member profiles")]
#[command(version)]
pub struct Cli {
    /// Freshness window for cached members, in milliseconds
    ///
    /// Cached data younger than this is shown without contacting the
    /// directory; older data triggers a refetch.
    #[arg(long, value_name = "MS")]
    pub max_age_ms: Option<u64>,

    /// Skip the on-disk cache entirely and always fetch from the directory
    #[arg(long)]
    pub no_cache: bool,

    /// Drop the cached member list before starting
    #[arg(long)]
    pub clear_cache: bool,

    /// Directory API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Freshness window for cache reads, in milliseconds
    pub max_age_ms: u64,
    /// Whether to run without the on-disk cache
    pub no_cache: bool,
    /// Whether to drop the cached member list before starting
    pub clear_cache: bool,
    /// Directory API base URL
    pub base_url: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            no_cache: false,
            clear_cache: false,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the base URL is not an http(s) URL
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base_url = match &cli.base_url {
            None => DEFAULT_BASE_URL.to_string(),
            Some(url) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(CliError::InvalidBaseUrl(url.clone()));
                }
                url.trim_end_matches('/').to_string()
            }
        };

        Ok(StartupConfig {
            max_age_ms: cli.max_age_ms.unwrap_or(DEFAULT_MAX_AGE_MS),
            no_cache: cli.no_cache,
            clear_cache: cli.clear_cache,
            base_url,
        })
    }
}
