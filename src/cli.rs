//! Command-line interface parsing for cfpwatch
//!
//! This module handles parsing of CLI arguments using clap, including
//! API key resolution and the initial filter/sort settings for the UI.

use clap::Parser;
use thiserror::Error;

use crate::query::SortKey;

/// Environment variable consulted when --api-key is not given
pub const API_KEY_ENV: &str = "SESSIONIZE_API_KEY";

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// No API key was supplied via flag or environment
    #[error(
        "No Sessionize API key configured. Pass --api-key or set the {API_KEY_ENV} environment variable."
    )]
    MissingApiKey,
}

/// cfpwatch - Browse open Sessionize calls for papers
#[derive(Parser, Debug)]
#[command(name = "cfpwatch")]
#[command(about = "Browse, search, and sort open calls for papers")]
#[command(version)]
pub struct Cli {
    /// Sessionize API key (falls back to the SESSIONIZE_API_KEY
    /// environment variable)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Start with closed CFPs included instead of open ones only
    #[arg(long)]
    pub all: bool,

    /// Initial sort key: name, cfpEndDate, cfpStartDate,
    /// eventStartDate, or country (unknown values fall back to
    /// cfpEndDate)
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,

    /// Initial search term
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Resolved Sessionize API key
    pub api_key: String,
    /// Whether only open CFPs are shown initially
    pub open_only: bool,
    /// Initial sort key
    pub sort_key: SortKey,
    /// Initial sort direction
    pub ascending: bool,
    /// Initial search term, empty when unset
    pub search_term: String,
}

/// Resolves the API key from the flag value or the environment value,
/// treating blank strings as absent.
pub fn resolve_api_key(
    flag: Option<&str>,
    env_value: Option<String>,
) -> Result<String, CliError> {
    flag.map(str::to_string)
        .or(env_value)
        .filter(|key| !key.trim().is_empty())
        .ok_or(CliError::MissingApiKey)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Errors
    /// Returns `CliError::MissingApiKey` when neither the flag nor the
    /// environment supplies a key; the application refuses to start
    /// without one.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_key = resolve_api_key(
            cli.api_key.as_deref(),
            std::env::var(API_KEY_ENV).ok(),
        )?;

        Ok(StartupConfig {
            api_key,
            open_only: !cli.all,
            sort_key: cli
                .sort
                .as_deref()
                .map(SortKey::parse)
                .unwrap_or(SortKey::CfpEndDate),
            ascending: !cli.desc,
            search_term: cli.search.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_key_prefers_flag() {
        let key = resolve_api_key(Some("flag-key"), Some("env-key".to_string()));
        assert_eq!(key.unwrap(), "flag-key");
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_env() {
        let key = resolve_api_key(None, Some("env-key".to_string()));
        assert_eq!(key.unwrap(), "env-key");
    }

    #[test]
    fn test_resolve_api_key_rejects_missing() {
        assert!(resolve_api_key(None, None).is_err());
    }

    #[test]
    fn test_resolve_api_key_rejects_blank_values() {
        assert!(resolve_api_key(Some("   "), None).is_err());
    }

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["cfpwatch"]);
        assert!(cli.api_key.is_none());
        assert!(!cli.all);
        assert!(cli.sort.is_none());
        assert!(!cli.desc);
        assert!(cli.search.is_none());
    }

    #[test]
    fn test_startup_config_defaults() {
        let cli = Cli::parse_from(["cfpwatch", "--api-key", "k"]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.api_key, "k");
        assert!(config.open_only);
        assert_eq!(config.sort_key, SortKey::CfpEndDate);
        assert!(config.ascending);
        assert!(config.search_term.is_empty());
    }

    #[test]
    fn test_startup_config_all_flag_disables_open_only() {
        let cli = Cli::parse_from(["cfpwatch", "--api-key", "k", "--all"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(!config.open_only);
    }

    #[test]
    fn test_startup_config_sort_and_direction() {
        let cli = Cli::parse_from(["cfpwatch", "--api-key", "k", "--sort", "Name", "--desc"]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.sort_key, SortKey::Name);
        assert!(!config.ascending);
    }

    #[test]
    fn test_startup_config_unknown_sort_falls_back() {
        let cli = Cli::parse_from(["cfpwatch", "--api-key", "k", "--sort", "deadline"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.sort_key, SortKey::CfpEndDate);
    }

    #[test]
    fn test_startup_config_initial_search_term() {
        let cli = Cli::parse_from(["cfpwatch", "--api-key", "k", "--search", "rust"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.search_term, "rust");
    }
}
