// Configuration loading and parsing (league.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub league: LeagueInfo,
    pub data: DataPaths,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueInfo {
    pub name: String,
    pub division: String,
    /// Calendar year the season starts in. Manifest dates carry no year,
    /// so Nov/Dec dates belong to this year and everything else to the
    /// following one.
    pub season_start_year: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Event log CSV (game details) produced by the scraper.
    pub details: String,
    /// Schedule manifest CSV.
    pub manifest: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

impl Config {
    /// Load and validate configuration from a league.toml file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        validate(&config)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    let year = config.league.season_start_year;
    if !(2000..2100).contains(&year) {
        return Err(ConfigError::ValidationError {
            field: "league.season_start_year".into(),
            message: format!("must be a plausible calendar year, got {year}"),
        });
    }

    let path_fields: &[(&str, &str)] = &[
        ("data.details", &config.data.details),
        ("data.manifest", &config.data.manifest),
        ("output.dir", &config.output.dir),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
