//! Vaga-Harvest: a multi-site job posting harvester
//!
//! This crate crawls several job-listing websites concurrently, extracts
//! structured postings, and scores each posting's description against a
//! caller-supplied keyword list. All sites run under one cooperative deadline
//! and their results are merged into a single shuffled result set.

pub mod config;
pub mod fetch;
pub mod harvest;
pub mod model;
pub mod scoring;
pub mod search;
pub mod sites;

use thiserror::Error;

/// Main error type for Vaga-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Adapter for {site} failed: {message}")]
    AdapterFailed { site: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Vaga-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Deadline, Harvester};
pub use model::{HarvestOutcome, JobPosting};
pub use scoring::{score, Scorer};
pub use search::{Location, RecencyFilter, SearchRequest};
pub use sites::Site;
