//! Kagami: a single-site offline mirroring tool
//!
//! This crate mirrors a website to local storage: starting from a seed URL it
//! fetches pages, downloads their embedded resources (stylesheets, scripts,
//! images), and follows same-site links breadth-first up to a configured
//! depth, producing an on-disk replica plus a session report.

pub mod archive;
pub mod config;
pub mod mirror;
pub mod output;
pub mod session;
pub mod summarize;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kagami operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Write error for {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Summarizer error: {0}")]
    Summarize(String),

    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// The only fatal error class: a session aborts on these before any network
/// activity. Everything else is recorded per-URL and the crawl continues.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("Output root is not writable: {0}")]
    OutputRoot(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for kagami operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::CrawlConfig;
pub use crate::mirror::{
    CrawlEngine, EngineState, FetchOutcome, MirrorEntry, PageMetadata, PageRecord, ResourceKind,
    SessionResult,
};
pub use crate::session::MirrorSession;
pub use crate::url::{canonical_key, canonicalize, OriginPolicy};
