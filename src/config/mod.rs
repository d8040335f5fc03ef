//! Configuration module for kagami
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus programmatic construction for CLI-driven sessions.
//!
//! # Example
//!
//! ```no_run
//! use kagami::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Mirroring {} to depth {}", config.crawl.seed_url, config.crawl.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlSection, FetchSection, OutputSection, SummarizerSection,
    DEFAULT_RENDER_SERVICE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation
pub use validation::validate;
