//! Configuration module for Review-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to the legacy site values.
//!
//! # Example
//!
//! ```no_run
//! use review_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Detail fetch concurrency: {}", config.harvester.max_concurrent_detail_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FieldSelector, HarvesterConfig, OutputConfig, SelectorConfig, SiteConfig,
    UserAgentConfig, DEFAULT_LISTING_PATH_TEMPLATE, MAX_DETAIL_CONCURRENCY, QUERY_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
