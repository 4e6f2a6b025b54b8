//! Configuration module for Sitemap-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap_config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HostScope};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_or_default, load_config_with_hash,
    DEFAULT_CONFIG_PATH,
};
pub use validation::validate;
