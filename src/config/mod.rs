//! Configuration module for Prowl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use prowl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("prowl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_crawler_config};
