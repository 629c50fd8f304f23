//! Configuration module for Job-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use job_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {} keywords", config.keywords.keywords.len());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, KeywordsConfig, PathsConfig, ScrapingConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
