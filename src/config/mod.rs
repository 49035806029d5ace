//! Configuration module for Deep-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning them into a [`CrawlerBuilder`](crate::crawler::CrawlerBuilder).
//!
//! # Example
//!
//! ```no_run
//! use deep_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Strategy: {}", config.crawl.strategy);
//! ```

mod builder;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FilterConfig, HttpConfig, LimitValue, ScorerConfig, WeightedScorerConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub(crate) use validation::validate_domain_pattern;
