//! Deep-Crawl: a deep-crawl orchestration engine
//!
//! This crate drives breadth-first, depth-first and best-first traversals over
//! a dynamically discovered graph of web pages. Discovered links pass through a
//! pluggable filter chain, are ranked by a pluggable scorer, and are visited
//! under depth/page budgets with bounded fetch concurrency. Results are
//! delivered either as a stream or as a batch, and a running crawl can be shut
//! down cooperatively.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod output;
pub mod scorer;
pub mod strategy;
pub mod url;

use thiserror::Error;

/// Main error type for Deep-Crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Crawler has already been run; build a new crawler for another run")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are the only failures a caller observes before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Failure raised while evaluating a filter or scorer plugin
///
/// Evaluation errors never escape a run: filters treat them as a rejection and
/// scorers as a score of 0.0.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error("Relevance source failed: {0}")]
    Source(String),

    #[error("Score is not a finite number: {0}")]
    NonFinite(f64),
}

/// Result type alias for Deep-Crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    CrawlOutput, CrawlResult, CrawlStream, Crawler, CrawlerBuilder, DeliveryMode, FetchOutcome,
    Fetcher, HttpFetcher, Limit, ResultMetadata, ShutdownHandle,
};
pub use filter::{Filter, FilterChain, FilterMode, FilterStats, PageMeta};
pub use scorer::{CompositeScorer, ScoreContext, Scorer};
pub use strategy::Strategy;
pub use crate::url::{extract_domain, normalize_url};
