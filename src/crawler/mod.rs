//! Crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The fetch contract and the HTTP fetcher
//! - HTML link extraction
//! - Frontier, dedup and budget accounting
//! - Overall crawl coordination and result delivery

mod coordinator;
mod fetcher;
mod parser;
mod result;
mod scheduler;

pub use coordinator::{
    CrawlOutput, CrawlStream, Crawler, CrawlerBuilder, ShutdownHandle, DEFAULT_BATCH_SIZE,
    DEFAULT_CONCURRENCY, MAX_CONCURRENCY,
};
pub use fetcher::{FetchOutcome, Fetcher, HttpFetcher};
pub use parser::{parse_html, ParsedPage};
pub use result::{CrawlResult, DeliveryMode, Limit, ResultMetadata};
pub use scheduler::{Budgets, Scheduler};
