//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Computing statistics over a set of crawl results
//! - Generating markdown summaries of a run

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary, RunInfo};
pub use stats::{print_statistics, CrawlStatistics};
