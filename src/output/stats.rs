//! Statistics computed from a set of crawl results

use crate::crawler::CrawlResult;
use crate::url::extract_domain;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Total number of results
    pub total_pages: u64,

    pub successful: u64,

    pub failed: u64,

    /// Result count per depth
    pub depth_breakdown: BTreeMap<u32, u64>,

    /// Result count per HTTP status code
    pub status_codes: BTreeMap<u16, u64>,

    /// Error messages and how often they occurred
    pub error_summary: BTreeMap<String, u64>,

    /// Domains of visited URLs, sorted
    pub unique_domains: BTreeSet<String>,

    /// Mean priority score over all results
    pub average_score: f64,
}

impl CrawlStatistics {
    pub fn from_results(results: &[CrawlResult]) -> Self {
        let mut stats = Self::default();
        let mut score_sum = 0.0;

        for result in results {
            stats.total_pages += 1;
            score_sum += result.metadata.score;

            if result.success {
                stats.successful += 1;
            } else {
                stats.failed += 1;
                let error = result.error.clone().unwrap_or_else(|| "unknown".to_string());
                *stats.error_summary.entry(error).or_insert(0) += 1;
            }

            *stats.depth_breakdown.entry(result.metadata.depth).or_insert(0) += 1;

            if let Some(code) = result.status_code {
                *stats.status_codes.entry(code).or_insert(0) += 1;
            }

            if let Some(domain) = Url::parse(&result.url).ok().as_ref().and_then(extract_domain) {
                stats.unique_domains.insert(domain);
            }
        }

        if stats.total_pages > 0 {
            stats.average_score = score_sum / stats.total_pages as f64;
        }

        stats
    }

    /// Percentage of results that were fetched successfully
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.successful as f64 / self.total_pages as f64) * 100.0
    }

    pub fn max_depth(&self) -> Option<u32> {
        self.depth_breakdown.keys().next_back().copied()
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Results may be streamed to stdout, so the summary goes to stderr.
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  Pages crawled: {}", stats.total_pages);
    eprintln!("  Unique domains: {}", stats.unique_domains.len());
    if let Some(depth) = stats.max_depth() {
        eprintln!("  Deepest level reached: {}", depth);
    }
    eprintln!("  Average score: {:.3}", stats.average_score);
    eprintln!();

    if !stats.depth_breakdown.is_empty() {
        eprintln!("Pages by Depth:");
        for (depth, count) in &stats.depth_breakdown {
            eprintln!("  {}: {}", depth, count);
        }
        eprintln!();
    }

    if !stats.error_summary.is_empty() {
        eprintln!("Error Summary:");
        let mut error_counts: Vec<_> = stats.error_summary.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (error, count) in error_counts {
            eprintln!("  {}: {}", error, count);
        }
        eprintln!();
    }

    eprintln!(
        "Success Rate: {:.1}% ({} / {} pages fetched successfully)",
        stats.success_rate(),
        stats.successful,
        stats.total_pages
    );
}
