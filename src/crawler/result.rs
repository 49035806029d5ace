use crate::crawler::fetcher::FetchOutcome;
use crate::strategy::Candidate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A budget ceiling that may be unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    Bounded(u64),
    #[default]
    Unbounded,
}

impl Limit {
    /// Whether `value` stays within the ceiling (inclusive)
    pub fn allows(self, value: u64) -> bool {
        match self {
            Self::Bounded(max) => value <= max,
            Self::Unbounded => true,
        }
    }
}

impl From<Option<u64>> for Limit {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{}", max),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// How results are handed to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
    /// Results are yielded as soon as each page completes
    Stream,

    /// Results are collected and returned when the crawl ends
    #[default]
    Batch,
}

/// Traversal metadata attached to every result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultMetadata {
    pub depth: u32,
    pub parent_url: Option<String>,
    pub score: f64,
}

/// The record emitted for one visited URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    pub url: String,
    pub success: bool,
    pub error: Option<String>,
    pub status_code: Option<u16>,
    pub metadata: ResultMetadata,
}

impl CrawlResult {
    pub(crate) fn new(candidate: Candidate, outcome: &FetchOutcome) -> Self {
        Self {
            url: candidate.url.to_string(),
            success: outcome.success,
            error: if outcome.success {
                None
            } else {
                Some(
                    outcome
                        .error_message
                        .clone()
                        .unwrap_or_else(|| "fetch failed".to_string()),
                )
            },
            status_code: outcome.status_code,
            metadata: ResultMetadata {
                depth: candidate.depth,
                parent_url: candidate.parent_url,
                score: candidate.score,
            },
        }
    }
}
