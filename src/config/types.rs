use crate::crawler::{DeliveryMode, Limit, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
use crate::filter::FilterMode;
use crate::strategy::Strategy;
use crate::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for Deep-Crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Admission filters, applied in order
    #[serde(default)]
    pub filters: Vec<FilterConfig>,

    /// Priority scorer for best-first crawls
    #[serde(default)]
    pub scorer: Option<ScorerConfig>,
}

/// Traversal and budget configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    pub strategy: Strategy,

    /// Depth ceiling; the strategy's default when absent
    pub max_depth: Option<LimitValue>,

    /// Ceiling on emitted results; unbounded when absent
    pub max_pages: Option<LimitValue>,

    /// Follow links to hosts other than the start URL's
    pub include_external: bool,

    /// Maximum number of fetches in flight
    pub concurrency: usize,

    /// Candidates dispatched per best-first round
    pub batch_size: usize,

    pub delivery: DeliveryMode,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            max_depth: None,
            max_pages: None,
            include_external: false,
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            delivery: DeliveryMode::default(),
        }
    }
}

/// A budget value as written in TOML: a count or `"unbounded"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LimitValue {
    Count(i64),
    Keyword(String),
}

impl LimitValue {
    /// Converts to a [`Limit`], rejecting negative counts and unknown keywords
    pub fn to_limit(&self, field: &str) -> Result<Limit, ConfigError> {
        match self {
            Self::Count(n) => u64::try_from(*n).map(Limit::Bounded).map_err(|_| {
                ConfigError::Validation(format!("{} cannot be negative, got {}", field, n))
            }),
            Self::Keyword(word) if word.eq_ignore_ascii_case("unbounded") => Ok(Limit::Unbounded),
            Self::Keyword(word) => Err(ConfigError::Validation(format!(
                "{} must be a number or \"unbounded\", got \"{}\"",
                field, word
            ))),
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Redirect hops followed before a fetch fails
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("deep-crawl/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// One `[[filters]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterConfig {
    #[serde(rename_all = "kebab-case")]
    UrlPattern {
        patterns: Vec<String>,
        #[serde(default)]
        mode: FilterMode,
        #[serde(default)]
        case_sensitive: bool,
    },

    #[serde(rename_all = "kebab-case")]
    Domain {
        #[serde(default)]
        allowed: Vec<String>,
        #[serde(default)]
        blocked: Vec<String>,
        #[serde(default)]
        include_subdomains: bool,
    },

    #[serde(rename_all = "kebab-case")]
    ContentType {
        types: Vec<String>,
        #[serde(default)]
        mode: FilterMode,
    },

    #[serde(rename_all = "kebab-case")]
    ExactUrl {
        urls: Vec<String>,
        #[serde(default)]
        mode: FilterMode,
    },

    /// Keyword relevance of the link and its source page against a threshold
    #[serde(rename_all = "kebab-case")]
    Relevance { keywords: Vec<String>, threshold: f64 },

    #[serde(rename_all = "kebab-case")]
    Seo {
        #[serde(default)]
        min_title_length: usize,
        max_url_length: Option<usize>,
        max_path_depth: Option<usize>,
    },
}

/// The `[scorer]` table, nestable through `composite`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScorerConfig {
    #[serde(rename_all = "kebab-case")]
    Keyword {
        keywords: Vec<String>,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default)]
        case_sensitive: bool,
    },

    #[serde(rename_all = "kebab-case")]
    PathDepth {
        #[serde(default = "default_optimal_depth")]
        optimal_depth: usize,
        #[serde(default = "default_penalty")]
        penalty: f64,
        #[serde(default)]
        invert: bool,
    },

    /// `weights` is an ordered list of `[content-type, weight]` pairs
    #[serde(rename_all = "kebab-case")]
    ContentType {
        weights: Vec<(String, f64)>,
        #[serde(default)]
        default_score: f64,
    },

    #[serde(rename_all = "kebab-case")]
    DomainAuthority {
        authorities: HashMap<String, f64>,
        #[serde(default)]
        default_score: f64,
    },

    #[serde(rename_all = "kebab-case")]
    Freshness {
        max_age_days: i64,
        #[serde(default = "default_decay")]
        decay_per_day: f64,
        undated_score: Option<f64>,
    },

    #[serde(rename_all = "kebab-case")]
    Composite {
        children: Vec<WeightedScorerConfig>,
        #[serde(default)]
        normalized: bool,
    },
}

/// A composite child and its weight
#[derive(Debug, Clone, Deserialize)]
pub struct WeightedScorerConfig {
    #[serde(default = "default_weight")]
    pub weight: f64,

    pub scorer: ScorerConfig,
}

fn default_weight() -> f64 {
    1.0
}

fn default_optimal_depth() -> usize {
    3
}

fn default_penalty() -> f64 {
    0.5
}

fn default_decay() -> f64 {
    0.01
}
