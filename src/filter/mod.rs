//! Admission filters for discovered links
//!
//! Every link discovered on a fetched page is run through a [`FilterChain`]
//! before it may enter the frontier. The chain holds a closed set of filter
//! kinds and admits a link only when every filter admits it. The start URL of
//! a crawl is never filtered.

mod chain;
mod content_type;
mod domain;
mod pattern;
mod relevance;
mod seo;

pub use chain::{FilterChain, FilterStats};
pub use content_type::ContentTypeFilter;
pub use domain::DomainFilter;
pub use pattern::{ExactUrlFilter, UrlPatternFilter};
pub use relevance::{KeywordRelevance, RelevanceFilter, RelevanceSource};
pub use seo::SeoFilter;

use crate::EvalError;
use serde::Deserialize;
use url::Url;

/// Whether a list-based filter admits or rejects the URLs it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Admit only URLs that match
    #[default]
    Allow,
    /// Admit only URLs that do not match
    Block,
}

impl FilterMode {
    /// Turns a match result into an admission decision
    pub fn decide(self, matched: bool) -> bool {
        match self {
            Self::Allow => matched,
            Self::Block => !matched,
        }
    }
}

/// Metadata of the fetched page a link was discovered on
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    /// Response Content-Type header
    pub content_type: Option<String>,

    /// Page title, when the fetch layer extracted one
    pub title: Option<String>,
}

/// A single admission filter
#[derive(Debug, Clone)]
pub enum Filter {
    UrlPattern(UrlPatternFilter),
    Domain(DomainFilter),
    ContentType(ContentTypeFilter),
    ExactUrl(ExactUrlFilter),
    Relevance(RelevanceFilter),
    Seo(SeoFilter),
}

impl Filter {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::UrlPattern(_) => "url-pattern",
            Self::Domain(_) => "domain",
            Self::ContentType(_) => "content-type",
            Self::ExactUrl(_) => "exact-url",
            Self::Relevance(_) => "relevance",
            Self::Seo(_) => "seo",
        }
    }

    /// Evaluates the filter, surfacing plugin failures
    pub fn evaluate(&self, url: &Url, page: Option<&PageMeta>) -> Result<bool, EvalError> {
        match self {
            Self::UrlPattern(f) => Ok(f.admit(url)),
            Self::Domain(f) => Ok(f.admit(url)),
            Self::ContentType(f) => Ok(f.admit(url)),
            Self::ExactUrl(f) => Ok(f.admit(url)),
            Self::Relevance(f) => f.evaluate(url, page),
            Self::Seo(f) => Ok(f.admit(url, page)),
        }
    }

    /// Decides admission for a link; evaluation failures reject the link
    pub fn admit(&self, url: &Url, page: Option<&PageMeta>) -> bool {
        match self.evaluate(url, page) {
            Ok(admitted) => admitted,
            Err(e) => {
                tracing::warn!("{} filter failed for {}: {}", self.name(), url, e);
                false
            }
        }
    }
}

impl From<UrlPatternFilter> for Filter {
    fn from(f: UrlPatternFilter) -> Self {
        Self::UrlPattern(f)
    }
}

impl From<DomainFilter> for Filter {
    fn from(f: DomainFilter) -> Self {
        Self::Domain(f)
    }
}

impl From<ContentTypeFilter> for Filter {
    fn from(f: ContentTypeFilter) -> Self {
        Self::ContentType(f)
    }
}

impl From<ExactUrlFilter> for Filter {
    fn from(f: ExactUrlFilter) -> Self {
        Self::ExactUrl(f)
    }
}

impl From<RelevanceFilter> for Filter {
    fn from(f: RelevanceFilter) -> Self {
        Self::Relevance(f)
    }
}

impl From<SeoFilter> for Filter {
    fn from(f: SeoFilter) -> Self {
        Self::Seo(f)
    }
}
