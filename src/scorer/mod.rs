//! URL priority scoring
//!
//! Scorers rank admitted links for best-first traversal; higher scores are
//! visited earlier. Scoring never decides admission. The set of scorer kinds
//! is closed, with [`CompositeScorer`] combining any number of (possibly
//! composite) children by weighted sum.

mod authority;
mod composite;
mod content_type;
mod freshness;
mod keyword;
mod path_depth;

pub use authority::DomainAuthorityScorer;
pub use composite::CompositeScorer;
pub use content_type::ContentTypeScorer;
pub use freshness::FreshnessScorer;
pub use keyword::KeywordScorer;
pub use path_depth::PathDepthScorer;

use crate::filter::{PageMeta, RelevanceSource};
use crate::EvalError;
use std::sync::Arc;
use url::Url;

/// Information available when a link is scored
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreContext<'a> {
    /// The page the link was discovered on
    pub page: Option<&'a PageMeta>,

    /// Depth the link would be visited at
    pub depth: u32,
}

/// A URL scorer
#[derive(Debug, Clone)]
pub enum Scorer {
    Keyword(KeywordScorer),
    PathDepth(PathDepthScorer),
    ContentType(ContentTypeScorer),
    DomainAuthority(DomainAuthorityScorer),
    Freshness(FreshnessScorer),
    Composite(CompositeScorer),
    /// An opaque plugin, such as a model-backed relevance score
    External(Arc<dyn RelevanceSource>),
}

impl Scorer {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keyword(_) => "keyword",
            Self::PathDepth(_) => "path-depth",
            Self::ContentType(_) => "content-type",
            Self::DomainAuthority(_) => "domain-authority",
            Self::Freshness(_) => "freshness",
            Self::Composite(_) => "composite",
            Self::External(_) => "external",
        }
    }

    /// Computes the score, surfacing plugin failures and non-finite values
    pub fn evaluate(&self, url: &Url, ctx: &ScoreContext<'_>) -> Result<f64, EvalError> {
        let score = match self {
            Self::Keyword(s) => s.score(url),
            Self::PathDepth(s) => s.score(url),
            Self::ContentType(s) => s.score(url),
            Self::DomainAuthority(s) => s.score(url),
            Self::Freshness(s) => s.score(url),
            Self::Composite(s) => s.score(url, ctx),
            Self::External(source) => source.relevance(url, ctx.page)?,
        };

        if score.is_finite() {
            Ok(score)
        } else {
            Err(EvalError::NonFinite(score))
        }
    }

    /// Scores a link; evaluation failures score 0.0
    pub fn score(&self, url: &Url, ctx: &ScoreContext<'_>) -> f64 {
        self.evaluate(url, ctx).unwrap_or_else(|e| {
            tracing::warn!("{} scorer failed for {}: {}", self.name(), url, e);
            0.0
        })
    }
}

impl From<KeywordScorer> for Scorer {
    fn from(s: KeywordScorer) -> Self {
        Self::Keyword(s)
    }
}

impl From<PathDepthScorer> for Scorer {
    fn from(s: PathDepthScorer) -> Self {
        Self::PathDepth(s)
    }
}

impl From<ContentTypeScorer> for Scorer {
    fn from(s: ContentTypeScorer) -> Self {
        Self::ContentType(s)
    }
}

impl From<DomainAuthorityScorer> for Scorer {
    fn from(s: DomainAuthorityScorer) -> Self {
        Self::DomainAuthority(s)
    }
}

impl From<FreshnessScorer> for Scorer {
    fn from(s: FreshnessScorer) -> Self {
        Self::Freshness(s)
    }
}

impl From<CompositeScorer> for Scorer {
    fn from(s: CompositeScorer) -> Self {
        Self::Composite(s)
    }
}
