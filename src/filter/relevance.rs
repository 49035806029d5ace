use crate::filter::PageMeta;
use crate::{ConfigError, EvalError};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// An external source of relevance scores
///
/// Implementations may wrap anything from a keyword heuristic to a remote
/// classifier. The engine only sees the number; a boolean classifier reports
/// `1.0` or `0.0`. Errors are absorbed by the caller.
pub trait RelevanceSource: Send + Sync + fmt::Debug {
    /// Scores a candidate link, optionally using the page it was found on
    fn relevance(&self, url: &Url, page: Option<&PageMeta>) -> Result<f64, EvalError>;
}

/// Admits links whose relevance reaches a threshold
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    source: Arc<dyn RelevanceSource>,
    threshold: f64,
}

impl RelevanceFilter {
    /// # Errors
    ///
    /// Fails when the threshold is not a finite number.
    pub fn new(source: Arc<dyn RelevanceSource>, threshold: f64) -> Result<Self, ConfigError> {
        if !threshold.is_finite() {
            return Err(ConfigError::Validation(format!(
                "relevance threshold must be finite, got {}",
                threshold
            )));
        }
        Ok(Self { source, threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub(crate) fn evaluate(&self, url: &Url, page: Option<&PageMeta>) -> Result<bool, EvalError> {
        let score = self.source.relevance(url, page)?;
        if !score.is_finite() {
            return Err(EvalError::NonFinite(score));
        }
        Ok(score >= self.threshold)
    }
}

/// Relevance as the fraction of query keywords present in a link
///
/// The searched text is the URL path and query plus the title of the page
/// the link was found on. Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct KeywordRelevance {
    keywords: Vec<String>,
}

impl KeywordRelevance {
    /// # Errors
    ///
    /// Fails when no non-blank keyword is given.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, ConfigError> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if keywords.is_empty() {
            return Err(ConfigError::Validation(
                "relevance keywords cannot be empty".to_string(),
            ));
        }

        Ok(Self { keywords })
    }
}

impl RelevanceSource for KeywordRelevance {
    fn relevance(&self, url: &Url, page: Option<&PageMeta>) -> Result<f64, EvalError> {
        let mut text = url.path().to_lowercase();
        if let Some(query) = url.query() {
            text.push(' ');
            text.push_str(&query.to_lowercase());
        }
        if let Some(title) = page.and_then(|p| p.title.as_deref()) {
            text.push(' ');
            text.push_str(&title.to_lowercase());
        }

        let hits = self.keywords.iter().filter(|k| text.contains(k.as_str())).count();
        Ok(hits as f64 / self.keywords.len() as f64)
    }
}
