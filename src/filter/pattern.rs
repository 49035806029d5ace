use crate::filter::FilterMode;
use crate::url::{normalize_url, GlobPattern};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Admits or rejects links whose full URL matches any of a set of globs
#[derive(Debug, Clone)]
pub struct UrlPatternFilter {
    patterns: Vec<GlobPattern>,
    mode: FilterMode,
}

impl UrlPatternFilter {
    /// Compiles the patterns
    ///
    /// # Errors
    ///
    /// Fails when the list is empty or any pattern is malformed.
    pub fn new<S: AsRef<str>>(
        patterns: &[S],
        mode: FilterMode,
        case_sensitive: bool,
    ) -> Result<Self, ConfigError> {
        if patterns.is_empty() {
            return Err(ConfigError::Validation(
                "url-pattern filter needs at least one pattern".to_string(),
            ));
        }

        let patterns = patterns
            .iter()
            .map(|p| GlobPattern::new(p.as_ref(), case_sensitive))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns, mode })
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn admit(&self, url: &Url) -> bool {
        let matched = self.patterns.iter().find(|p| p.is_match(url.as_str()));
        if let Some(pattern) = matched {
            tracing::trace!("{} matches pattern {}", url, pattern.as_str());
        }
        self.mode.decide(matched.is_some())
    }
}

/// Admits or rejects links that exactly equal one of a list of URLs
///
/// List entries are normalized the same way discovered links are, so
/// `https://Example.com/a/` and `https://example.com/a` are the same entry.
#[derive(Debug, Clone)]
pub struct ExactUrlFilter {
    urls: HashSet<String>,
    mode: FilterMode,
}

impl ExactUrlFilter {
    /// # Errors
    ///
    /// Fails when any entry is not a valid HTTP(S) URL.
    pub fn new<S: AsRef<str>>(urls: &[S], mode: FilterMode) -> Result<Self, ConfigError> {
        let urls = urls
            .iter()
            .map(|u| {
                normalize_url(u.as_ref())
                    .map(String::from)
                    .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", u.as_ref(), e)))
            })
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Self { urls, mode })
    }

    pub fn admit(&self, url: &Url) -> bool {
        self.mode.decide(self.urls.contains(url.as_str()))
    }
}
