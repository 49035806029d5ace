use crate::url::{content_type_matches, infer_content_type};
use crate::ConfigError;
use url::Url;

/// Scores a URL from a weighted table of content types
///
/// The type is inferred from the URL extension. Entries are tried in order;
/// the first matching entry (full type or `family/*`) gives the score, and
/// URLs matching nothing get the default.
#[derive(Debug, Clone)]
pub struct ContentTypeScorer {
    weights: Vec<(String, f64)>,
    default_score: f64,
}

impl ContentTypeScorer {
    /// # Errors
    ///
    /// Fails when the table is empty or holds a non-finite weight.
    pub fn new<S: AsRef<str>>(weights: &[(S, f64)], default_score: f64) -> Result<Self, ConfigError> {
        if weights.is_empty() {
            return Err(ConfigError::Validation(
                "content-type scorer needs at least one entry".to_string(),
            ));
        }

        if !default_score.is_finite() || weights.iter().any(|(_, w)| !w.is_finite()) {
            return Err(ConfigError::Validation(
                "content-type scorer weights must be finite".to_string(),
            ));
        }

        Ok(Self {
            weights: weights
                .iter()
                .map(|(t, w)| (t.as_ref().trim().to_ascii_lowercase(), *w))
                .collect(),
            default_score,
        })
    }

    pub fn score(&self, url: &Url) -> f64 {
        let content_type = infer_content_type(url);
        self.weights
            .iter()
            .find(|(pattern, _)| content_type_matches(pattern, &content_type))
            .map(|(_, weight)| *weight)
            .unwrap_or(self.default_score)
    }
}
