use crate::ConfigError;
use url::Url;

/// Scores a URL by how many keywords it contains
///
/// `score = weight * matched_keywords / total_keywords`
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    keywords: Vec<String>,
    weight: f64,
    case_sensitive: bool,
}

impl KeywordScorer {
    /// # Errors
    ///
    /// Fails when no non-blank keyword is given or the weight is negative or
    /// not finite.
    pub fn new<S: AsRef<str>>(
        keywords: &[S],
        weight: f64,
        case_sensitive: bool,
    ) -> Result<Self, ConfigError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "keyword scorer weight must be a non-negative number, got {}",
                weight
            )));
        }

        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(|k| {
                if case_sensitive {
                    k.to_string()
                } else {
                    k.to_lowercase()
                }
            })
            .collect();

        if keywords.is_empty() {
            return Err(ConfigError::Validation(
                "keyword scorer needs at least one keyword".to_string(),
            ));
        }

        Ok(Self {
            keywords,
            weight,
            case_sensitive,
        })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn score(&self, url: &Url) -> f64 {
        let haystack = if self.case_sensitive {
            url.as_str().to_string()
        } else {
            url.as_str().to_lowercase()
        };

        let matches = self
            .keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .count();

        self.weight * matches as f64 / self.keywords.len() as f64
    }
}
