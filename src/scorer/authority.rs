use crate::url::{domain_ancestors, extract_domain};
use crate::ConfigError;
use std::collections::HashMap;
use url::Url;

/// Scores a URL by the authority of its domain
///
/// Authority values come from an external table keyed by domain. A host
/// without its own entry inherits the value of its closest listed parent
/// domain, so an entry for `example.com` also covers `docs.example.com`.
#[derive(Debug, Clone)]
pub struct DomainAuthorityScorer {
    authorities: HashMap<String, f64>,
    default_score: f64,
}

impl DomainAuthorityScorer {
    /// # Errors
    ///
    /// Fails when any authority value is not finite.
    pub fn new(
        authorities: impl IntoIterator<Item = (String, f64)>,
        default_score: f64,
    ) -> Result<Self, ConfigError> {
        let authorities: HashMap<String, f64> = authorities
            .into_iter()
            .map(|(domain, value)| (domain.trim().to_lowercase(), value))
            .collect();

        if !default_score.is_finite() || authorities.values().any(|v| !v.is_finite()) {
            return Err(ConfigError::Validation(
                "domain authority values must be finite".to_string(),
            ));
        }

        Ok(Self {
            authorities,
            default_score,
        })
    }

    pub fn score(&self, url: &Url) -> f64 {
        let Some(domain) = extract_domain(url) else {
            return self.default_score;
        };

        let score = domain_ancestors(&domain)
            .find_map(|d| self.authorities.get(d).copied())
            .unwrap_or(self.default_score);
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn scorer() -> DomainAuthorityScorer {
        DomainAuthorityScorer::new(
            [
                ("example.com".to_string(), 0.8),
                ("Blog.Example.com".to_string(), 0.3),
            ],
            0.1,
        )
        .unwrap()
    }

    #[test]
    fn test_exact_lookup() {
        assert_eq!(scorer().score(&url("https://example.com/")), 0.8);
    }

    #[test]
    fn test_subdomain_inherits_closest_parent() {
        let scorer = scorer();
        assert_eq!(scorer.score(&url("https://docs.example.com/")), 0.8);
        assert_eq!(scorer.score(&url("https://a.blog.example.com/")), 0.3);
    }

    #[test]
    fn test_unknown_domain_gets_default() {
        assert_eq!(scorer().score(&url("https://unknown.org/")), 0.1);
    }

    #[test]
    fn test_invalid_values() {
        assert!(DomainAuthorityScorer::new([("a.com".to_string(), f64::NAN)], 0.0).is_err());
    }
}
