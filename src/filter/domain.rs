use crate::config::validate_domain_pattern;
use crate::url::{extract_domain, matches_wildcard};
use crate::ConfigError;
use url::Url;

/// Admits links by host against allow and block lists
///
/// Checked in the following priority order:
/// 1. Block list (highest priority)
/// 2. Allow list, when non-empty
///
/// Entries may be exact hosts (`example.com`) or wildcards (`*.example.com`,
/// which covers the bare domain and all subdomains). With
/// `include_subdomains`, exact entries also cover their subdomains.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    allowed: Vec<String>,
    blocked: Vec<String>,
    include_subdomains: bool,
}

impl DomainFilter {
    /// # Errors
    ///
    /// Fails when both lists are empty or an entry is not a valid domain
    /// pattern.
    pub fn new<S: AsRef<str>>(
        allowed: &[S],
        blocked: &[S],
        include_subdomains: bool,
    ) -> Result<Self, ConfigError> {
        if allowed.is_empty() && blocked.is_empty() {
            return Err(ConfigError::Validation(
                "domain filter needs at least one allowed or blocked domain".to_string(),
            ));
        }

        Ok(Self {
            allowed: Self::prepare(allowed)?,
            blocked: Self::prepare(blocked)?,
            include_subdomains,
        })
    }

    fn prepare<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<String>, ConfigError> {
        patterns
            .iter()
            .map(|p| {
                let pattern = p.as_ref().trim().to_lowercase();
                validate_domain_pattern(&pattern)?;
                Ok(pattern)
            })
            .collect()
    }

    pub fn admit(&self, url: &Url) -> bool {
        let Some(domain) = extract_domain(url) else {
            return false;
        };

        let matches = |pattern: &String| matches_wildcard(pattern, &domain, self.include_subdomains);

        if self.blocked.iter().any(matches) {
            return false;
        }

        self.allowed.is_empty() || self.allowed.iter().any(matches)
    }
}
