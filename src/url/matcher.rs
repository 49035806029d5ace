use crate::url::domain::is_same_or_subdomain;
use crate::ConfigError;
use regex::{Regex, RegexBuilder};

/// Checks if a domain matches a domain pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com", or any subdomain
///    of it when `include_subdomains` is set
/// 2. Wildcard match: "*.example.com" always matches:
///    - "example.com" (the bare domain)
///    - "blog.example.com" (single subdomain)
///    - "api.v2.example.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use deep_crawl::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com", false));
/// assert!(!matches_wildcard("example.com", "blog.example.com", false));
/// assert!(matches_wildcard("example.com", "blog.example.com", true));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com", false));
/// assert!(!matches_wildcard("*.example.com", "example.org", false));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str, include_subdomains: bool) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        is_same_or_subdomain(candidate, base)
    } else if include_subdomains {
        is_same_or_subdomain(candidate, pattern)
    } else {
        candidate == pattern
    }
}

/// A compiled glob pattern matched against a whole URL
///
/// `*` matches any run of characters (including `/`), `?` matches exactly one
/// character and `[abc]` / `[!abc]` match one character from (or outside) a
/// set. Every other character is literal. The pattern must match the
/// entire URL, so `*/login/*` matches `https://example.com/login/form` but
/// `/login/` alone matches nothing.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compiles a glob pattern
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` for an empty pattern or one that
    /// fails to compile.
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, ConfigError> {
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Glob pattern cannot be empty".to_string(),
            ));
        }

        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                '[' => {
                    expr.push('[');
                    if chars.next_if_eq(&'!').is_some() {
                        expr.push('^');
                    }
                    let mut closed = false;
                    let mut empty = true;
                    for inner in chars.by_ref() {
                        if inner == ']' && !empty {
                            closed = true;
                            break;
                        }
                        empty = false;
                        if inner != '-' && inner.is_ascii_punctuation() {
                            expr.push('\\');
                        }
                        expr.push(inner);
                    }
                    if !closed {
                        return Err(ConfigError::InvalidPattern(format!(
                            "Unterminated character class in glob '{}'",
                            pattern
                        )));
                    }
                    expr.push(']');
                }
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');

        let regex = RegexBuilder::new(&expr)
            .case_insensitive(!case_sensitive)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| {
                ConfigError::InvalidPattern(format!("Invalid glob '{}': {}", pattern, e))
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns true when the pattern matches the whole candidate
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
