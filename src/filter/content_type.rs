use crate::filter::FilterMode;
use crate::url::{content_type_matches, infer_content_type};
use crate::ConfigError;
use url::Url;

/// Admits or rejects links by the content type they are expected to serve
///
/// A link has not been fetched when it is filtered, so its type is inferred
/// from the URL extension (extensionless paths count as `text/html`).
/// Entries are full types (`application/pdf`) or families (`image/*`).
#[derive(Debug, Clone)]
pub struct ContentTypeFilter {
    types: Vec<String>,
    mode: FilterMode,
}

impl ContentTypeFilter {
    /// # Errors
    ///
    /// Fails when the list is empty or contains a blank entry.
    pub fn new<S: AsRef<str>>(types: &[S], mode: FilterMode) -> Result<Self, ConfigError> {
        if types.is_empty() {
            return Err(ConfigError::Validation(
                "content-type filter needs at least one type".to_string(),
            ));
        }

        let types = types
            .iter()
            .map(|t| {
                let t = t.as_ref().trim();
                if t.is_empty() {
                    Err(ConfigError::Validation(
                        "content-type filter entries cannot be empty".to_string(),
                    ))
                } else {
                    Ok(t.to_ascii_lowercase())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { types, mode })
    }

    pub fn admit(&self, url: &Url) -> bool {
        let content_type = infer_content_type(url);
        let matched = self
            .types
            .iter()
            .any(|pattern| content_type_matches(pattern, &content_type));
        self.mode.decide(matched)
    }
}
