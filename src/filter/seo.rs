use crate::filter::PageMeta;
use crate::url::{content_type_matches, path_depth};
use url::Url;

/// Structural heuristics applied to links and the page they came from
///
/// - `min_title_length`: links found on a page whose title is shorter than
///   this (in characters) are rejected. Skipped when no page metadata is
///   available or the page was served as something other than HTML.
/// - `max_url_length`: rejects overly long URLs.
/// - `max_path_depth`: rejects URLs with too many path segments.
#[derive(Debug, Clone, Default)]
pub struct SeoFilter {
    pub min_title_length: usize,
    pub max_url_length: Option<usize>,
    pub max_path_depth: Option<usize>,
}

impl SeoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_title_length(mut self, chars: usize) -> Self {
        self.min_title_length = chars;
        self
    }

    pub fn max_url_length(mut self, chars: usize) -> Self {
        self.max_url_length = Some(chars);
        self
    }

    pub fn max_path_depth(mut self, segments: usize) -> Self {
        self.max_path_depth = Some(segments);
        self
    }

    pub fn admit(&self, url: &Url, page: Option<&PageMeta>) -> bool {
        if let Some(max) = self.max_url_length {
            if url.as_str().chars().count() > max {
                return false;
            }
        }

        if let Some(max) = self.max_path_depth {
            if path_depth(url) > max {
                return false;
            }
        }

        if self.min_title_length > 0 {
            if let Some(page) = page.filter(|p| Self::is_html(p)) {
                let title_len = page
                    .title
                    .as_deref()
                    .map(|t| t.trim().chars().count())
                    .unwrap_or(0);
                if title_len < self.min_title_length {
                    return false;
                }
            }
        }

        true
    }

    /// Pages without a Content-Type header are assumed to be HTML
    fn is_html(page: &PageMeta) -> bool {
        page.content_type.as_deref().map_or(true, |ct| {
            content_type_matches("text/html", ct)
                || content_type_matches("application/xhtml+xml", ct)
        })
    }
}
