use url::Url;

/// Content type assumed for paths without a recognised file extension
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Server-side script extensions, which render HTML rather than serve source
const SCRIPT_EXTENSIONS: &[&str] = &["php", "asp", "aspx", "jsp", "cgi"];

/// Infers the content type a URL is expected to serve from its path extension
///
/// Links are judged before they are fetched, so the extension of the last path
/// segment is the only signal available. Paths without an extension (or with
/// an unknown one) are assumed to serve HTML.
///
/// ```
/// use deep_crawl::url::infer_content_type;
/// use url::Url;
///
/// let pdf = Url::parse("https://example.com/report.PDF").unwrap();
/// assert_eq!(infer_content_type(&pdf), "application/pdf");
///
/// let page = Url::parse("https://example.com/docs/intro").unwrap();
/// assert_eq!(infer_content_type(&page), "text/html");
/// ```
pub fn infer_content_type(url: &Url) -> String {
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let Some((_, extension)) = last_segment.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE.to_string();
    };

    if SCRIPT_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
    {
        return DEFAULT_CONTENT_TYPE.to_string();
    }

    mime_guess::from_ext(extension)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Checks whether a content type matches a pattern
///
/// Patterns are either a full type (`text/html`), a family wildcard
/// (`image/*`) or a bare family (`image`). Parameters such as `; charset=utf-8`
/// are ignored and comparison is case-insensitive.
pub fn content_type_matches(pattern: &str, content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    let pattern = pattern.trim().to_ascii_lowercase();

    if let Some(family) = pattern.strip_suffix("/*") {
        return essence.split('/').next() == Some(family);
    }
    if !pattern.contains('/') {
        return essence.split('/').next() == Some(pattern.as_str());
    }
    essence == pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_known_extensions() {
        assert_eq!(infer_content_type(&url("https://a.com/x.png")), "image/png");
        assert_eq!(infer_content_type(&url("https://a.com/x.json")), "application/json");
        assert_eq!(infer_content_type(&url("https://a.com/a/b/c.Html")), "text/html");
    }

    #[test]
    fn test_extension_ignores_query() {
        assert_eq!(
            infer_content_type(&url("https://a.com/file.pdf?download=1")),
            "application/pdf"
        );
    }

    #[test]
    fn test_unknown_or_missing_extension_defaults_to_html() {
        assert_eq!(infer_content_type(&url("https://a.com/")), "text/html");
        assert_eq!(infer_content_type(&url("https://a.com/about")), "text/html");
        assert_eq!(infer_content_type(&url("https://a.com/v1.2.weird")), "text/html");
    }

    #[test]
    fn test_server_scripts_count_as_html() {
        assert_eq!(infer_content_type(&url("https://a.com/index.php")), "text/html");
        assert_eq!(infer_content_type(&url("https://a.com/Default.ASPX")), "text/html");
    }

    #[test]
    fn test_content_type_matches() {
        assert!(content_type_matches("text/html", "text/html; charset=utf-8"));
        assert!(content_type_matches("image/*", "image/png"));
        assert!(content_type_matches("image", "image/jpeg"));
        assert!(content_type_matches("TEXT/HTML", "text/html"));
        assert!(!content_type_matches("image/*", "text/html"));
        assert!(!content_type_matches("application/json", "application/pdf"));
    }
}
