//! Title and favicon extraction from HTML documents.
use url::Url;

mod html5ever;

use self::html5ever::{LinkTag, extract_html};

/// Metadata found in an HTML document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Text of the first `<title>` element, surrounding whitespace removed
    pub title: Option<String>,
    /// Absolute URL of the favicon
    pub favicon_url: Option<Url>,
}

/// Where a favicon may come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaviconSource {
    /// A `<link>` element with the given `rel` value
    LinkRel(&'static str),
    /// A fixed path on the origin of the document
    DefaultPath(&'static str),
}

/// Favicon sources, highest priority first. The first one that yields a URL
/// wins.
const FAVICON_POLICY: [FaviconSource; 3] = [
    FaviconSource::LinkRel("icon"),
    FaviconSource::LinkRel("shortcut icon"),
    FaviconSource::DefaultPath("/favicon.ico"),
];

impl FaviconSource {
    fn resolve(self, links: &[LinkTag], base: &Url) -> Option<Url> {
        match self {
            Self::LinkRel(rel) => links
                .iter()
                .filter(|link| link.has_rel(rel))
                .find_map(|link| {
                    let href = link.href.as_deref()?.trim();
                    if href.is_empty() {
                        return None;
                    }
                    base.join(href).ok()
                }),
            // Reported without checking whether anything is served there
            Self::DefaultPath(path) => base.join(path).ok(),
        }
    }
}

/// Extract title and favicon from an HTML `body` served at `url`.
///
/// `url` should be the final URL after redirects, since relative favicon
/// links are resolved against it. Invalid UTF-8 is replaced and malformed
/// markup is tolerated, so this never fails; at worst the title is missing
/// and the favicon falls back to `/favicon.ico`.
#[must_use]
pub fn extract_metadata(body: &[u8], url: &Url) -> Metadata {
    let html = String::from_utf8_lossy(body);
    let elements = extract_html(&html);

    let favicon_url = FAVICON_POLICY
        .iter()
        .find_map(|source| source.resolve(&elements.links, url));

    Metadata {
        title: elements.title.map(|title| title.trim().to_string()),
        favicon_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_utils::load_fixture;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn favicon(html: &str, base: &str) -> Option<String> {
        extract_metadata(html.as_bytes(), &url(base))
            .favicon_url
            .map(String::from)
    }

    #[test]
    fn test_first_of_many_titles() {
        let html = load_fixture!("TEST_MANY_TITLES.html");
        let metadata = extract_metadata(html.as_bytes(), &url("https://example.com/"));
        assert_eq!(metadata.title.as_deref(), Some("The first title"));
    }

    #[test]
    fn test_rel_icon() {
        let html = load_fixture!("TEST_FAVICON_ICON.html");
        let metadata = extract_metadata(html.as_bytes(), &url("https://example.com/docs/page"));
        assert_eq!(
            metadata,
            Metadata {
                title: Some("Icon via rel=icon".to_string()),
                favicon_url: Some(url("https://example.com/static/favicon.png")),
            }
        );
    }

    #[test]
    fn test_rel_shortcut_icon() {
        let html = load_fixture!("TEST_FAVICON_SHORTCUT.html");
        let metadata = extract_metadata(html.as_bytes(), &url("https://en.example.org/wiki/Favicon"));
        assert_eq!(
            metadata.favicon_url,
            Some(url("https://en.example.org/static/favicon/wikipedia.ico"))
        );
    }

    #[test]
    fn test_default_favicon() {
        let html = load_fixture!("TEST_NO_FAVICON.html");
        let metadata = extract_metadata(html.as_bytes(), &url("http://www.example.co.uk/news?id=1"));
        assert_eq!(
            metadata.favicon_url,
            Some(url("http://www.example.co.uk/favicon.ico"))
        );
    }

    #[test]
    fn test_icon_beats_shortcut_icon() {
        let html = r#"<link rel="shortcut icon" href="/shortcut.ico"><link rel="icon" href="/icon.png">"#;
        assert_eq!(
            favicon(html, "http://example.com/"),
            Some("http://example.com/icon.png".to_string())
        );
    }

    #[test]
    fn test_relative_href_resolves_against_page() {
        let html = r#"<link rel="icon" href="img/icon.png">"#;
        assert_eq!(
            favicon(html, "http://example.com/blog/post.html"),
            Some("http://example.com/blog/img/icon.png".to_string())
        );
    }

    #[test]
    fn test_protocol_relative_href() {
        let html = r#"<link rel="icon" href="//cdn.example.net/icon.png">"#;
        assert_eq!(
            favicon(html, "https://example.com/"),
            Some("https://cdn.example.net/icon.png".to_string())
        );
    }

    #[test]
    fn test_empty_href_falls_through() {
        let html = r#"<link rel="icon" href=""><link rel="shortcut icon" href="/s.ico">"#;
        assert_eq!(
            favicon(html, "http://example.com/"),
            Some("http://example.com/s.ico".to_string())
        );
    }

    #[test]
    fn test_default_favicon_keeps_port() {
        assert_eq!(
            favicon("<p>hi</p>", "http://127.0.0.1:8080/a/b"),
            Some("http://127.0.0.1:8080/favicon.ico".to_string())
        );
    }

    #[test]
    fn test_malformed_html() {
        let metadata = extract_metadata(
            b"<html><head><title>Broken <<<\xff\xfe</ti",
            &url("http://example.com/"),
        );
        assert!(metadata.title.unwrap().starts_with("Broken <<<"));
        assert_eq!(
            metadata.favicon_url,
            Some(url("http://example.com/favicon.ico"))
        );
    }

    #[test]
    fn test_title_whitespace_trimmed() {
        let metadata = extract_metadata(
            b"<title>\n    Spaced out\n  </title>",
            &url("http://example.com/"),
        );
        assert_eq!(metadata.title.as_deref(), Some("Spaced out"));
    }

    #[test]
    fn test_whitespace_only_title() {
        let metadata = extract_metadata(b"<title>  </title>", &url("http://example.com/"));
        assert_eq!(metadata.title.as_deref(), Some(""));
    }
}
