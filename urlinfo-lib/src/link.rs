//! Syntactic handling of candidate links.
//!
//! Nothing in here touches the network. [`normalize`] makes sure a link
//! carries a scheme and [`is_valid`] decides whether the result is worth
//! probing at all. Both have `_value` twins for untyped JSON input, where a
//! candidate may turn out to be a number, an object or `null`.
use std::borrow::Cow;

use serde_json::Value;
use url::{Host, Url};

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Prefix `link` with `http://` unless it already starts with `http://` or
/// `https://`.
///
/// The check is case-sensitive on the scheme literal, so `HTTP://foo` gets
/// prefixed as well. No validation happens here.
#[must_use]
pub fn normalize(link: &str) -> Cow<'_, str> {
    if link.starts_with(HTTP_PREFIX) || link.starts_with(HTTPS_PREFIX) {
        Cow::Borrowed(link)
    } else {
        Cow::Owned(format!("{HTTP_PREFIX}{link}"))
    }
}

/// Like [`normalize`], but for any JSON value.
///
/// Strings are normalized, everything else is returned unchanged.
#[must_use]
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(link) => Value::String(normalize(&link).into_owned()),
        other => other,
    }
}

/// Returns `true` if `link` is a well-formed `http` or `https` URL.
///
/// Rejected are links containing whitespace or control characters anywhere,
/// links with another scheme (`mailto:`, `javascript:`, ...), links where
/// the scheme is not followed by `//`, and hosts which are not a plain
/// domain name or IP address.
#[must_use]
pub fn is_valid(link: &str) -> bool {
    if link.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    let Ok(url) = Url::parse(link) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    // `Url::parse` accepts `http:example.com`, we don't
    if !link
        .get(url.scheme().len()..)
        .is_some_and(|rest| rest.starts_with("://"))
    {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => is_valid_domain(domain),
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        None => false,
    }
}

/// Like [`is_valid`], but for any JSON value. Only strings can be valid.
#[must_use]
pub fn is_valid_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid)
}

// Domains reach us lowercased and punycode-encoded
fn is_valid_domain(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_normalize_adds_prefix() {
        assert_eq!(normalize("google.com"), "http://google.com");
        assert_eq!(normalize("www.hs.fi"), "http://www.hs.fi");
    }

    #[rstest]
    #[case("http://google.com")]
    #[case("https://google.com")]
    #[case("https://example.com/path?query#fragment")]
    fn test_normalize_keeps_prefixed(#[case] link: &str) {
        assert!(matches!(normalize(link), Cow::Borrowed(_)));
        assert_eq!(normalize(link), link);
        assert_eq!(normalize(&normalize(link)), normalize(link));
    }

    #[test]
    fn test_normalize_is_case_sensitive() {
        assert_eq!(normalize("HTTP://google.com"), "http://HTTP://google.com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("google.com");
        assert_eq!(normalize(&once), once);
    }

    #[rstest]
    #[case(json!({"hello": "this object is not a weblink"}))]
    #[case(json!(42))]
    #[case(json!(null))]
    #[case(json!(["google.com"]))]
    #[case(json!(true))]
    fn test_normalize_value_ignores_non_strings(#[case] value: Value) {
        assert_eq!(normalize_value(value.clone()), value);
    }

    #[test]
    fn test_normalize_value_string() {
        assert_eq!(
            normalize_value(json!("google.com")),
            json!("http://google.com")
        );
    }

    #[rstest]
    #[case("http://google.com")]
    #[case("https://google.com")]
    #[case("http://localhost:8080/some/path")]
    #[case("http://127.0.0.1")]
    #[case("http://[::1]:3000/")]
    #[case("https://sub_domain.example.org/a?b=c#d")]
    #[case("https://bücher.de")]
    #[case("HTTP://GOOGLE.COM")]
    #[case("http://example.com.")]
    fn test_valid_links(#[case] link: &str) {
        assert!(is_valid(link), "expected {link} to be valid");
    }

    #[rstest]
    #[case("http://this is not a web link!!")]
    #[case("go  ogle.  com")]
    #[case("http://go  ogle.  com")]
    #[case("mailto:someemailaddress@email.com")]
    #[case("javascript")]
    #[case("javascript:alert(1)")]
    #[case("ftp://example.com")]
    #[case("THIS IS AN INVALID LINK")]
    #[case("http://THIS IS AN INVALID LINK")]
    #[case("http://")]
    #[case("http:example.com")]
    #[case("http://exa\tmple.com")]
    #[case("http://example..com")]
    #[case("http://example.com/with space")]
    #[case("")]
    fn test_invalid_links(#[case] link: &str) {
        assert!(!is_valid(link), "expected {link} to be invalid");
    }

    #[rstest]
    #[case(json!({"hello": "this object is not a weblink"}))]
    #[case(json!(42))]
    #[case(json!(null))]
    #[case(json!(["http://google.com"]))]
    fn test_non_strings_are_invalid(#[case] value: Value) {
        assert!(!is_valid_value(&value));
    }

    #[test]
    fn test_normalized_scenarios() {
        assert!(is_valid(&normalize("google.com")));
        assert!(!is_valid(&normalize("THIS IS AN INVALID LINK")));
        assert!(is_valid_value(&normalize_value(json!("google.com"))));
    }
}
