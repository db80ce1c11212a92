use std::fmt::Display;

use serde::{Deserialize, Serialize};
use url::Url;

/// Description of the web resource a link points to.
///
/// Every call to [`Client::resolve`](crate::Client::resolve) yields exactly one
/// `UrlInfo`. Failures along the way (invalid link, unreachable host,
/// oversized body, binary content) show up as fields, so a partially
/// populated value is a normal result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlInfo {
    /// `true` if the server answered with any HTTP response, error statuses
    /// included
    pub is_web_resource: bool,
    /// Declared content type, e.g. `text/html; charset=utf-8`
    pub mime: Option<String>,
    /// `true` if the content type is known and not `application/*`
    pub parsable: bool,
    /// `true` if the body is (or was about to be) larger than the ceiling
    pub too_large: bool,
    /// Text of the first `<title>` element, with leading and trailing
    /// whitespace removed. An empty element yields `Some("")`.
    pub title: Option<String>,
    /// Absolute URL of the favicon
    pub favicon_url: Option<Url>,
}

impl UrlInfo {
    /// The result for a link which failed validation.
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }
}

impl Display for UrlInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_web_resource {
            return f.write_str("not a web resource");
        }
        f.write_str(self.mime.as_deref().unwrap_or("unknown type"))?;
        if self.too_large {
            f.write_str(" (too large)")?;
        }
        if let Some(title) = &self.title {
            write!(f, " \"{title}\"")?;
        }
        if let Some(favicon) = &self.favicon_url {
            write!(f, " [{favicon}]")?;
        }
        Ok(())
    }
}
