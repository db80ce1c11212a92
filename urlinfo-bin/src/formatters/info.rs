use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use urlinfo_lib::UrlInfo;

/// A candidate link together with its descriptor
#[derive(Debug, Serialize)]
pub(crate) struct Described<'a> {
    /// The candidate exactly as it was given, which may not be a string
    pub(crate) link: &'a Value,
    pub(crate) info: &'a UrlInfo,
}

pub(crate) trait InfoFormatter {
    /// Format all descriptors for stdout
    fn format(&self, described: &[Described<'_>]) -> Result<String>;
}

/// One line per link
pub(crate) struct Plain;

impl Plain {
    pub(crate) const fn new() -> Self {
        Self {}
    }
}

impl InfoFormatter for Plain {
    fn format(&self, described: &[Described<'_>]) -> Result<String> {
        let lines: Vec<String> = described
            .iter()
            .map(|Described { link, info }| {
                let marker = if info.is_web_resource { "WEB" } else { "ERR" };
                // Show strings without the JSON quotes
                match link.as_str() {
                    Some(link) => format!("[{marker}] {link} | {info}"),
                    None => format!("[{marker}] {link} | {info}"),
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

pub(crate) struct Json;

impl Json {
    pub(crate) const fn new() -> Self {
        Self {}
    }
}

impl InfoFormatter for Json {
    /// Format descriptors as a JSON array
    fn format(&self, described: &[Described<'_>]) -> Result<String> {
        serde_json::to_string_pretty(described).context("Cannot format descriptors as JSON")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn example() -> UrlInfo {
        UrlInfo {
            is_web_resource: true,
            mime: Some("text/html; charset=utf-8".to_string()),
            parsable: true,
            too_large: false,
            title: Some("Example Domain".to_string()),
            favicon_url: Some("https://example.com/favicon.ico".parse().unwrap()),
        }
    }

    #[test]
    fn test_plain() {
        let info = example();
        let invalid = UrlInfo::invalid();
        let link = json!("https://example.com");
        let number = json!(42);
        let described = [
            Described {
                link: &link,
                info: &info,
            },
            Described {
                link: &number,
                info: &invalid,
            },
        ];

        assert_eq!(
            Plain::new().format(&described).unwrap(),
            "[WEB] https://example.com | text/html; charset=utf-8 \"Example Domain\" [https://example.com/favicon.ico]\n\
             [ERR] 42 | not a web resource"
        );
    }

    #[test]
    fn test_json() {
        let info = example();
        let link = json!("example.com");
        let described = [Described {
            link: &link,
            info: &info,
        }];

        let output: Value = serde_json::from_str(&Json::new().format(&described).unwrap()).unwrap();
        assert_eq!(
            output,
            json!([{
                "link": "example.com",
                "info": {
                    "isWebResource": true,
                    "mime": "text/html; charset=utf-8",
                    "parsable": true,
                    "tooLarge": false,
                    "title": "Example Domain",
                    "faviconUrl": "https://example.com/favicon.ico"
                }
            }])
        );
    }
}
