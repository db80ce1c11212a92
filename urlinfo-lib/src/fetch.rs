//! Size-capped retrieval of a link in two phases.
//!
//! First a `HEAD` request learns whether anything answers and what it claims
//! to serve. Only if that looks worthwhile does a `GET` follow, whose body is
//! read chunk by chunk and dropped the moment it grows past the ceiling.
//! Servers which omit or misstate `Content-Length` are caught by the second
//! check.
use std::time::Duration;

use headers::{ContentLength, HeaderMapExt};
use http::header::{CONTENT_TYPE, HeaderMap};
use log::{debug, warn};
use url::Url;

use crate::{
    types::{FetchOutcome, Probe, Reachability},
    utils::reqwest::{analyze_error_chain, classify},
};

/// Returns `true` if a body of type `mime` is worth downloading.
///
/// That is the case for every known type except `application/*`, which is
/// mostly archives and other binaries.
pub(crate) fn is_parsable(mime: Option<&str>) -> bool {
    mime.is_some_and(|mime| !essence(mime).starts_with("application/"))
}

/// Returns `true` if `mime` denotes an HTML document
pub(crate) fn is_html(mime: &str) -> bool {
    essence(mime).contains("html")
}

// `Text/HTML; charset=utf-8` -> `text/html`
fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)?
        .to_str()
        .ok()
        .map(ToString::to_string)
}

/// Running byte count of a streamed body
#[derive(Debug, Clone, Copy)]
struct SizeGuard {
    limit: u64,
    seen: u64,
}

impl SizeGuard {
    const fn new(limit: u64) -> Self {
        Self { limit, seen: 0 }
    }

    /// Count another `len` bytes. Returns `false` once the total exceeds the
    /// limit.
    fn admit(&mut self, len: usize) -> bool {
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        self.seen = self.seen.saturating_add(len);
        self.seen <= self.limit
    }
}

/// Performs the probe and body requests for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub(crate) struct Fetcher {
    reqwest_client: reqwest::Client,
    /// Timeout of each request, including reading the body
    timeout: Duration,
    /// Maximum number of body bytes accepted
    max_body_size: u64,
}

impl Fetcher {
    pub(crate) const fn new(
        reqwest_client: reqwest::Client,
        timeout: Duration,
        max_body_size: u64,
    ) -> Self {
        Self {
            reqwest_client,
            timeout,
            max_body_size,
        }
    }

    pub(crate) const fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    /// Send a `HEAD` request to `url` and record what the server declares.
    ///
    /// Transport errors are folded into [`Reachability`], this never fails.
    pub(crate) async fn probe(&self, url: &Url) -> Probe {
        let response = self
            .reqwest_client
            .head(url.clone())
            .timeout(self.timeout)
            .send()
            .await;

        match response {
            Ok(response) => {
                let headers = response.headers();
                // Read the header itself, the (empty) body of a HEAD
                // response says nothing about the length
                let probe = Probe {
                    url: response.url().clone(),
                    reachability: Reachability::from_status(response.status()),
                    mime: content_type(headers),
                    content_length: headers.typed_get::<ContentLength>().map(|l| l.0),
                };
                debug!(
                    "Probed {url}: {} ({}, {} bytes)",
                    probe.reachability,
                    probe.mime.as_deref().unwrap_or("no content type"),
                    probe
                        .content_length
                        .map_or_else(|| "unknown".to_string(), |l| l.to_string()),
                );
                probe
            }
            Err(e) => {
                let reachability = classify(&e);
                warn!("Cannot reach {url}: {reachability}");
                Probe::unreachable(url.clone(), reachability)
            }
        }
    }

    /// Download the body of `url`, giving up once it exceeds the ceiling.
    ///
    /// Returning early drops the response, which closes the underlying
    /// connection instead of draining it.
    pub(crate) async fn fetch_body(&self, url: &Url) -> FetchOutcome {
        let mut response = match self
            .reqwest_client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Cannot download {url}: {}", analyze_error_chain(&e));
                return FetchOutcome::Absent;
            }
        };

        if let Some(ContentLength(length)) = response.headers().typed_get::<ContentLength>() {
            if length > self.max_body_size {
                debug!(
                    "{url} declares {length} bytes, limit is {}",
                    self.max_body_size
                );
                return FetchOutcome::TooLarge;
            }
        }

        let final_url = response.url().clone();
        let mut guard = SizeGuard::new(self.max_body_size);
        let mut bytes = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if !guard.admit(chunk.len()) {
                        debug!(
                            "Aborting download of {url} after {} bytes, limit is {}",
                            guard.seen, self.max_body_size
                        );
                        return FetchOutcome::TooLarge;
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Download of {url} broke off: {}",
                        analyze_error_chain(&e)
                    );
                    return FetchOutcome::Absent;
                }
            }
        }

        debug!("Downloaded {} bytes from {final_url}", bytes.len());
        FetchOutcome::Body {
            bytes,
            url: final_url,
        }
    }
}
