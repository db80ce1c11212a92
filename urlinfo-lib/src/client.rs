//! Resolution of links into [`UrlInfo`] descriptors.
//!
//! This module defines two structs, [`Client`] and [`ClientBuilder`].
//! `Client` resolves links and returns descriptors.
//! `ClientBuilder` exposes a finer level of granularity for building
//! a `Client`.
//!
//! For convenience, a free function [`resolve`] is provided for ad-hoc
//! lookups.
#![allow(clippy::module_name_repetitions)]
use std::time::Duration;

use http::header::{self, HeaderMap, HeaderValue};
use log::debug;
use serde_json::Value;
use typed_builder::TypedBuilder;
use url::Url;

use crate::{
    ErrorKind, FetchOutcome, Result, UrlInfo,
    extract::extract_metadata,
    fetch::{Fetcher, is_html, is_parsable},
    link::{is_valid, normalize},
};

/// Default number of redirects followed by each request, 5.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
/// Default timeout in seconds for each request, 4.
pub const DEFAULT_TIMEOUT_SECS: u64 = 4;
/// Default ceiling for downloaded bodies in bytes, 5 MiB.
pub const DEFAULT_MAX_BODY_SIZE: u64 = 5 * 1024 * 1024;
/// Default user agent, `urlinfo/<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("urlinfo/", env!("CARGO_PKG_VERSION"));

/// Builder for [`Client`].
///
/// See crate-level documentation for usage example.
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
#[builder(builder_method(doc = "
Create a builder for building `ClientBuilder`.

On the builder call, call methods with same name as its fields to set their values.

Finally, call `.build()` to create the instance of `ClientBuilder`.
"))]
pub struct ClientBuilder {
    /// User-agent sent with every request.
    ///
    /// *NOTE*: Some sites answer unknown agents with a `403`, in which case
    /// a browser-like value helps.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,
    /// Timeout per request.
    ///
    /// For the body request this covers the whole download, so a slow
    /// server trickling data cannot hold a lookup open forever.
    #[builder(default_code = "Duration::from_secs(DEFAULT_TIMEOUT_SECS)")]
    timeout: Duration,
    /// Maximum body size in bytes.
    ///
    /// Applies to the declared `Content-Length` of both requests and to the
    /// number of bytes actually streamed.
    #[builder(default = DEFAULT_MAX_BODY_SIZE)]
    max_body_size: u64,
    /// Sets the default [headers] for every request. See also [here].
    ///
    /// [headers]: https://docs.rs/http/latest/http/header/struct.HeaderName.html
    /// [here]: https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#method.default_headers
    custom_headers: HeaderMap,
    /// When `true`, accept invalid SSL certificates.
    ///
    /// ## Warning
    ///
    /// You should think very carefully before using this method. If
    /// invalid certificates are trusted, any certificate for any site
    /// will be trusted for use. This includes expired certificates. This
    /// introduces significant vulnerabilities, and should only be used
    /// as a last resort.
    allow_insecure: bool,
}

impl Default for ClientBuilder {
    #[must_use]
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiates a [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The user-agent is invalid.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn client(self) -> Result<Client> {
        let Self {
            user_agent,
            timeout,
            max_body_size,
            custom_headers: mut headers,
            allow_insecure,
        } = self;

        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(ErrorKind::InvalidHeader)?,
        );

        let reqwest_client = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .danger_accept_invalid_certs(allow_insecure)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS))
            .build()
            .map_err(ErrorKind::BuildRequestClient)?;

        Ok(Client {
            fetcher: Fetcher::new(reqwest_client, timeout, max_body_size),
        })
    }
}

/// Resolves links and returns [`UrlInfo`] descriptors.
///
/// Cloning is cheap and clones share one connection pool. Lookups are
/// independent of each other and may run concurrently.
///
/// See [`ClientBuilder`] which contains sane defaults for all configuration options.
#[derive(Debug, Clone)]
pub struct Client {
    /// Issues the probe and body requests
    fetcher: Fetcher,
}

impl Client {
    /// Resolve a single candidate link.
    ///
    /// The link is normalized (`example.com` becomes `http://example.com`),
    /// validated, probed with a `HEAD` request and, if its content type is
    /// eligible and small enough, downloaded and searched for a title and a
    /// favicon. Every ordinary failure is recorded in the returned
    /// [`UrlInfo`].
    ///
    /// # Errors
    ///
    /// Only internal faults end up here: the metadata extraction task
    /// panicked or was cancelled, or a validated link could not be parsed.
    pub async fn resolve(&self, link: &str) -> Result<UrlInfo> {
        let link = normalize(link);
        if !is_valid(&link) {
            debug!("Not a valid web link: {link}");
            return Ok(UrlInfo::invalid());
        }
        let url = Url::parse(&link).map_err(|e| ErrorKind::InvalidUrl(link.to_string(), e))?;
        debug!("Resolving {url}");

        let probe = self.fetcher.probe(&url).await;
        let mut info = UrlInfo {
            is_web_resource: probe.reachability.is_web_resource(),
            parsable: is_parsable(probe.mime.as_deref()),
            mime: probe.mime.clone(),
            ..UrlInfo::default()
        };

        if !info.is_web_resource {
            return Ok(info);
        }
        if probe.exceeds(self.fetcher.max_body_size()) {
            debug!("Not downloading {url}: declared length is above the limit");
            info.too_large = true;
            return Ok(info);
        }
        if !info.parsable {
            debug!(
                "Not downloading {url}: content type {} is not parsable",
                info.mime.as_deref().unwrap_or("<missing>")
            );
            return Ok(info);
        }

        match self.fetcher.fetch_body(&probe.url).await {
            FetchOutcome::TooLarge => info.too_large = true,
            FetchOutcome::Absent => (),
            FetchOutcome::Body { bytes, url } => {
                if info.mime.as_deref().is_some_and(is_html) {
                    let metadata =
                        tokio::task::spawn_blocking(move || extract_metadata(&bytes, &url))
                            .await?;
                    debug!(
                        "Extracted title {:?} and favicon {:?}",
                        metadata.title,
                        metadata.favicon_url.as_ref().map(Url::as_str)
                    );
                    info.title = metadata.title;
                    info.favicon_url = metadata.favicon_url;
                }
            }
        }

        Ok(info)
    }

    /// Resolve a candidate of unknown type, e.g. an element of a JSON array.
    ///
    /// Anything but a string yields the descriptor of an invalid link
    /// without touching the network.
    ///
    /// # Errors
    ///
    /// See [`Client::resolve`].
    pub async fn resolve_value(&self, value: &Value) -> Result<UrlInfo> {
        match value.as_str() {
            Some(link) => self.resolve(link).await,
            None => {
                debug!("Not a valid web link: {value}");
                Ok(UrlInfo::invalid())
            }
        }
    }
}

/// A convenience function to resolve a single link.
///
/// This provides the simplest lookup without having to create a [`Client`].
/// For more complex scenarios, see documentation of [`ClientBuilder`] instead.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The request client cannot be built (see [`ClientBuilder::client`] for failure cases).
/// - The link cannot be resolved (see [`Client::resolve`] for failure cases).
pub async fn resolve(link: &str) -> Result<UrlInfo> {
    let client = ClientBuilder::builder().build().client()?;
    client.resolve(link).await
}
