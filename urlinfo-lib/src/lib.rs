//! `urlinfo` is a library for describing links.
//!
//! Given a candidate link it tells you whether it points at a live web
//! resource, what content type the resource declares and, for HTML pages,
//! the page title and favicon location.
//!
//! "Hello world" example:
//! ```no_run
//! use urlinfo_lib::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let info = urlinfo_lib::resolve("example.com").await?;
//!   println!("{info}");
//!   Ok(())
//! }
//! ```
//!
//! For more specific use-cases you can build a client yourself,
//! using the `ClientBuilder`:
//!
//! ```no_run
//! use std::time::Duration;
//! use urlinfo_lib::{ClientBuilder, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let client = ClientBuilder::builder()
//!       .timeout(Duration::from_secs(10))
//!       .build()
//!       .client()?;
//!   let info = client.resolve("https://example.com").await?;
//!   assert!(info.is_web_resource);
//!   Ok(())
//! }
//! ```
//!
//! Lookups never fail because of the remote side. An unreachable host, a
//! timeout or an unsupported link all produce a [`UrlInfo`] with
//! `is_web_resource` set to `false`.
// #![deny(missing_docs)]

mod client;
mod fetch;
mod types;
mod utils;

pub mod extract;
pub mod link;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(feature = "native-tls")]
use openssl_sys as _; // required for vendored-openssl feature

#[doc(inline)]
pub use crate::{
    client::{
        Client, ClientBuilder, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_REDIRECTS,
        DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, resolve,
    },
    link::{is_valid, is_valid_value, normalize, normalize_value},
    types::{ErrorKind, FetchOutcome, Probe, Reachability, Result, UrlInfo},
};
