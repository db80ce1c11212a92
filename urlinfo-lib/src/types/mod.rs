#![allow(unreachable_pub)]

mod error;
mod info;
mod probe;

pub use error::ErrorKind;
pub use info::UrlInfo;
pub use probe::{FetchOutcome, Probe, Reachability};

/// The urlinfo `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
