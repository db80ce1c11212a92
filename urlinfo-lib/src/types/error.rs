use thiserror::Error;

/// Possible errors when interacting with `urlinfo_lib`
///
/// None of these describe the resource behind a link. Unreachable hosts,
/// error statuses and oversized bodies are reported through
/// [`UrlInfo`](crate::UrlInfo) instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The given header could not be parsed.
    /// A possible error when converting a `HeaderValue` from a string or byte
    /// slice.
    #[error("Header could not be parsed.")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    /// The request client cannot be created
    #[error("Error creating request client: {0}")]
    BuildRequestClient(#[source] reqwest::Error),
    /// A link passed validation but could not be parsed afterwards
    #[error("Cannot parse {0} as website url: {1}")]
    InvalidUrl(String, #[source] url::ParseError),
    /// The metadata extraction task did not run to completion
    #[error("Metadata extraction failed unexpectedly: {0}")]
    Extraction(#[from] tokio::task::JoinError),
}

impl ErrorKind {
    /// Return more details about the error (if any)
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            ErrorKind::BuildRequestClient(e) => Some(crate::utils::reqwest::analyze_error_chain(e)),
            ErrorKind::InvalidUrl(_, e) => Some(e.to_string()),
            ErrorKind::Extraction(e) if e.is_panic() => {
                Some("The HTML extractor panicked".to_string())
            }
            ErrorKind::Extraction(_) => Some("The HTML extractor was cancelled".to_string()),
            ErrorKind::InvalidHeader(_) => {
                Some("Header values may only contain visible ASCII characters".to_string())
            }
        }
    }
}
