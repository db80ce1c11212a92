use std::fmt::Display;

use http::StatusCode;
use url::Url;

/// Outcome of the metadata-only request sent to a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reachability {
    /// The server answered with a non-error status.
    ///
    /// This includes informational and redirection codes, e.g. when the
    /// redirect limit was hit or a `3xx` came without a `Location` header.
    Success(StatusCode),
    /// The server answered with a `4xx` status
    ClientError(StatusCode),
    /// The server answered with a `5xx` status
    ServerError(StatusCode),
    /// No HTTP response was received: the connection was refused or reset,
    /// the TLS handshake failed or the request timed out
    ConnectionFailure(String),
    /// The host name could not be resolved
    UnresolvedHost(String),
}

impl Reachability {
    /// Classify a received HTTP status code
    #[must_use]
    pub fn from_status(code: StatusCode) -> Self {
        if code.is_client_error() {
            Self::ClientError(code)
        } else if code.is_server_error() {
            Self::ServerError(code)
        } else {
            Self::Success(code)
        }
    }

    /// Returns `true` if any HTTP response was received, whatever its status
    #[inline]
    #[must_use]
    pub const fn is_web_resource(&self) -> bool {
        matches!(
            self,
            Self::Success(_) | Self::ClientError(_) | Self::ServerError(_)
        )
    }

    /// The status code of the response, if there was one
    #[must_use]
    pub const fn code(&self) -> Option<StatusCode> {
        match self {
            Self::Success(code) | Self::ClientError(code) | Self::ServerError(code) => Some(*code),
            Self::ConnectionFailure(_) | Self::UnresolvedHost(_) => None,
        }
    }
}

impl Display for Reachability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(code) | Self::ClientError(code) | Self::ServerError(code) => {
                write!(f, "{code}")
            }
            Self::ConnectionFailure(reason) => write!(f, "Connection failed: {reason}"),
            Self::UnresolvedHost(reason) => write!(f, "Unresolved host: {reason}"),
        }
    }
}

/// What the probe learned about a link before any body was downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// URL the probe ended up at, after following redirects
    pub url: Url,
    /// Whether and how the server answered
    pub reachability: Reachability,
    /// Value of the `Content-Type` header
    pub mime: Option<String>,
    /// Value of the `Content-Length` header
    pub content_length: Option<u64>,
}

impl Probe {
    /// A probe which never received a response
    #[must_use]
    pub fn unreachable(url: Url, reachability: Reachability) -> Self {
        Self {
            url,
            reachability,
            mime: None,
            content_length: None,
        }
    }

    /// Returns `true` if the declared length is known and above `limit`
    #[must_use]
    pub fn exceeds(&self, limit: u64) -> bool {
        self.content_length.is_some_and(|length| length > limit)
    }
}

/// Result of the size-capped body download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The complete body, which stayed within the ceiling
    Body {
        /// Raw body bytes
        bytes: Vec<u8>,
        /// URL the body was served from, after following redirects
        url: Url,
    },
    /// The body was larger than the ceiling and the transfer was aborted
    TooLarge,
    /// The body could not be downloaded
    Absent,
}
