use std::error::Error;

use crate::Reachability;

/// A rule for matching error message patterns to human-readable messages
struct ErrorRule {
    patterns: &'static [&'static str],
    message: &'static str,
}

impl ErrorRule {
    /// Create a new error rule
    const fn new(patterns: &'static [&'static str], message: &'static str) -> Self {
        Self { patterns, message }
    }

    /// Check if any of the patterns match the given text
    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| text.contains(pattern))
    }
}

/// A builder for creating and matching against multiple error rules
struct ErrorRules {
    rules: Vec<ErrorRule>,
}

impl ErrorRules {
    const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    fn rule(mut self, patterns: &'static [&'static str], message: &'static str) -> Self {
        self.rules.push(ErrorRule::new(patterns, message));
        self
    }

    /// Return the message of the first matching rule
    fn match_error(&self, error_msg: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(error_msg))
            .map(|rule| rule.message)
    }
}

const DNS_FAILURE: &str = "DNS resolution failed. Check hostname spelling and DNS settings";
const TIMEOUT: &str = "Request timed out. Try increasing timeout or check server status";

/// Patterns which identify a failed host lookup somewhere in the error chain.
///
/// `hyper-util` wraps resolver failures as `dns error`, the system resolver
/// reports the rest.
const DNS_PATTERNS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "nodename nor servname",
    "Name or service not known",
    "No address associated with hostname",
    "Temporary failure in name resolution",
];

fn network_rules() -> ErrorRules {
    ErrorRules::new()
        .rule(DNS_PATTERNS, DNS_FAILURE)
        .rule(
            &["certificate"],
            "SSL certificate error. Check certificate validity or allow insecure connections",
        )
        .rule(
            &["handshake", "TLS", "SSL"],
            "TLS handshake failed. Check SSL/TLS configuration",
        )
        .rule(
            &["Connection refused", "connection refused"],
            "Connection refused - server may be down or port blocked",
        )
        .rule(
            &["Connection reset", "connection reset"],
            "Connection reset by server. Server forcibly closed connection",
        )
        .rule(
            &["No route to host", "no route"],
            "No route to host. Check network routing or firewall configuration",
        )
        .rule(
            &["Network is unreachable", "network unreachable"],
            "Network unreachable. Check internet connection or VPN settings",
        )
        .rule(&["timed out", "timeout"], TIMEOUT)
}

/// Analyze the error chain of a reqwest error and return a concise, actionable message.
///
/// This walks the `source()` chain, since the interesting part (DNS, TLS,
/// refused connection) is usually buried a few levels below the outer
/// "error sending request" message.
pub(crate) fn analyze_error_chain(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return TIMEOUT.to_string();
    }
    if error.is_redirect() {
        return "Too many redirects - check for redirect loops".to_string();
    }

    // The outer message only repeats the URL, which may contain anything
    let rules = network_rules();
    let mut source: Option<&(dyn Error + 'static)> = error.source();
    while let Some(err) = source {
        if let Some(io_error) = err.downcast_ref::<std::io::Error>() {
            if let Some(message) = analyze_io_error(io_error) {
                return message.to_string();
            }
        }
        if let Some(message) = rules.match_error(&err.to_string()) {
            return message.to_string();
        }
        source = err.source();
    }

    fallback_reqwest_analysis(error)
}

/// Map a transport error onto the reachability of the link.
///
/// Every error ends up as either an unresolved host or a generic connection
/// failure, with the analyzed message attached.
pub(crate) fn classify(error: &reqwest::Error) -> Reachability {
    let message = analyze_error_chain(error);
    if message == DNS_FAILURE {
        Reachability::UnresolvedHost(message)
    } else {
        Reachability::ConnectionFailure(message)
    }
}

/// Analyze I/O errors with specific categorization
fn analyze_io_error(io_error: &std::io::Error) -> Option<&'static str> {
    match io_error.kind() {
        std::io::ErrorKind::ConnectionRefused => {
            Some("Connection refused - server may be down or port blocked")
        }
        std::io::ErrorKind::ConnectionReset => {
            Some("Connection reset by server. Server forcibly closed connection")
        }
        std::io::ErrorKind::TimedOut => Some(TIMEOUT),
        std::io::ErrorKind::NetworkUnreachable => {
            Some("Network unreachable. Check internet connection or VPN settings")
        }
        std::io::ErrorKind::UnexpectedEof => {
            Some("Connection closed unexpectedly. Server terminated early")
        }
        _ => None,
    }
}

/// Fallback analysis using basic reqwest error categorization
fn fallback_reqwest_analysis(error: &reqwest::Error) -> String {
    if error.is_connect() {
        "Connection failed. Check network connectivity and firewall settings".to_string()
    } else if error.is_body() {
        "Response body could not be read. Server closed the stream early".to_string()
    } else if error.is_decode() {
        "Response decoding failed. Server returned invalid data".to_string()
    } else {
        format!("Request failed: {error}")
    }
}
