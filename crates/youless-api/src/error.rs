use thiserror::Error;

/// Top-level error type for the `youless-api` crate.
///
/// Covers the raw login handshake, the data request path and payload
/// decoding. `youless-core` maps these into domain diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// Network or connect failure, or a malformed low-level response
    /// (e.g. a `Set-Cookie` header without `name=value`).
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The device rejected the password or granted no session.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Requests ────────────────────────────────────────────────────
    /// Non-success HTTP outcome after any applicable retry, or a transport
    /// failure while sending (then `status` is usually `None`).
    #[error("Request failed ({})", describe_status(.status))]
    RequestFailed {
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// URL parsing error (bad host or port).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The exchange did not finish within the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// A measurement window index outside the range the device supports.
    #[error("Invalid {kind} window index {index} (expected {min}..={max})")]
    InvalidWindow {
        kind: &'static str,
        index: u8,
        min: u8,
        max: u8,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Lifecycle ───────────────────────────────────────────────────
    /// The caller's cancellation token fired before the exchange finished.
    #[error("Operation cancelled")]
    Cancelled,
}

#[allow(clippy::ref_option)]
fn describe_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_owned(), |code| format!("HTTP {code}"))
}

impl Error {
    /// Wrap a reqwest send/read failure, keeping the status if one was seen.
    pub(crate) fn request(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            source: Some(err),
        }
    }

    /// A terminal HTTP status without an underlying transport cause.
    pub(crate) fn status(code: u16) -> Self {
        Self::RequestFailed {
            status: Some(code),
            source: None,
        }
    }

    /// The HTTP status code carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if the device answered 403.
    pub fn is_forbidden(&self) -> bool {
        self.http_status() == Some(403)
    }
}
