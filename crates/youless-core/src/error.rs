// ── Core error types ──
//
// Domain-facing errors from youless-core. Consumers see what went wrong
// with the device (bad credentials, firmware sent an unparseable value)
// rather than raw reqwest or serde failures. The `From<youless_api::Error>`
// impl translates transport-layer errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the meter: {message}")]
    ConnectionFailed { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to the meter failed{}", describe_status(.status))]
    RequestFailed {
        status: Option<u16>,
        #[source]
        source: Option<youless_api::Error>,
    },

    #[error("Meter did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    /// The payload did not match the expected shape. Carries the wire field
    /// and the offending raw value to diagnose firmware quirks.
    #[error("Could not parse '{value}' as {field}")]
    DataFormat { field: String, value: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// A caller-level precondition was violated (e.g. merging blocks
    /// measured in different units).
    #[error("Operation failed: {message}")]
    Operation { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Meter client has been closed")]
    Disposed,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

#[allow(clippy::ref_option)]
fn describe_status(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" with HTTP {s}"))
}

impl CoreError {
    pub(crate) fn data_format(field: &str, value: impl Into<String>) -> Self {
        Self::DataFormat {
            field: field.to_owned(),
            value: value.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<youless_api::Error> for CoreError {
    fn from(err: youless_api::Error) -> Self {
        match err {
            youless_api::Error::Connection { message, source } => CoreError::ConnectionFailed {
                message: match source {
                    Some(io) => format!("{message}: {io}"),
                    None => message,
                },
            },
            youless_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            youless_api::Error::RequestFailed { status, .. } => CoreError::RequestFailed {
                status,
                source: Some(err),
            },
            youless_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid meter address: {e}"),
            },
            youless_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            youless_api::Error::InvalidWindow { .. } => CoreError::Validation {
                message: err.to_string(),
            },
            youless_api::Error::Deserialization { message, .. } => CoreError::DataFormat {
                field: "response body".into(),
                value: message,
            },
            youless_api::Error::Cancelled => CoreError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_keeps_status() {
        let err = CoreError::from(youless_api::Error::RequestFailed {
            status: Some(403),
            source: None,
        });
        assert!(matches!(err, CoreError::RequestFailed { status: Some(403), .. }));
        assert_eq!(err.to_string(), "Request to the meter failed with HTTP 403");
    }

    #[test]
    fn cancellation_is_not_a_request_failure() {
        let err = CoreError::from(youless_api::Error::Cancelled);
        assert!(matches!(err, CoreError::Cancelled));
    }

    #[test]
    fn data_format_names_field_and_value() {
        let err = CoreError::data_format("cnt", "12.3.4");
        assert_eq!(err.to_string(), "Could not parse '12.3.4' as cnt");
    }
}
