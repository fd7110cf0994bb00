//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use youless_config::ConfigError;
use youless_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const DATA_FORMAT: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the meter: {message}")]
    #[diagnostic(
        code(youless::connection_failed),
        help(
            "Check that the meter is powered and on the same network.\n\
             Try: youless status --host <ip> --port 80"
        )
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(youless::timeout),
        help("Increase the timeout with --timeout or check the meter's Wi-Fi signal.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(youless::auth_failed),
        help(
            "Verify the meter password.\n\
             Pass it with --password, set YOULESS_PASSWORD, or store it in the\n\
             system keyring under service 'youless', account '<profile>/password'."
        )
    )]
    AuthFailed { message: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("The meter does not support this request (HTTP 404)")]
    #[diagnostic(
        code(youless::unsupported),
        help("Older firmware lacks some history windows. Check the firmware version.")
    )]
    Unsupported,

    #[error("{message}")]
    #[diagnostic(code(youless::request_failed))]
    RequestFailed { message: String },

    #[error("Could not parse '{value}' as {field}")]
    #[diagnostic(
        code(youless::data_format),
        help("The meter sent a value in an unexpected format. Re-run with -vv for details.")
    )]
    DataFormat { field: String, value: String },

    #[error("{message}")]
    #[diagnostic(code(youless::operation))]
    Operation { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(youless::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(youless::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No meter configured")]
    #[diagnostic(
        code(youless::no_config),
        help(
            "Pass --host <ip>, set YOULESS_HOST, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(youless::config))]
    Config(Box<ConfigError>),

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Interrupted")]
    #[diagnostic(code(youless::cancelled))]
    Cancelled,

    // ── Output ───────────────────────────────────────────────────────
    #[error("Could not render output: {message}")]
    #[diagnostic(code(youless::render))]
    Render { message: String },
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::DataFormat { .. } => exit_code::DATA_FORMAT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

/// Join an error and its sources: `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { message } => CliError::ConnectionFailed { message },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::RequestFailed {
                status: Some(403), ..
            } => CliError::AuthFailed {
                message: "the meter refused the session (HTTP 403)".into(),
            },

            CoreError::RequestFailed {
                status: Some(404), ..
            } => CliError::Unsupported,

            // No HTTP status at all: the request never got an answer.
            CoreError::RequestFailed { status: None, .. } => CliError::ConnectionFailed {
                message: error_chain(&err),
            },

            CoreError::RequestFailed { .. } => CliError::RequestFailed {
                message: error_chain(&err),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::DataFormat { field, value } => CliError::DataFormat { field, value },

            CoreError::Operation { message } => CliError::Operation { message },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "host".into(),
                reason: message,
            },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::Disposed => CliError::Operation {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    message: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::AuthenticationFailed {
                    message: "no cookie".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::RequestFailed {
                    status: Some(403),
                    source: None,
                },
                exit_code::AUTH,
            ),
            (
                CoreError::RequestFailed {
                    status: Some(500),
                    source: None,
                },
                exit_code::GENERAL,
            ),
            (
                CoreError::RequestFailed {
                    status: None,
                    source: None,
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 10 }, exit_code::TIMEOUT),
            (
                CoreError::DataFormat {
                    field: "cnt".into(),
                    value: "x".into(),
                },
                exit_code::DATA_FORMAT,
            ),
            (
                CoreError::Validation {
                    message: "index".into(),
                },
                exit_code::USAGE,
            ),
            (CoreError::Cancelled, exit_code::CANCELLED),
        ];

        for (core, expected) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), expected, "{label}");
        }
    }
}
