// Shared transport configuration for building the reqwest::Client that
// talks to the device's data endpoints. The login handshake does not go
// through here; it drives its own socket (see `handshake`).

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::error::Error;

const USER_AGENT: &str = concat!("youless-rs/", env!("CARGO_PKG_VERSION"));

/// Transport settings for the data request path.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. Also bounds the login handshake.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// Redirects are never followed: the device answers 302 on some paths
    /// and the session logic must see that status itself.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|e| Error::Connection {
                message: format!("failed to build HTTP client: {e}"),
                source: None,
            })
    }
}
