// Youless HTTP client
//
// Wraps `reqwest::Client` with the device's method-code URL scheme and the
// session state machine: log in through the raw handshake when a password
// is configured, attach the session cookie, and re-authenticate exactly
// once when the device answers 403. Endpoint methods (status, usage) live
// in separate modules as inherent methods.

use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{Credentials, SessionCookie, SessionState};
use crate::error::Error;
use crate::handshake;
use crate::transport::TransportConfig;

/// Data requests a password-protected session may send per call: the
/// original attempt plus one after a forced re-authentication.
const MAX_ATTEMPTS: u32 = 2;

/// Result of a single round trip on the data path.
enum Outcome {
    Body(Bytes),
    Forbidden,
}

/// Client for one Youless device.
///
/// Owns one session. Calls may share the client; the session state sits
/// behind an async mutex held across the login handshake so concurrent
/// callers never log in twice at once.
pub struct YoulessClient {
    http: reqwest::Client,
    base_url: Url,
    host: String,
    port: u16,
    credentials: Credentials,
    timeout: Duration,
    state: Mutex<SessionState>,
}

impl YoulessClient {
    /// Create a client for `http://{host}:{port}/`.
    pub fn new(
        host: &str,
        port: u16,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, host, port, credentials, transport.timeout)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The login handshake still opens its own socket to `host:port`.
    pub fn with_client(
        http: reqwest::Client,
        host: &str,
        port: u16,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let host = host.trim();
        let base_url = Url::parse(&format!("http://{host}:{port}/"))?;
        Ok(Self {
            http,
            base_url,
            host: host.to_owned(),
            port,
            credentials,
            timeout,
            state: Mutex::new(SessionState::Unauthenticated),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Snapshot of the current session state.
    pub async fn session_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/{method}?{params}&f=j` -- `f=j` forces JSON output.
    fn method_url(&self, method: &str, params: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(method);
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("f", "j");
        url
    }

    // ── Request path ─────────────────────────────────────────────────

    /// Execute a device method and return the raw body.
    ///
    /// Without a password the request is sent bare and a 403 is terminal.
    /// With a password the session logs in first if needed; a 403 drops
    /// the session and the whole operation is retried once.
    pub async fn invoke(
        &self,
        method: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<Bytes, Error> {
        let url = self.method_url(method, params);

        let Some(password) = self.credentials.secret() else {
            debug!(%url, "executing unauthenticated request");
            return match self.send(url, None, cancel).await? {
                Outcome::Body(body) => Ok(body),
                Outcome::Forbidden => Err(Error::status(403)),
            };
        };

        for attempt in 1..=MAX_ATTEMPTS {
            let cookie = self.ensure_session(password, cancel).await?;
            debug!(%url, attempt, "executing authenticated request");

            match self.send(url.clone(), Some(&cookie), cancel).await? {
                Outcome::Body(body) => return Ok(body),
                Outcome::Forbidden => {
                    warn!(attempt, "device answered 403, dropping session");
                    self.invalidate(&cookie).await;
                }
            }
        }

        Err(Error::status(403))
    }

    /// Execute a device method and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<T, Error> {
        let body = self.invoke(method, params, cancel).await?;
        serde_json::from_slice(&body).map_err(|e| {
            let body = String::from_utf8_lossy(&body).into_owned();
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Return the current cookie, logging in first if unauthenticated.
    async fn ensure_session(
        &self,
        password: &SecretString,
        cancel: &CancellationToken,
    ) -> Result<SessionCookie, Error> {
        let mut state = self.state.lock().await;
        if let SessionState::Authenticated(cookie) = &*state {
            return Ok(cookie.clone());
        }

        debug!(host = %self.host, port = self.port, "logging in");
        let cookie = tokio::time::timeout(
            self.timeout,
            handshake::authenticate(&self.host, self.port, password, cancel),
        )
        .await
        .map_err(|_| Error::Timeout {
            timeout_secs: self.timeout.as_secs(),
        })??;

        *state = SessionState::Authenticated(cookie.clone());
        Ok(cookie)
    }

    /// Drop the session, unless another caller already replaced `stale`.
    async fn invalidate(&self, stale: &SessionCookie) {
        let mut state = self.state.lock().await;
        if state.cookie() == Some(stale) {
            *state = SessionState::Unauthenticated;
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::request(err)
        }
    }

    /// One GET round trip. 403 is reported as an outcome so the caller
    /// can decide about re-authentication; other failures are terminal.
    async fn send(
        &self,
        url: Url,
        cookie: Option<&SessionCookie>,
        cancel: &CancellationToken,
    ) -> Result<Outcome, Error> {
        let mut request = self.http.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie.header_value());
        }

        let resp = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            res = request.send() => res.map_err(|e| self.transport_error(e))?,
        };

        let status = resp.status();
        trace!(%status, "response received");

        if status == StatusCode::FORBIDDEN {
            return Ok(Outcome::Forbidden);
        }
        if !status.is_success() {
            return Err(Error::status(status.as_u16()));
        }

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            res = resp.bytes() => res.map_err(|e| self.transport_error(e))?,
        };
        Ok(Outcome::Body(body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> YoulessClient {
        YoulessClient::with_client(
            reqwest::Client::new(),
            "192.168.1.20",
            8080,
            Credentials::none(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn method_url_appends_json_format() {
        let url = client().method_url("V", &[("d", "3".into())]);
        assert_eq!(url.as_str(), "http://192.168.1.20:8080/V?d=3&f=j");
    }

    #[test]
    fn method_url_without_params() {
        let url = client().method_url("a", &[]);
        assert_eq!(url.as_str(), "http://192.168.1.20:8080/a?f=j");
    }

    #[test]
    fn empty_host_is_rejected() {
        let result = YoulessClient::with_client(
            reqwest::Client::new(),
            "  ",
            80,
            Credentials::none(),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn new_client_starts_unauthenticated() {
        assert_eq!(client().session_state().await, SessionState::Unauthenticated);
    }
}
