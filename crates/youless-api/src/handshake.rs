// Raw login handshake
//
// The device answers a successful `GET /L?w=<password>` with a response
// that breaks HTTP framing, so reqwest cannot read it. This module drives
// the exchange by hand over a dedicated TCP connection and pulls the
// session cookie out of the header lines.

use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::auth::SessionCookie;
use crate::error::Error;

/// Status codes the device uses for a successful login.
const ACCEPTED_STATUS: [&str; 3] = ["200", "302", "307"];

/// Log in to the device at `host:port` and return the granted cookie.
///
/// Opens a fresh connection per call, writes the login request, reads
/// until the device closes the connection and parses the header lines.
/// The connection is dropped on every exit path, including cancellation.
pub async fn authenticate(
    host: &str,
    port: u16,
    password: &SecretString,
    cancel: &CancellationToken,
) -> Result<SessionCookie, Error> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    debug!(host, port, "opening login connection");

    let mut stream = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Error::Cancelled),
        res = TcpStream::connect((host, port)) => res.map_err(|e| Error::Connection {
            message: format!("could not connect to {host}:{port} to log in"),
            source: Some(e),
        })?,
    };

    let request = login_request(host, password);

    let response = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Error::Cancelled),
        res = exchange(&mut stream, &request) => res.map_err(|e| Error::Connection {
            message: "error while writing login request or reading its response".into(),
            source: Some(e),
        })?,
    };

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    trace!(bytes = response.len(), "login response received");
    let cookie = parse_handshake_response(&response)?;
    debug!(cookie = %cookie.name, "login accepted");
    Ok(cookie)
}

/// Build the login request. CRLF line endings, `Connection: close` so the
/// device ends the response by closing the socket.
fn login_request(host: &str, password: &SecretString) -> String {
    let encoded = urlencoding::encode(password.expose_secret());
    format!("GET /L?w={encoded} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n")
}

async fn exchange(stream: &mut TcpStream, request: &str) -> std::io::Result<String> {
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    // No Content-Length on the success path; read until EOF.
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Scan the raw login response for an accepted status and a session cookie.
///
/// Lines are examined in order. The device's status line is not well formed,
/// so any line mentioning `HTTP` counts as one and must carry 200, 302 or
/// 307 somewhere; otherwise the login failed. The first `Set-Cookie` wins.
pub fn parse_handshake_response(response: &str) -> Result<SessionCookie, Error> {
    for line in response.split("\r\n").filter(|l| !l.is_empty()) {
        if line.contains("HTTP") && !ACCEPTED_STATUS.iter().any(|code| line.contains(code)) {
            return Err(Error::Authentication {
                message: format!("device answered login with '{line}'"),
            });
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("set-cookie") {
            return parse_cookie(value);
        }
    }

    Err(Error::Authentication {
        message: "device did not provide a session cookie".into(),
    })
}

fn parse_cookie(raw: &str) -> Result<SessionCookie, Error> {
    let malformed = || Error::Connection {
        message: format!("unexpected cookie '{}' from device", raw.trim()),
        source: None,
    };

    // Attributes (`; Path=/`) are not part of the credential.
    let pair = raw.split_once(';').map_or(raw, |(pair, _)| pair);
    let (name, value) = pair.split_once('=').ok_or_else(malformed)?;
    let name = name.trim_matches(' ');
    let value = value.trim_matches(' ');
    if name.is_empty() || value.is_empty() {
        return Err(malformed());
    }

    let value = urlencoding::decode(value).map_err(|_| malformed())?;

    Ok(SessionCookie {
        name: name.to_owned(),
        value: value.into_owned(),
    })
}
