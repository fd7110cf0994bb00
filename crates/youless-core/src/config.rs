// ── Runtime meter configuration ──
//
// Describes how to reach one meter. Carries the password but never touches
// disk; `youless-config` or the caller builds a `MeterConfig` and hands it
// to `Meter::new`.

use std::time::Duration;

use secrecy::SecretString;

/// Port the device's web server listens on out of the box.
pub const DEFAULT_PORT: u16 = 80;

/// Default per-request timeout, also applied to the login handshake.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a single meter.
#[derive(Debug, Clone)]
pub struct MeterConfig {
    /// Hostname or IP address of the device.
    pub host: String,
    pub port: u16,
    /// Login password. `None` (or empty) sends every request unauthenticated.
    pub password: Option<SecretString>,
    pub timeout: Duration,
}

impl MeterConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = MeterConfig::new("192.168.1.20");
        assert_eq!(config.port, 80);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.password.is_none());

        let config = config
            .with_port(8080)
            .with_timeout(Duration::from_secs(3))
            .with_password(SecretString::from("pw".to_owned()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.password.is_some());
    }
}
