use std::fmt;

use secrecy::SecretString;

/// Credentials for authenticating with a Youless device.
///
/// The device only knows a password. Without one the session never
/// authenticates and every request is sent bare.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    password: Option<SecretString>,
}

impl Credentials {
    /// No password configured -- requests are sent unauthenticated.
    pub fn none() -> Self {
        Self { password: None }
    }

    /// Password-protected device. An empty password counts as none.
    pub fn password(password: SecretString) -> Self {
        use secrecy::ExposeSecret;

        if password.expose_secret().is_empty() {
            Self::none()
        } else {
            Self {
                password: Some(password),
            }
        }
    }

    /// The configured password, if any.
    pub fn secret(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// Whether a password is configured.
    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }
}

impl From<Option<SecretString>> for Credentials {
    fn from(password: Option<SecretString>) -> Self {
        password.map_or_else(Self::none, Self::password)
    }
}

/// Session cookie granted by the device after a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    /// Render as a `Cookie` request header value (`name=value`).
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

// The value is a bearer credential; keep it out of logs.
impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Authentication state of one device session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(SessionCookie),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The stored cookie while authenticated.
    pub fn cookie(&self) -> Option<&SessionCookie> {
        match self {
            Self::Authenticated(cookie) => Some(cookie),
            Self::Unauthenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_means_no_credentials() {
        let creds = Credentials::password(SecretString::from(String::new()));
        assert!(!creds.is_configured());

        let creds = Credentials::from(Some(SecretString::from("hunter2".to_owned())));
        assert!(creds.is_configured());
    }

    #[test]
    fn cookie_debug_hides_value() {
        let cookie = SessionCookie {
            name: "tk".into(),
            value: "abc123".into(),
        };
        let rendered = format!("{cookie:?}");
        assert!(rendered.contains("tk"));
        assert!(!rendered.contains("abc123"));
        assert_eq!(cookie.header_value(), "tk=abc123");
    }
}
