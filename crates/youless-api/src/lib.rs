// youless-api: Async Rust client for the Youless energy meter
//
// Two request paths share one session: a raw TCP login handshake (the
// device's success response is not valid HTTP) and reqwest GETs against
// the short method-code JSON endpoints.

pub mod auth;
pub mod client;
pub mod error;
pub mod handshake;
pub mod models;
pub mod status;
pub mod transport;
pub mod usage;

pub use auth::{Credentials, SessionCookie, SessionState};
pub use client::YoulessClient;
pub use error::Error;
pub use models::{RawStatus, RawUsage};
pub use transport::TransportConfig;
pub use usage::{UsageWindow, WindowKind};
