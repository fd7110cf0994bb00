//! Domain layer between `youless-api` and its consumers.
//!
//! - **[`Meter`]**: facade owning one device session. Single-window reads
//!   ([`Meter::status`], [`Meter::usage`]) and composite windows
//!   ([`Meter::last_hour`], [`Meter::last_day`]) that fetch concurrently
//!   and merge.
//! - **[`convert`]**: translation of the device's locale-formatted wire
//!   records into validated values.
//! - **Domain model** ([`model`]): [`Status`], [`UsageBlock`] and friends.

pub mod config;
pub mod convert;
pub mod error;
pub mod meter;
pub mod model;

pub use config::MeterConfig;
pub use convert::{translate_status, translate_usage};
pub use error::CoreError;
pub use meter::Meter;
pub use model::{ConnectionStatus, Measurement, Status, UsageBlock, UsageUnit};

// Window selection is part of the public surface of `Meter::usage`.
pub use youless_api::{UsageWindow, WindowKind};
