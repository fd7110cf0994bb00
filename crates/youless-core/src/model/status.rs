// ── Live meter status ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state of the meter's link to the online service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// The device did not report a connection field.
    #[default]
    Unknown,
    Success,
    Failure,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Success => "ok",
            Self::Failure => "failure",
        })
    }
}

/// A snapshot of the meter's live readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub connection: ConnectionStatus,
    /// Current power draw in watts.
    pub power_watts: i64,
    /// Moving average reflection level. `None` on digital sensors.
    pub level: Option<i64>,
    /// Reflection deviation in percent, when reported.
    pub deviation_percent: Option<i64>,
    /// Meter total in kWh.
    pub total_kwh: f64,
    /// Seconds until the next upload to the online service.
    pub next_update_secs: Option<i64>,
}
