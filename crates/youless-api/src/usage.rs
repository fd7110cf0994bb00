// Usage history endpoint
//
// One method (`V`) serves every history window; a single query parameter
// picks the window and its index.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::YoulessClient;
use crate::error::Error;
use crate::models::RawUsage;

/// Method code of the measurements page.
const USAGE_METHOD: &str = "V";

/// The history ranges the device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// 30-minute halves of the last hour, 60-second granularity (`h=1|2`).
    Hour,
    /// 8-hour blocks of the last day, 10-minute granularity (`w=1|2|3`).
    EightHours,
    /// A whole day, 0 = today, up to 6 days back (`d=0..6`).
    Day,
    /// A month by index (`m=1..12`).
    Month,
}

impl WindowKind {
    /// Query parameter name selecting this window.
    pub fn param(self) -> &'static str {
        match self {
            Self::Hour => "h",
            Self::EightHours => "w",
            Self::Day => "d",
            Self::Month => "m",
        }
    }

    /// Indices the device accepts for this window.
    pub fn range(self) -> RangeInclusive<u8> {
        match self {
            Self::Hour => 1..=2,
            Self::EightHours => 1..=3,
            Self::Day => 0..=6,
            Self::Month => 1..=12,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::EightHours => "eight-hours",
            Self::Day => "day",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated measurement window: kind plus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UsageWindow {
    kind: WindowKind,
    index: u8,
}

impl UsageWindow {
    pub fn new(kind: WindowKind, index: u8) -> Result<Self, Error> {
        let range = kind.range();
        if !range.contains(&index) {
            return Err(Error::InvalidWindow {
                kind: kind.name(),
                index,
                min: *range.start(),
                max: *range.end(),
            });
        }
        Ok(Self { kind, index })
    }

    pub fn hour(index: u8) -> Result<Self, Error> {
        Self::new(WindowKind::Hour, index)
    }

    pub fn eight_hours(index: u8) -> Result<Self, Error> {
        Self::new(WindowKind::EightHours, index)
    }

    pub fn day(index: u8) -> Result<Self, Error> {
        Self::new(WindowKind::Day, index)
    }

    pub fn month(index: u8) -> Result<Self, Error> {
        Self::new(WindowKind::Month, index)
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// The single query parameter selecting this window.
    pub fn query(&self) -> (&'static str, String) {
        (self.kind.param(), self.index.to_string())
    }
}

impl fmt::Display for UsageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.index)
    }
}

impl YoulessClient {
    /// Fetch one block of usage history.
    ///
    /// `GET /V?{h|w|d|m}={index}&f=j`
    pub async fn raw_usage(
        &self,
        window: UsageWindow,
        cancel: &CancellationToken,
    ) -> Result<RawUsage, Error> {
        debug!(%window, "fetching usage history");
        self.get_json(USAGE_METHOD, &[window.query()], cancel).await
    }
}
