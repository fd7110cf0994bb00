// ── Usage history ──
//
// A block is one window of evenly spaced readings as the device reports
// it. Blocks measured in the same unit can be merged into a longer series.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Unit of a usage block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageUnit {
    #[default]
    Unknown,
    KilowattHour,
    Watt,
}

impl UsageUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Unknown => "?",
            Self::KilowattHour => "kWh",
            Self::Watt => "W",
        }
    }
}

impl fmt::Display for UsageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One reading in a usage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Wall-clock time on the device. The device carries no zone offset.
    pub timestamp: NaiveDateTime,
    pub value: i64,
}

impl Measurement {
    /// The timestamp interpreted in the host's local zone.
    ///
    /// `None` when the wall-clock time does not exist locally (a DST gap).
    /// On a DST overlap the earlier instant is picked.
    pub fn local_timestamp(&self) -> Option<DateTime<Local>> {
        Local.from_local_datetime(&self.timestamp).earliest()
    }
}

/// A time-ordered run of readings in one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageBlock {
    unit: UsageUnit,
    start: NaiveDateTime,
    interval_secs: i64,
    measurements: Vec<Measurement>,
}

impl UsageBlock {
    /// Build a block whose i-th value is stamped `start + i * interval_secs`.
    pub fn from_values(
        unit: UsageUnit,
        start: NaiveDateTime,
        interval_secs: i64,
        values: impl IntoIterator<Item = i64>,
    ) -> Result<Self, CoreError> {
        let values: Vec<i64> = values.into_iter().collect();
        if !values.is_empty() && interval_secs <= 0 {
            return Err(CoreError::Validation {
                message: format!("measurement interval must be positive, got {interval_secs}s"),
            });
        }

        let mut measurements = Vec::with_capacity(values.len());
        let mut timestamp = start;
        for value in values {
            measurements.push(Measurement { timestamp, value });
            timestamp = TimeDelta::try_seconds(interval_secs)
                .and_then(|step| timestamp.checked_add_signed(step))
                .ok_or_else(|| CoreError::Validation {
                    message: format!("measurement timestamps overflow after {timestamp}"),
                })?;
        }

        Ok(Self {
            unit,
            start,
            interval_secs,
            measurements,
        })
    }

    pub fn unit(&self) -> UsageUnit {
        self.unit
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Seconds between consecutive readings.
    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Combine two blocks into one series.
    ///
    /// The block with the earlier start comes first (ties keep `self`
    /// first) and the other's readings are appended after it. Overlapping
    /// readings are kept as-is; nothing is de-duplicated or re-sorted.
    pub fn merge(&self, other: &UsageBlock) -> Result<UsageBlock, CoreError> {
        if self.unit != other.unit {
            return Err(CoreError::Operation {
                message: format!(
                    "cannot merge usage measured in {} with usage measured in {}",
                    self.unit, other.unit
                ),
            });
        }

        let (first, second) = if other.start < self.start {
            (other, self)
        } else {
            (self, other)
        };

        let mut measurements = Vec::with_capacity(first.len() + second.len());
        measurements.extend_from_slice(&first.measurements);
        measurements.extend_from_slice(&second.measurements);

        Ok(UsageBlock {
            unit: first.unit,
            start: first.start,
            interval_secs: first.interval_secs,
            measurements,
        })
    }

    /// Fold any number of blocks with [`merge`](Self::merge).
    ///
    /// Returns `None` for an empty input.
    pub fn merge_all<I>(blocks: I) -> Result<Option<UsageBlock>, CoreError>
    where
        I: IntoIterator<Item = UsageBlock>,
    {
        let mut blocks = blocks.into_iter();
        let Some(mut merged) = blocks.next() else {
            return Ok(None);
        };
        for block in blocks {
            merged = merged.merge(&block)?;
        }
        Ok(Some(merged))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 1, 26)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn block(unit: UsageUnit, start: NaiveDateTime, values: &[i64]) -> UsageBlock {
        UsageBlock::from_values(unit, start, 60, values.iter().copied()).unwrap()
    }

    fn values(block: &UsageBlock) -> Vec<i64> {
        block.measurements().iter().map(|m| m.value).collect()
    }

    #[test]
    fn from_values_spaces_timestamps() {
        let b = UsageBlock::from_values(UsageUnit::KilowattHour, at(0, 0), 600, [10, 11, 12])
            .unwrap();
        let stamps: Vec<_> = b.measurements().iter().map(|m| m.timestamp).collect();
        assert_eq!(stamps, vec![at(0, 0), at(0, 10), at(0, 20)]);
    }

    #[test]
    fn from_values_rejects_non_positive_interval() {
        let result = UsageBlock::from_values(UsageUnit::Watt, at(0, 0), 0, [1]);
        assert!(matches!(result, Err(CoreError::Validation { .. })));

        // Nothing to space out: an empty block is fine.
        let empty = UsageBlock::from_values(UsageUnit::Watt, at(0, 0), 0, []).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn merge_puts_earlier_block_first() {
        let early = block(UsageUnit::Watt, at(8, 0), &[1, 2]);
        let late = block(UsageUnit::Watt, at(8, 30), &[3, 4]);

        let merged = late.merge(&early).unwrap();

        assert_eq!(merged.start(), at(8, 0));
        assert_eq!(values(&merged), vec![1, 2, 3, 4]);
        assert_eq!(merged.unit(), UsageUnit::Watt);
        assert_eq!(merged.interval_secs(), 60);
    }

    #[test]
    fn merge_keeps_overlap() {
        let a = block(UsageUnit::Watt, at(8, 0), &[1, 2, 3]);
        let b = block(UsageUnit::Watt, at(8, 1), &[20, 30]);

        let merged = a.merge(&b).unwrap();

        assert_eq!(merged.len(), 5);
        assert_eq!(values(&merged), vec![1, 2, 3, 20, 30]);
    }

    #[test]
    fn merge_rejects_unit_mismatch() {
        let kwh = block(UsageUnit::KilowattHour, at(0, 0), &[1]);
        let watt = block(UsageUnit::Watt, at(1, 0), &[2]);

        let err = kwh.merge(&watt).unwrap_err();

        assert!(matches!(err, CoreError::Operation { .. }));
        assert!(err.to_string().contains("kWh"));
    }

    #[test]
    fn merge_all_folds_in_order() {
        let blocks = vec![
            block(UsageUnit::Watt, at(16, 0), &[5, 6]),
            block(UsageUnit::Watt, at(0, 0), &[1, 2]),
            block(UsageUnit::Watt, at(8, 0), &[3, 4]),
        ];

        let merged = UsageBlock::merge_all(blocks).unwrap().unwrap();

        assert_eq!(merged.start(), at(0, 0));
        assert_eq!(values(&merged), vec![1, 2, 5, 6, 3, 4]);
        assert!(UsageBlock::merge_all(Vec::new()).unwrap().is_none());
    }

    #[test]
    fn local_timestamp_keeps_wall_clock() {
        let reading = Measurement {
            timestamp: at(12, 0),
            value: 1,
        };

        let local = reading.local_timestamp();

        assert_eq!(local.map(|dt| dt.naive_local()), Some(at(12, 0)));
    }
}
