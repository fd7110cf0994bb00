// ── Wire-to-domain conversions ──
//
// Turns `youless_api` raw records into validated `model` values. The
// firmware writes the counter with a comma decimal, groups history values
// with commas and decorates some status fields for display; all of that is
// undone here without consulting the host locale. Anything that does not parse is a
// `CoreError::DataFormat` naming the wire field and the raw text.

use chrono::NaiveDateTime;

use youless_api::{RawStatus, RawUsage};

use crate::error::CoreError;
use crate::model::{ConnectionStatus, Status, UsageBlock, UsageUnit};

/// Timestamp layout of the `tm` field.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// HTML entity some firmware puts in front of the deviation.
const PLUS_MINUS_ENTITY: &str = "&plusmn;";

// ── Helpers ────────────────────────────────────────────────────────

fn parse_unit(raw: Option<&str>) -> UsageUnit {
    match raw.map(str::trim) {
        Some(u) if u.eq_ignore_ascii_case("kwh") => UsageUnit::KilowattHour,
        Some(u) if u.eq_ignore_ascii_case("watt") => UsageUnit::Watt,
        _ => UsageUnit::Unknown,
    }
}

fn parse_connection(raw: Option<&str>) -> ConnectionStatus {
    match raw.map(str::trim) {
        None | Some("") => ConnectionStatus::Unknown,
        Some(c) if c.eq_ignore_ascii_case("ok") => ConnectionStatus::Success,
        Some(_) => ConnectionStatus::Failure,
    }
}

/// Parse the total counter, e.g. `" 14567,580"`.
///
/// A single `,` separates the fraction. No grouping and no sign; the device
/// pads the value with spaces, which are ignored.
fn parse_comma_decimal(field: &str, raw: &str) -> Result<f64, CoreError> {
    let text = raw.trim();
    let (int_part, fraction) = text.split_once(',').unwrap_or((text, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let has_digits = !(int_part.is_empty() && fraction.is_empty());
    if !has_digits || !all_digits(int_part) || !all_digits(fraction) {
        return Err(CoreError::data_format(field, raw));
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    format!("{int_part}.{fraction}0")
        .parse()
        .map_err(|_| CoreError::data_format(field, raw))
}

/// Parse a measurement value such as `" 9,460"`, where `,` groups thousands.
fn parse_grouped_integer(field: &str, raw: &str) -> Result<i64, CoreError> {
    let text = raw.trim();
    let well_formed = !text.is_empty()
        && text.split(',').all(|group| {
            !group.is_empty() && group.chars().all(|c| c.is_ascii_digit())
        });
    if !well_formed {
        return Err(CoreError::data_format(field, raw));
    }

    text.replace(',', "")
        .parse()
        .map_err(|_| CoreError::data_format(field, raw))
}

fn parse_local_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, CoreError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| CoreError::data_format(field, raw))
}

/// Parse a decorated status extra such as `"(&plusmn;3%)"` or `"(45)"`.
fn parse_extra(field: &str, raw: Option<&str>) -> Result<Option<i64>, CoreError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let stripped = raw
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .replace(PLUS_MINUS_ENTITY, "")
        .replace('±', "");
    let stripped = stripped.trim();
    let stripped = stripped.strip_suffix('%').unwrap_or(stripped).trim();

    if stripped.is_empty() {
        return Ok(None);
    }
    stripped
        .parse()
        .map(Some)
        .map_err(|_| CoreError::data_format(field, raw))
}

// ── Status ─────────────────────────────────────────────────────────

/// Translate the status record.
pub fn translate_status(raw: RawStatus) -> Result<Status, CoreError> {
    let total_kwh = parse_comma_decimal("cnt", raw.cnt.as_deref().unwrap_or_default())?;

    Ok(Status {
        connection: parse_connection(raw.conn.as_deref()),
        power_watts: raw.pwr,
        // Digital sensors report level 0; there is no reflection to measure.
        level: raw.lvl.filter(|lvl| *lvl != 0),
        deviation_percent: parse_extra("dev", raw.dev.as_deref())?,
        total_kwh,
        next_update_secs: parse_extra("sts", raw.sts.as_deref())?,
    })
}

impl TryFrom<RawStatus> for Status {
    type Error = CoreError;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        translate_status(raw)
    }
}

// ── Usage ──────────────────────────────────────────────────────────

/// Translate one usage history record.
///
/// The final `val` entry is a sentinel and never becomes a measurement.
pub fn translate_usage(raw: RawUsage) -> Result<UsageBlock, CoreError> {
    let unit = parse_unit(raw.un.as_deref());
    let start = parse_local_timestamp("tm", raw.tm.as_deref().unwrap_or_default())?;

    let mut entries = raw.val;
    entries.pop();

    let values = entries
        .iter()
        .map(|entry| match entry {
            Some(text) => parse_grouped_integer("val", text),
            None => Err(CoreError::data_format("val", "null")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !values.is_empty() && raw.dt <= 0 {
        return Err(CoreError::data_format("dt", raw.dt.to_string()));
    }

    UsageBlock::from_values(unit, start, raw.dt, values)
}

impl TryFrom<RawUsage> for UsageBlock {
    type Error = CoreError;

    fn try_from(raw: RawUsage) -> Result<Self, Self::Error> {
        translate_usage(raw)
    }
}
