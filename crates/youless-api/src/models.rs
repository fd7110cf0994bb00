// Raw wire records
//
// Shaped exactly like the device's JSON. Numeric and time fields that the
// firmware sends as locale-formatted strings stay strings here; turning
// them into domain values is `youless-core`'s job.

use serde::{Deserialize, Serialize};

/// Response of the status method (`/a?f=j`).
///
/// ```json
/// {"cnt":" 14567,580","pwr":443,"lvl":87,"dev":"(&plusmn;1%)","det":"","con":"OK","sts":"(45)","raw":0}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawStatus {
    /// Connection to the online service: `"OK"` or an error text.
    /// Some firmware names this field `con`.
    #[serde(default, alias = "con")]
    pub conn: Option<String>,

    /// Total counter in kWh, comma as decimal separator.
    #[serde(default)]
    pub cnt: Option<String>,

    /// Reflection deviation, e.g. `"(&plusmn;1%)"`, or empty.
    #[serde(default)]
    pub dev: Option<String>,

    /// Seconds until the next online update, e.g. `"(45)"`, or empty.
    #[serde(default)]
    pub sts: Option<String>,

    /// Current power in watts.
    #[serde(default)]
    pub pwr: i64,

    /// Moving average reflection level; 0 on digital sensors.
    #[serde(default)]
    pub lvl: Option<i64>,
}

/// Response of the usage history method (`/V?<window>&f=j`).
///
/// ```json
/// {"un":"kWh","tm":"2014-01-26T00:00:00","dt":600,"val":["10","11","12",null]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawUsage {
    /// Unit: `"kWh"` or `"watt"`.
    #[serde(default)]
    pub un: Option<String>,

    /// Start of the block, `yyyy-MM-ddTHH:mm:ss` in device-local time.
    #[serde(default)]
    pub tm: Option<String>,

    /// Seconds between consecutive values.
    #[serde(default)]
    pub dt: i64,

    /// Values as strings; the last entry is a sentinel (usually `null`).
    #[serde(default)]
    pub val: Vec<Option<String>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn raw_status_accepts_con_alias() {
        let raw: RawStatus = serde_json::from_str(
            r#"{"cnt":" 14567,580","pwr":443,"lvl":0,"dev":"","det":"","con":"OK","sts":"(45)","raw":0}"#,
        )
        .unwrap();
        assert_eq!(raw.conn.as_deref(), Some("OK"));
        assert_eq!(raw.cnt.as_deref(), Some(" 14567,580"));
        assert_eq!(raw.pwr, 443);
        assert_eq!(raw.lvl, Some(0));
        assert_eq!(raw.sts.as_deref(), Some("(45)"));
    }

    #[test]
    fn raw_usage_keeps_null_sentinel() {
        let raw: RawUsage = serde_json::from_str(
            r#"{"un":"kWh","tm":"2014-01-26T00:00:00","dt":600,"val":["10","11","12",null]}"#,
        )
        .unwrap();
        assert_eq!(raw.dt, 600);
        assert_eq!(raw.val.len(), 4);
        assert_eq!(raw.val[3], None);
    }
}
