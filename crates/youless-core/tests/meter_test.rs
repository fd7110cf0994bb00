#![allow(clippy::unwrap_used)]
// End-to-end tests for `Meter` against a wiremock device.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use youless_core::{ConnectionStatus, CoreError, Meter, MeterConfig, UsageUnit};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Meter) {
    let server = MockServer::start().await;
    let meter = Meter::new(config(&server)).unwrap();
    (server, meter)
}

fn config(server: &MockServer) -> MeterConfig {
    let addr = server.address();
    MeterConfig::new(addr.ip().to_string()).with_port(addr.port())
}

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2014, 1, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn values(count: usize, base: i64) -> Vec<serde_json::Value> {
    let mut vals: Vec<_> = (0..count)
        .map(|i| json!((base + i64::try_from(i).unwrap()).to_string()))
        .collect();
    vals.push(serde_json::Value::Null);
    vals
}

async fn mount_window(server: &MockServer, param: &str, index: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/V"))
        .and(query_param(param, index))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_is_translated() {
    let (server, meter) = setup().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cnt": " 14567,580", "pwr": 443, "lvl": 0,
            "dev": "", "con": "OK", "sts": "(45)"
        })))
        .mount(&server)
        .await;

    let status = meter.status(&CancellationToken::new()).await.unwrap();

    assert_eq!(status.connection, ConnectionStatus::Success);
    assert_eq!(status.power_watts, 443);
    assert_eq!(status.level, None);
    assert_eq!(status.deviation_percent, None);
    assert_eq!(status.next_update_secs, Some(45));
    assert!((status.total_kwh - 14_567.58).abs() < 1e-9);
}

#[tokio::test]
async fn test_unparseable_counter_surfaces_data_format() {
    let (server, meter) = setup().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cnt": "n/a", "pwr": 0
        })))
        .mount(&server)
        .await;

    let err = meter.status(&CancellationToken::new()).await.unwrap_err();

    match err {
        CoreError::DataFormat { field, value } => {
            assert_eq!(field, "cnt");
            assert_eq!(value, "n/a");
        }
        other => panic!("expected DataFormat, got {other:?}"),
    }
}

// ── Composite windows ───────────────────────────────────────────────

#[tokio::test]
async fn test_last_hour_merges_both_halves() {
    let (server, meter) = setup().await;

    // The device lists the older half under h=2.
    mount_window(&server, "h", "1", json!({
        "un": "watt", "tm": "2014-01-26T08:30:00", "dt": 60, "val": values(30, 100)
    }))
    .await;
    mount_window(&server, "h", "2", json!({
        "un": "watt", "tm": "2014-01-26T08:00:00", "dt": 60, "val": values(30, 0)
    }))
    .await;

    let block = meter.last_hour(&CancellationToken::new()).await.unwrap();

    assert_eq!(block.unit(), UsageUnit::Watt);
    assert_eq!(block.len(), 60);
    assert_eq!(block.start(), at(26, 8, 0));
    let first = block.measurements().first().unwrap();
    let last = block.measurements().last().unwrap();
    assert_eq!((first.timestamp, first.value), (at(26, 8, 0), 0));
    assert_eq!((last.timestamp, last.value), (at(26, 8, 59), 129));
}

#[tokio::test]
async fn test_last_day_has_144_readings() {
    let (server, meter) = setup().await;

    mount_window(&server, "w", "1", json!({
        "un": "watt", "tm": "2014-01-25T16:00:00", "dt": 600, "val": values(48, 0)
    }))
    .await;
    mount_window(&server, "w", "2", json!({
        "un": "watt", "tm": "2014-01-26T00:00:00", "dt": 600, "val": values(48, 48)
    }))
    .await;
    mount_window(&server, "w", "3", json!({
        "un": "watt", "tm": "2014-01-26T08:00:00", "dt": 600, "val": values(48, 96)
    }))
    .await;

    let block = meter.last_day(&CancellationToken::new()).await.unwrap();

    assert_eq!(block.len(), 144);
    assert_eq!(block.start(), at(25, 16, 0));
    assert_eq!(block.interval_secs(), 600);
    let ordered: Vec<_> = block.measurements().iter().map(|m| m.value).collect();
    assert_eq!(ordered, (0..144).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_composite_rejects_unit_mismatch() {
    let (server, meter) = setup().await;

    mount_window(&server, "h", "1", json!({
        "un": "watt", "tm": "2014-01-26T08:30:00", "dt": 60, "val": values(2, 0)
    }))
    .await;
    mount_window(&server, "h", "2", json!({
        "un": "kwh", "tm": "2014-01-26T08:00:00", "dt": 60, "val": values(2, 0)
    }))
    .await;

    let err = meter.last_hour(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, CoreError::Operation { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_concurrent_windows_share_one_login() {
    let server = MockServer::start().await;
    let meter = Meter::new(
        config(&server).with_password(SecretString::from("secret".to_owned())),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/L"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "sess=1"))
        .expect(1)
        .mount(&server)
        .await;
    mount_window(&server, "h", "1", json!({
        "un": "watt", "tm": "2014-01-26T08:30:00", "dt": 60, "val": values(1, 0)
    }))
    .await;
    mount_window(&server, "h", "2", json!({
        "un": "watt", "tm": "2014-01-26T08:00:00", "dt": 60, "val": values(1, 0)
    }))
    .await;

    let block = meter.last_hour(&CancellationToken::new()).await.unwrap();

    assert_eq!(block.len(), 2);
}

// ── Validation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_out_of_range_index_is_validation_error() {
    let (_server, meter) = setup().await;
    let cancel = CancellationToken::new();

    assert!(matches!(
        meter.day(7, &cancel).await,
        Err(CoreError::Validation { .. })
    ));
    assert!(matches!(
        meter.month(0, &cancel).await,
        Err(CoreError::Validation { .. })
    ));
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_closed_meter_is_disposed() {
    let (server, meter) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    meter.close();
    meter.close();

    assert!(meter.is_closed());
    let err = meter.status(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, CoreError::Disposed), "got: {err:?}");
}

#[tokio::test]
async fn test_close_aborts_in_flight_operation() {
    let (server, meter) = setup().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"cnt": "1,0", "pwr": 1}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let pending = meter.clone();
    let task = tokio::spawn(async move { pending.status(&CancellationToken::new()).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    meter.close();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(CoreError::Disposed)), "got: {result:?}");
}

#[tokio::test]
async fn test_caller_cancellation() {
    let (_server, meter) = setup().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = meter.status(&cancel).await.unwrap_err();

    assert!(matches!(err, CoreError::Cancelled), "got: {err:?}");
}

#[tokio::test]
async fn test_oneshot_closes_meter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cnt": "2,5", "pwr": 7})))
        .mount(&server)
        .await;

    let mut kept = None;
    let power = Meter::oneshot(config(&server), |meter| {
        kept = Some(meter.clone());
        async move { meter.status(&CancellationToken::new()).await.map(|s| s.power_watts) }
    })
    .await
    .unwrap();

    assert_eq!(power, 7);
    assert!(kept.unwrap().is_closed());
}
