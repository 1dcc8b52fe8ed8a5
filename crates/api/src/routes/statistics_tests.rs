//! Tests for the statistics routes against a mock store.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{NaiveDate, NaiveDateTime};
use declstat_core::reports::{
    FilterParams, OfficeCode, RecordFamily, ReportKind, ReportQueryBuilder, StatusSelector,
};
use declstat_core::window::{RangeOutcome, RangeValidator};
use declstat_db::executor::bind_named;
use declstat_shared::{AppError, ExportConfig, ReportingConfig};
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, Transaction, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

use crate::{AppState, ReportSettings, create_router};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

fn app(db: DatabaseConnection) -> Router {
    let settings = ReportSettings::from_config(&ReportingConfig::default(), &ExportConfig::default())
        .unwrap()
        .pinned_at(now());
    create_router(AppState {
        db: Arc::new(db),
        reporting: Arc::new(settings),
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Json) {
    let response = app
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

fn empty_mock() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn daily_rows(declarations: i64) -> Vec<BTreeMap<&'static str, Value>> {
    vec![
        BTreeMap::from([
            ("day", Value::from("2024-01-01")),
            ("declarations", Value::BigInt(Some(declarations))),
            ("total_value", Value::Decimal(None)),
        ]),
        BTreeMap::from([
            ("day", Value::from("subtotal")),
            ("declarations", Value::BigInt(Some(declarations))),
            ("total_value", Value::Decimal(None)),
        ]),
    ]
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(app(empty_mock()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["database"], "up");
}

#[test]
fn test_settings_reject_unknown_timezone() {
    let reporting = ReportingConfig {
        timezone: "Atlantis/Capital".to_string(),
        ..ReportingConfig::default()
    };
    let err = ReportSettings::from_config(&reporting, &ExportConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, AppError::Configuration(message) if message.contains("Atlantis")));
}

// ============================================================================
// Daily volume
// ============================================================================

#[tokio::test]
async fn test_daily_volume_without_range_shows_default_window() {
    let db = empty_mock();
    let (status, body) = get(app(db.clone()), "/maintain/statistics/invtStatisticsByDate").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["beginDate"], "2024-06-08");
    assert_eq!(body["endDate"], "2024-06-15");
    assert!(body.get("message").is_none());
    assert_eq!(body["inbound"], serde_json::json!([]));
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_daily_volume_rejects_inverted_range_with_ok_status() {
    let db = empty_mock();
    let (status, body) = get(
        app(db.clone()),
        "/maintain/statistics/invtStatisticsByDate?beginDate=2024-01-05&endDate=2024-01-01",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["beginDate"], "2024-01-05");
    assert_eq!(body["endDate"], "2024-06-15");
    assert_eq!(body["message"], "The begin date cannot be later than the end date!");
    assert_eq!(body["outbound"], serde_json::json!([]));
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_daily_volume_rejects_spans_over_a_month() {
    let (_, body) = get(
        app(empty_mock()),
        "/maintain/statistics/invtStatisticsByDate?beginDate=2024-01-01&endDate=2024-02-01",
    )
    .await;
    assert_eq!(body["message"], "Cannot report on more than one month of data!");
    assert_eq!(body["beginDate"], "2024-01-01");
}

#[tokio::test]
async fn test_daily_volume_runs_both_families() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([daily_rows(3), daily_rows(3)])
        .into_connection();

    let (status, body) = get(
        app(db.clone()),
        "/maintain/statistics/invtStatisticsByDate?beginDate=2024-01-01&endDate=2024-01-05",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["beginDate"], "2024-01-01");
    assert_eq!(body["endDate"], "2024-01-05");
    assert_eq!(body["inbound"][0]["declarations"], 3);
    assert!(body["inbound"][0]["totalValue"].is_null());
    assert_eq!(body["outbound"][1]["day"], "subtotal");

    let log = db.into_transaction_log();
    assert_eq!(log.len(), 2);
    let rendered = format!("{log:?}");
    assert!(rendered.contains("ceb2_invt_head"));
    assert!(rendered.contains("ceb3_invt_head"));
}

#[tokio::test]
async fn test_daily_volume_store_failure_yields_message_and_no_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([
            DbErr::Custom("connection refused".to_string()),
            DbErr::Custom("connection refused".to_string()),
        ])
        .into_connection();

    let (status, body) = get(
        app(db),
        "/maintain/statistics/invtStatisticsByDate?beginDate=2024-01-01&endDate=2024-01-05",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "The statistics could not be loaded, please try again later."
    );
    assert_eq!(body["inbound"], serde_json::json!([]));
    assert_eq!(body["outbound"], serde_json::json!([]));
}

// ============================================================================
// Release rate and status distribution
// ============================================================================

#[tokio::test]
async fn test_release_rate_renders_both_summaries() {
    let row = |total: i64, external: i64, internal: i64| {
        vec![BTreeMap::from([
            ("total", Value::BigInt(Some(total))),
            ("external_released", Value::BigInt(Some(external))),
            ("internal_released", Value::BigInt(Some(internal))),
        ])]
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([row(8, 6, 2), row(8, 6, 2)])
        .into_connection();

    let (_, body) = get(
        app(db),
        "/maintain/statistics/invtReleaseStatisticsByDate?beginDate=2024-03-01&endDate=2024-03-31",
    )
    .await;

    assert_eq!(body["inbound"]["total"], 8);
    assert_eq!(body["inbound"]["externalRate"], "75.00%");
    assert_eq!(body["outbound"]["internalRate"], "25.00%");
}

#[tokio::test]
async fn test_release_rate_malformed_date_echoes_default_window() {
    let (_, body) = get(
        app(empty_mock()),
        "/maintain/statistics/invtReleaseStatisticsByDate?beginDate=2024-13-01&endDate=2024-03-31",
    )
    .await;

    assert_eq!(body["message"], "The date format is invalid!");
    assert_eq!(body["beginDate"], "2024-06-08");
    assert_eq!(body["endDate"], "2024-06-15");
    assert!(body["inbound"].is_null());
}

#[tokio::test]
async fn test_status_distribution_returns_four_lists() {
    let rows = vec![BTreeMap::from([
        ("status_code", Value::from("800")),
        ("declarations", Value::BigInt(Some(1))),
        ("total", Value::BigInt(Some(2))),
    ])];
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([rows.clone(), rows.clone(), rows.clone(), rows])
        .into_connection();

    let (_, body) = get(
        app(db.clone()),
        "/maintain/statistics/invtStatusStatisticsByDate?beginDate=2024-03-01&endDate=2024-03-07",
    )
    .await;

    for key in [
        "inboundExternal",
        "inboundInternal",
        "outboundExternal",
        "outboundInternal",
    ] {
        assert_eq!(body[key][0]["share"], "50.00%", "{key}");
    }
    assert_eq!(db.into_transaction_log().len(), 4);
}

// ============================================================================
// Intraday test volume
// ============================================================================

#[tokio::test]
async fn test_intraday_empty_bounds_cover_today() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            Vec::<BTreeMap<&str, Value>>::new(),
            Vec::<BTreeMap<&str, Value>>::new(),
        ])
        .into_connection();

    let (_, body) = get(
        app(db.clone()),
        "/maintain/statistics/invtTestStatisticsByTime?beginTime=&endTime=",
    )
    .await;

    assert_eq!(body["beginTime"], "00:00");
    assert_eq!(body["endTime"], "23:59");
    assert!(body.get("message").is_none());
    assert_eq!(db.into_transaction_log().len(), 2);
}

#[tokio::test]
async fn test_intraday_malformed_time() {
    let (_, body) = get(
        app(empty_mock()),
        "/maintain/statistics/invtTestStatisticsByTime?beginTime=25:00&endTime=23:00",
    )
    .await;

    assert_eq!(body["message"], "The time format is invalid!");
    assert_eq!(body["beginTime"], "00:00");
    assert_eq!(body["endTime"], "23:59");
}

// ============================================================================
// Grouped export
// ============================================================================

#[tokio::test]
async fn test_export_rejects_unsafe_office_codes() {
    let db = empty_mock();
    let (status, body) = get(
        app(db.clone()),
        "/maintain/statistics/invtExportByDate?beginDate=2024-01-01&endDate=2024-01-31&customs=5165,A1'--",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Customs office codes may only contain letters and digits!"
    );
    assert!(body.get("rows").is_none());
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_export_with_month_grouping() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([
            ("office", Value::from("5165")),
            ("month", Value::from("2024-01")),
            ("agent", Value::from("Harbor Brokerage")),
            ("platform", Value::from("ShopNet")),
            ("owner", Value::String(None)),
            ("declarations", Value::BigInt(Some(4))),
            ("total_value", Value::Decimal(None)),
            ("item_quantity", Value::Decimal(None)),
        ])]])
        .into_connection();

    let (_, body) = get(
        app(db.clone()),
        "/maintain/statistics/invtExportByDate?beginDate=2024-01-01&endDate=2024-01-31\
         &statisticsType=1&invtStatus=1&customs=5165,5166",
    )
    .await;

    assert_eq!(
        body["fileName"],
        "2024-01-01_2024-01-31_20240615103000_export_data.xlsx"
    );
    assert_eq!(
        body["filePath"],
        "exports/2024-01-01_2024-01-31_20240615103000_export_data.xlsx"
    );
    assert_eq!(body["labels"][1], "Month");
    assert_eq!(body["rows"][0][0], "5165");
    assert_eq!(body["rows"][0][1], "2024-01");
    assert_eq!(body["rows"][0][5], 4);

    let window = match RangeValidator::at(now())
        .validate(Some("2024-01-01"), Some("2024-01-31"), ReportKind::GroupedExport)
        .unwrap()
    {
        RangeOutcome::Requested(window) => window,
        RangeOutcome::Defaults(_) => panic!("expected a requested window"),
    };
    let spec = ReportQueryBuilder::build(
        ReportKind::GroupedExport,
        &window,
        RecordFamily::Inbound,
        &FilterParams::default()
            .with_selector(StatusSelector::ExternalOnly)
            .with_month_grouping(true)
            .with_offices(OfficeCode::parse_list("5165,5166").unwrap()),
    );
    let (sql, values) =
        bind_named(DatabaseBackend::Postgres, &spec.sql(), spec.parameters()).unwrap();
    assert_eq!(
        db.into_transaction_log(),
        vec![Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            sql,
            values
        )]
    );
}

#[tokio::test]
async fn test_export_can_target_outbound_family() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();

    let (_, body) = get(
        app(db.clone()),
        "/maintain/statistics/invtExportByDate?beginDate=2024-01-01&endDate=2024-01-02&family=outbound",
    )
    .await;

    assert_eq!(body["labels"][1], "Declaring agent");
    assert_eq!(body["rows"], serde_json::json!([]));
    assert!(format!("{:?}", db.into_transaction_log()).contains("ceb3_invt_head"));
}
