//! Declaration statistics routes.
//!
//! Every endpoint answers 200. A rejected range comes back with the fallback
//! bounds, empty result sets and a message for the caller.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use declstat_core::export::{ColumnPlan, ExportRow, ExportSheet, export_file_name};
use declstat_core::reports::{
    DailyVolumeRow, IntradayVolumeRow, OfficeCode, RecordFamily, ReleaseRateRow, ReportError,
    ReportKind, ReportQueryBuilder, StatusSelector, StatusShareRow,
};
use declstat_core::window::{RangeEcho, RangeOutcome, RangeValidator, TimeWindow};
use declstat_db::ReportRepository;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::AppState;

/// Creates the statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invtStatisticsByDate", get(daily_volume))
        .route("/invtReleaseStatisticsByDate", get(release_rate))
        .route("/invtStatusStatisticsByDate", get(status_distribution))
        .route("/invtTestStatisticsByTime", get(intraday_test_volume))
        .route("/invtExportByDate", get(grouped_export))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Date range query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    /// `YYYY-MM-DD`.
    pub begin_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: Option<String>,
}

/// Time-of-day range query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeQuery {
    /// `HH:MM`.
    pub begin_time: Option<String>,
    /// `HH:MM`.
    pub end_time: Option<String>,
}

/// Grouped export query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    /// `YYYY-MM-DD`.
    pub begin_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: Option<String>,
    /// `0` either stage, `1` external only, `2` customs only.
    pub invt_status: Option<String>,
    /// `1` adds the month grouping.
    pub statistics_type: Option<String>,
    /// Comma-separated customs office codes.
    pub customs: Option<String>,
    /// `inbound` (default) or `outbound`.
    pub family: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Response for the daily volume report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyVolumeResponse {
    /// Begin date shown to the caller.
    pub begin_date: String,
    /// End date shown to the caller.
    pub end_date: String,
    /// Why the report was not run, if it wasn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// Inbound rows, subtotal last.
    pub inbound: Vec<DailyVolumeRow>,
    /// Outbound rows, subtotal last.
    pub outbound: Vec<DailyVolumeRow>,
}

/// Response for the release rate summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRateResponse {
    /// Begin date shown to the caller.
    pub begin_date: String,
    /// End date shown to the caller.
    pub end_date: String,
    /// Why the report was not run, if it wasn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// Inbound summary.
    pub inbound: Option<ReleaseRateRow>,
    /// Outbound summary.
    pub outbound: Option<ReleaseRateRow>,
}

/// Response for the status distribution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDistributionResponse {
    /// Begin date shown to the caller.
    pub begin_date: String,
    /// End date shown to the caller.
    pub end_date: String,
    /// Why the report was not run, if it wasn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// Inbound, by external status.
    pub inbound_external: Vec<StatusShareRow>,
    /// Inbound, by customs status.
    pub inbound_internal: Vec<StatusShareRow>,
    /// Outbound, by external status.
    pub outbound_external: Vec<StatusShareRow>,
    /// Outbound, by customs status.
    pub outbound_internal: Vec<StatusShareRow>,
}

/// Response for the intraday test volume.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradayVolumeResponse {
    /// Begin time shown to the caller.
    pub begin_time: String,
    /// End time shown to the caller.
    pub end_time: String,
    /// Why the report was not run, if it wasn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// Inbound rows, total first.
    pub inbound: Vec<IntradayVolumeRow>,
    /// Outbound rows, total first.
    pub outbound: Vec<IntradayVolumeRow>,
}

/// Response for the grouped export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// Begin date shown to the caller.
    pub begin_date: String,
    /// End date shown to the caller.
    pub end_date: String,
    /// Why the export was not produced, if it wasn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// Where the encoder writes the workbook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// File name, labels and rows for the encoder.
    #[serde(flatten)]
    pub sheet: Option<ExportSheet>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Result of checking the requested range.
enum Prepared {
    /// Run the report over this window.
    Run(TimeWindow),
    /// Answer with these bounds and no rows.
    Skip(RangeEcho, Option<&'static str>),
}

fn prepare(
    validator: &RangeValidator,
    begin: Option<&str>,
    end: Option<&str>,
    kind: ReportKind,
) -> Prepared {
    match validator.validate(begin, end, kind) {
        Ok(RangeOutcome::Requested(window)) => Prepared::Run(window),
        Ok(RangeOutcome::Defaults(window)) => Prepared::Skip(window.echo().clone(), None),
        Err(rejection) => {
            info!(
                kind = kind.as_str(),
                code = rejection.error.error_code(),
                error = %rejection.error,
                "Rejected report range"
            );
            Prepared::Skip(rejection.echo, Some(rejection.error.message()))
        }
    }
}

/// Unwraps a query result, recording the failure message instead of failing the request.
fn settle<T: Default>(
    kind: ReportKind,
    result: Result<T, ReportError>,
    message: &mut Option<&'static str>,
) -> T {
    result.unwrap_or_else(|err| {
        error!(kind = kind.as_str(), error = %err, "Failed to run report");
        *message = Some(err.message());
        T::default()
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /maintain/statistics/invtStatisticsByDate
async fn daily_volume(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> impl IntoResponse {
    let kind = ReportKind::DailyInboundOutboundVolume;
    let validator = state.reporting.validator();

    let window = match prepare(
        &validator,
        query.begin_date.as_deref(),
        query.end_date.as_deref(),
        kind,
    ) {
        Prepared::Run(window) => window,
        Prepared::Skip(echo, message) => {
            return Json(DailyVolumeResponse {
                begin_date: echo.begin,
                end_date: echo.end,
                message,
                inbound: Vec::new(),
                outbound: Vec::new(),
            });
        }
    };

    let repo = ReportRepository::new((*state.db).clone());
    let inbound_spec = ReportQueryBuilder::build(
        kind,
        &window,
        RecordFamily::Inbound,
        &state.reporting.base_filters(),
    );
    let outbound_spec = inbound_spec.retarget(RecordFamily::Outbound);
    let (inbound, outbound) = tokio::join!(
        repo.daily_volume(&inbound_spec),
        repo.daily_volume(&outbound_spec)
    );

    let mut message = None;
    Json(DailyVolumeResponse {
        begin_date: window.echo().begin.clone(),
        end_date: window.echo().end.clone(),
        inbound: settle(kind, inbound, &mut message),
        outbound: settle(kind, outbound, &mut message),
        message,
    })
}

/// GET /maintain/statistics/invtReleaseStatisticsByDate
async fn release_rate(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> impl IntoResponse {
    let kind = ReportKind::ReleaseRateSummary;
    let validator = state.reporting.validator();

    let window = match prepare(
        &validator,
        query.begin_date.as_deref(),
        query.end_date.as_deref(),
        kind,
    ) {
        Prepared::Run(window) => window,
        Prepared::Skip(echo, message) => {
            return Json(ReleaseRateResponse {
                begin_date: echo.begin,
                end_date: echo.end,
                message,
                inbound: None,
                outbound: None,
            });
        }
    };

    let repo = ReportRepository::new((*state.db).clone());
    let inbound_spec = ReportQueryBuilder::build(
        kind,
        &window,
        RecordFamily::Inbound,
        &state.reporting.base_filters(),
    );
    let outbound_spec = inbound_spec.retarget(RecordFamily::Outbound);
    let (inbound, outbound) = tokio::join!(
        repo.release_rate(&inbound_spec),
        repo.release_rate(&outbound_spec)
    );

    let mut message = None;
    Json(ReleaseRateResponse {
        begin_date: window.echo().begin.clone(),
        end_date: window.echo().end.clone(),
        inbound: settle(kind, inbound, &mut message),
        outbound: settle(kind, outbound, &mut message),
        message,
    })
}

/// GET /maintain/statistics/invtStatusStatisticsByDate
async fn status_distribution(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> impl IntoResponse {
    let kind = ReportKind::StatusDistribution;
    let validator = state.reporting.validator();

    let window = match prepare(
        &validator,
        query.begin_date.as_deref(),
        query.end_date.as_deref(),
        kind,
    ) {
        Prepared::Run(window) => window,
        Prepared::Skip(echo, message) => {
            return Json(StatusDistributionResponse {
                begin_date: echo.begin,
                end_date: echo.end,
                message,
                inbound_external: Vec::new(),
                inbound_internal: Vec::new(),
                outbound_external: Vec::new(),
                outbound_internal: Vec::new(),
            });
        }
    };

    let repo = ReportRepository::new((*state.db).clone());
    // Inbound external, inbound internal, outbound external, outbound internal.
    let specs = ReportQueryBuilder::status_distribution_set(&window);
    let (inbound_external, inbound_internal, outbound_external, outbound_internal) = tokio::join!(
        repo.status_distribution(&specs[0]),
        repo.status_distribution(&specs[1]),
        repo.status_distribution(&specs[2]),
        repo.status_distribution(&specs[3])
    );

    let mut message = None;
    Json(StatusDistributionResponse {
        begin_date: window.echo().begin.clone(),
        end_date: window.echo().end.clone(),
        inbound_external: settle(kind, inbound_external, &mut message),
        inbound_internal: settle(kind, inbound_internal, &mut message),
        outbound_external: settle(kind, outbound_external, &mut message),
        outbound_internal: settle(kind, outbound_internal, &mut message),
        message,
    })
}

/// GET /maintain/statistics/invtTestStatisticsByTime
async fn intraday_test_volume(
    State(state): State<AppState>,
    Query(query): Query<TimeRangeQuery>,
) -> impl IntoResponse {
    let kind = ReportKind::IntradayTestVolume;
    let validator = state.reporting.validator();

    let window = match prepare(
        &validator,
        query.begin_time.as_deref(),
        query.end_time.as_deref(),
        kind,
    ) {
        Prepared::Run(window) => window,
        Prepared::Skip(echo, message) => {
            return Json(IntradayVolumeResponse {
                begin_time: echo.begin,
                end_time: echo.end,
                message,
                inbound: Vec::new(),
                outbound: Vec::new(),
            });
        }
    };

    let repo = ReportRepository::new((*state.db).clone());
    let inbound_spec = ReportQueryBuilder::build(
        kind,
        &window,
        RecordFamily::Inbound,
        &state.reporting.base_filters(),
    );
    let outbound_spec = inbound_spec.retarget(RecordFamily::Outbound);
    let (inbound, outbound) = tokio::join!(
        repo.intraday_test_volume(&inbound_spec),
        repo.intraday_test_volume(&outbound_spec)
    );

    let mut message = None;
    Json(IntradayVolumeResponse {
        begin_time: window.echo().begin.clone(),
        end_time: window.echo().end.clone(),
        inbound: settle(kind, inbound, &mut message),
        outbound: settle(kind, outbound, &mut message),
        message,
    })
}

/// GET /maintain/statistics/invtExportByDate
async fn grouped_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let kind = ReportKind::GroupedExport;
    let validator = state.reporting.validator();

    let window = match prepare(
        &validator,
        query.begin_date.as_deref(),
        query.end_date.as_deref(),
        kind,
    ) {
        Prepared::Run(window) => window,
        Prepared::Skip(echo, message) => {
            return Json(ExportResponse {
                begin_date: echo.begin,
                end_date: echo.end,
                message,
                file_path: None,
                sheet: None,
            });
        }
    };

    let offices = match query.customs.as_deref().map(OfficeCode::parse_list) {
        None => Vec::new(),
        Some(Ok(offices)) => offices,
        Some(Err(err)) => {
            info!(kind = kind.as_str(), code = err.error_code(), error = %err, "Rejected export filter");
            return Json(ExportResponse {
                begin_date: window.echo().begin.clone(),
                end_date: window.echo().end.clone(),
                message: Some(err.message()),
                file_path: None,
                sheet: None,
            });
        }
    };

    let month_grouped = query.statistics_type.as_deref().map(str::trim) == Some("1");
    let filters = state
        .reporting
        .base_filters()
        .with_selector(StatusSelector::from_flag(query.invt_status.as_deref()))
        .with_month_grouping(month_grouped)
        .with_offices(offices);
    let family = query
        .family
        .as_deref()
        .and_then(RecordFamily::parse)
        .unwrap_or(RecordFamily::Inbound);

    let spec = ReportQueryBuilder::build(kind, &window, family, &filters);
    let repo = ReportRepository::new((*state.db).clone());

    let mut message = None;
    let rows: Vec<ExportRow> = settle(kind, repo.grouped_export(&spec).await, &mut message);

    let plan = ColumnPlan::new(month_grouped);
    let file_name = export_file_name(window.begin_date(), window.end_date(), validator.now());
    let file_path = state
        .reporting
        .export_directory
        .join(&file_name)
        .display()
        .to_string();

    Json(ExportResponse {
        begin_date: window.echo().begin.clone(),
        end_date: window.echo().end.clone(),
        message,
        file_path: Some(file_path),
        sheet: Some(ExportSheet::new(file_name, &plan, &rows)),
    })
}

#[cfg(test)]
#[path = "statistics_tests.rs"]
mod tests;
