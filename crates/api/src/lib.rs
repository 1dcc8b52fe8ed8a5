//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The declaration statistics endpoints
//! - The health check
//! - Shared application state

pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use declstat_core::reports::FilterParams;
use declstat_core::window::RangeValidator;
use declstat_shared::{AppResult, ExportConfig, ReportingConfig};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Report settings resolved from configuration at startup.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Timezone that defines "now" and "today".
    pub timezone: Tz,
    /// Reference prefix marking test declarations.
    pub test_reference_prefix: String,
    /// Longest accepted daily volume range, in days.
    pub max_daily_span_days: i64,
    /// Directory the spreadsheet encoder writes into.
    pub export_directory: PathBuf,
    pinned_now: Option<NaiveDateTime>,
}

impl ReportSettings {
    /// Builds the settings from the loaded configuration.
    pub fn from_config(reporting: &ReportingConfig, export: &ExportConfig) -> AppResult<Self> {
        Ok(Self {
            timezone: reporting.tz()?,
            test_reference_prefix: reporting.test_reference_prefix.clone(),
            max_daily_span_days: reporting.max_daily_span_days,
            export_directory: export.directory.clone(),
            pinned_now: None,
        })
    }

    /// Freezes the clock at `now`.
    #[must_use]
    pub const fn pinned_at(mut self, now: NaiveDateTime) -> Self {
        self.pinned_now = Some(now);
        self
    }

    /// A validator reading the current wall-clock time in the configured zone.
    pub fn validator(&self) -> RangeValidator {
        self.pinned_now
            .map_or_else(|| RangeValidator::now_in(&self.timezone), RangeValidator::at)
            .with_max_span_days(self.max_daily_span_days)
    }

    /// Filters every report starts from.
    pub fn base_filters(&self) -> FilterParams {
        FilterParams::default().with_test_prefix(self.test_reference_prefix.clone())
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Report settings.
    pub reporting: Arc<ReportSettings>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
