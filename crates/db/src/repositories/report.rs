//! Report repository.
//!
//! Runs one [`QuerySpec`] at a time and decodes the rows into the core result
//! types. Callers run the inbound and outbound specs side by side.

use declstat_core::export::ExportRow;
use declstat_core::reports::{
    Cardinality, DailyVolumeRow, IntradayVolumeRow, QuerySpec, ReleaseRateRow, ReportError, ReportKind,
    StatusShareRow,
};
use sea_orm::{DatabaseConnection, FromQueryResult};
use tracing::warn;

use crate::executor::ReportExecutor;
use crate::records::{
    DailyVolumeRecord, ExportRecord, IntradayVolumeRecord, ReleaseRateRecord, StatusShareRecord,
};

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    executor: ReportExecutor,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            executor: ReportExecutor::new(db),
        }
    }

    /// Daily released volume, subtotal row included.
    pub async fn daily_volume(&self, spec: &QuerySpec) -> Result<Vec<DailyVolumeRow>, ReportError> {
        self.fetch::<DailyVolumeRecord, _>(spec, ReportKind::DailyInboundOutboundVolume)
            .await
    }

    /// Release counts and rates. `None` when the store returned no row.
    pub async fn release_rate(&self, spec: &QuerySpec) -> Result<Option<ReleaseRateRow>, ReportError> {
        let rows = self
            .fetch::<ReleaseRateRecord, ReleaseRateRow>(spec, ReportKind::ReleaseRateSummary)
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Share of each status code on the query's stage.
    pub async fn status_distribution(
        &self,
        spec: &QuerySpec,
    ) -> Result<Vec<StatusShareRow>, ReportError> {
        self.fetch::<StatusShareRecord, _>(spec, ReportKind::StatusDistribution)
            .await
    }

    /// Test traffic per status code, total row included.
    pub async fn intraday_test_volume(
        &self,
        spec: &QuerySpec,
    ) -> Result<Vec<IntradayVolumeRow>, ReportError> {
        self.fetch::<IntradayVolumeRecord, _>(spec, ReportKind::IntradayTestVolume)
            .await
    }

    /// Export groups in grouping-key order.
    pub async fn grouped_export(&self, spec: &QuerySpec) -> Result<Vec<ExportRow>, ReportError> {
        self.fetch::<ExportRecord, _>(spec, ReportKind::GroupedExport)
            .await
    }

    /// Runs `spec` as a single-row or multi-row fetch, per its cardinality.
    async fn fetch<R, T>(&self, spec: &QuerySpec, kind: ReportKind) -> Result<Vec<T>, ReportError>
    where
        R: FromQueryResult,
        T: From<R>,
    {
        check_kind(spec, kind)?;
        let records = match spec.cardinality() {
            Cardinality::Single => self
                .executor
                .execute_one::<R>(spec)
                .await?
                .into_iter()
                .collect(),
            Cardinality::Many => self.executor.execute_many::<R>(spec).await?,
        };
        Ok(records.into_iter().map(T::from).collect())
    }
}

fn check_kind(spec: &QuerySpec, expected: ReportKind) -> Result<(), ReportError> {
    if spec.kind() == expected {
        return Ok(());
    }
    warn!(
        expected = expected.as_str(),
        actual = spec.kind().as_str(),
        "Query spec does not match the requested report"
    );
    Err(ReportError::QueryExecution(format!(
        "expected a {} query, got {}",
        expected.as_str(),
        spec.kind().as_str()
    )))
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
