//! Raw report rows as returned by the store.

use declstat_core::export::ExportRow;
use declstat_core::reports::{
    DailyVolumeRow, IntradayVolumeRow, ReleaseRateRow, StatusShareRow,
};
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;

/// Daily volume row.
#[derive(Debug, Clone, FromQueryResult)]
pub struct DailyVolumeRecord {
    /// `YYYY-MM-DD` or the subtotal label.
    pub day: String,
    /// Released declarations.
    pub declarations: i64,
    /// Converted value; NULL when no exchange rate matched.
    pub total_value: Option<Decimal>,
}

impl From<DailyVolumeRecord> for DailyVolumeRow {
    fn from(record: DailyVolumeRecord) -> Self {
        Self {
            day: record.day,
            declarations: record.declarations,
            total_value: record.total_value,
        }
    }
}

/// Release counts. The sums are NULL over an empty window.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ReleaseRateRecord {
    /// Declarations in the window.
    pub total: i64,
    /// Released at the external stage.
    pub external_released: Option<i64>,
    /// Released by customs.
    pub internal_released: Option<i64>,
}

impl From<ReleaseRateRecord> for ReleaseRateRow {
    fn from(record: ReleaseRateRecord) -> Self {
        Self::from_counts(
            record.total,
            record.external_released.unwrap_or_default(),
            record.internal_released.unwrap_or_default(),
        )
    }
}

/// Count for one status code, with the window total.
#[derive(Debug, Clone, FromQueryResult)]
pub struct StatusShareRecord {
    /// Status code; NULL for declarations with no status yet.
    pub status_code: Option<String>,
    /// Declarations with this code.
    pub declarations: i64,
    /// Declarations in the window.
    pub total: i64,
}

impl From<StatusShareRecord> for StatusShareRow {
    fn from(record: StatusShareRecord) -> Self {
        Self::from_counts(record.status_code, record.declarations, record.total)
    }
}

/// Test declarations for one status code.
#[derive(Debug, Clone, FromQueryResult)]
pub struct IntradayVolumeRecord {
    /// Status code or the total label.
    pub status_code: String,
    /// Test declarations.
    pub declarations: i64,
}

impl From<IntradayVolumeRecord> for IntradayVolumeRow {
    fn from(record: IntradayVolumeRecord) -> Self {
        Self {
            status_code: record.status_code,
            declarations: record.declarations,
        }
    }
}

/// One export group.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ExportRecord {
    /// Customs office.
    pub office: Option<String>,
    /// `YYYY-MM`; NULL without month grouping.
    pub month: Option<String>,
    /// Declaring agent.
    pub agent: Option<String>,
    /// E-commerce platform.
    pub platform: Option<String>,
    /// Goods owner.
    pub owner: Option<String>,
    /// Declarations in the group.
    pub declarations: i64,
    /// Converted value.
    pub total_value: Option<Decimal>,
    /// Declared item quantity.
    pub item_quantity: Option<Decimal>,
}

impl From<ExportRecord> for ExportRow {
    fn from(record: ExportRecord) -> Self {
        Self {
            office: record.office,
            month: record.month,
            agent: record.agent,
            platform: record.platform,
            owner: record.owner,
            declarations: record.declarations,
            total_value: record.total_value.unwrap_or_default(),
            item_quantity: record.item_quantity.unwrap_or_default(),
        }
    }
}
