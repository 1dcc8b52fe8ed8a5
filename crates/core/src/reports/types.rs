//! Report data types.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use super::status::{StatusSelector, StatusStage};

/// Label of the rollup row in the daily volume report.
pub const SUBTOTAL_LABEL: &str = "subtotal";

/// Label of the rollup row in the intraday test volume report.
pub const TOTAL_LABEL: &str = "total";

/// The five supported reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Per-day count and value of released declarations, plus a subtotal.
    DailyInboundOutboundVolume,
    /// Released-at-each-stage counts and rates.
    ReleaseRateSummary,
    /// Share of each status code, per stage.
    StatusDistribution,
    /// Today's test traffic by status code.
    IntradayTestVolume,
    /// Declarations grouped by office and declaring entity, for spreadsheet export.
    GroupedExport,
}

/// Whether a report yields one row or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one aggregate row.
    Single,
    /// Zero or more rows.
    Many,
}

impl ReportKind {

    /// Identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DailyInboundOutboundVolume => "daily_volume",
            Self::ReleaseRateSummary => "release_rate",
            Self::StatusDistribution => "status_distribution",
            Self::IntradayTestVolume => "intraday_test_volume",
            Self::GroupedExport => "grouped_export",
        }
    }

    /// True when the range is given as `HH:MM` times of today.
    #[must_use]
    pub const fn uses_time_of_day(self) -> bool {
        matches!(self, Self::IntradayTestVolume)
    }

    /// True when the range is subject to the maximum span.
    #[must_use]
    pub const fn limits_span(self) -> bool {
        matches!(self, Self::DailyInboundOutboundVolume)
    }

    /// Days added to the requested end to form the exclusive upper bound.
    ///
    /// Reports comparing timestamps against `[begin, end)` push the end out by
    /// one day so the whole final day is included.
    #[must_use]
    pub const fn end_adjustment_days(self) -> i64 {
        match self {
            Self::ReleaseRateSummary | Self::StatusDistribution | Self::GroupedExport => 1,
            Self::DailyInboundOutboundVolume | Self::IntradayTestVolume => 0,
        }
    }

    /// Result cardinality.
    #[must_use]
    pub const fn cardinality(self) -> Cardinality {
        match self {
            Self::ReleaseRateSummary => Cardinality::Single,
            _ => Cardinality::Many,
        }
    }
}

/// One of the two structurally identical declaration record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFamily {
    /// Inbound declarations (`ceb2_*` tables).
    Inbound,
    /// Outbound declarations (`ceb3_*` tables).
    Outbound,
}

impl RecordFamily {
    /// Both families, inbound first.
    pub const ALL: [Self; 2] = [Self::Inbound, Self::Outbound];

    /// Table prefix in the store.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Inbound => "ceb2",
            Self::Outbound => "ceb3",
        }
    }

    /// Parses `inbound`/`outbound`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbound => f.write_str("inbound"),
            Self::Outbound => f.write_str("outbound"),
        }
    }
}

/// Maximum length of a customs office code.
const OFFICE_CODE_MAX_LEN: usize = 10;

/// A customs office code that passed the allow-list check.
///
/// Office codes are spliced into the query text, so only ASCII letters and
/// digits are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficeCode(String);

impl OfficeCode {
    /// Validates a single office code.
    pub fn parse(raw: &str) -> Result<Self, ReportError> {
        let code = raw.trim();
        if code.is_empty()
            || code.len() > OFFICE_CODE_MAX_LEN
            || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ReportError::InvalidOfficeCode(code.to_string()));
        }
        Ok(Self(code.to_string()))
    }

    /// Validates a comma-separated list, skipping empty entries.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, ReportError> {
        raw.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    /// The code as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional report filters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams {
    /// Status column grouped by the distribution report.
    pub stage: StatusStage,
    /// Release selector for the grouped export.
    pub selector: StatusSelector,
    /// Adds a calendar-month grouping key to the grouped export.
    pub group_by_month: bool,
    /// Offices the grouped export is restricted to; empty means all.
    pub offices: Vec<OfficeCode>,
    /// Reference prefix marking test declarations.
    pub test_prefix: String,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            stage: StatusStage::External,
            selector: StatusSelector::Either,
            group_by_month: false,
            offices: Vec::new(),
            test_prefix: "TEST".to_string(),
        }
    }
}

impl FilterParams {
    /// Sets the distribution stage.
    #[must_use]
    pub const fn with_stage(mut self, stage: StatusStage) -> Self {
        self.stage = stage;
        self
    }

    /// Sets the export release selector.
    #[must_use]
    pub const fn with_selector(mut self, selector: StatusSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Toggles month grouping.
    #[must_use]
    pub const fn with_month_grouping(mut self, enabled: bool) -> Self {
        self.group_by_month = enabled;
        self
    }

    /// Restricts the export to the given offices.
    #[must_use]
    pub fn with_offices(mut self, offices: Vec<OfficeCode>) -> Self {
        self.offices = offices;
        self
    }

    /// Sets the test reference prefix.
    #[must_use]
    pub fn with_test_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.test_prefix = prefix.into();
        self
    }
}

/// A value bound to a named query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time of day.
    Timestamp(NaiveDateTime),
    /// Text.
    Text(String),
}

/// Renders `part / total` as a percentage: the ratio is rounded to four
/// fractional digits, then shown as `NN.NN%`. A zero total renders `0.00%`.
#[must_use]
pub fn format_percentage(part: i64, total: i64) -> String {
    if total <= 0 {
        return "0.00%".to_string();
    }
    let ratio = (Decimal::from(part) / Decimal::from(total))
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", ratio * Decimal::ONE_HUNDRED)
}

/// One row of the daily volume report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyVolumeRow {
    /// `YYYY-MM-DD`, or [`SUBTOTAL_LABEL`] for the rollup row.
    pub day: String,
    /// Released declarations.
    pub declarations: i64,
    /// Sum of line-item price times exchange rate; absent when no rate matched.
    pub total_value: Option<Decimal>,
}

/// The release rate summary for one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRateRow {
    /// Declarations in the window.
    pub total: i64,
    /// Declarations released at the external stage.
    pub external_released: i64,
    /// `external_released / total` as `NN.NN%`.
    pub external_rate: String,
    /// Declarations released by customs.
    pub internal_released: i64,
    /// `internal_released / total` as `NN.NN%`.
    pub internal_rate: String,
}

impl ReleaseRateRow {
    /// Builds the row and its rendered rates from raw counts.
    #[must_use]
    pub fn from_counts(total: i64, external_released: i64, internal_released: i64) -> Self {
        Self {
            total,
            external_released,
            external_rate: format_percentage(external_released, total),
            internal_released,
            internal_rate: format_percentage(internal_released, total),
        }
    }
}

/// One status code's share in the distribution report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusShareRow {
    /// Raw status code; absent for declarations with no status yet.
    pub status_code: Option<String>,
    /// Declarations with this code.
    pub declarations: i64,
    /// Share of the family total as `NN.NN%`.
    pub share: String,
}

impl StatusShareRow {
    /// Builds the row from a code's count and the family total.
    #[must_use]
    pub fn from_counts(status_code: Option<String>, declarations: i64, total: i64) -> Self {
        Self {
            status_code,
            declarations,
            share: format_percentage(declarations, total),
        }
    }
}

/// One row of the intraday test volume report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradayVolumeRow {
    /// Raw status code, or [`TOTAL_LABEL`] for the rollup row.
    pub status_code: String,
    /// Test declarations with this code.
    pub declarations: i64,
}
