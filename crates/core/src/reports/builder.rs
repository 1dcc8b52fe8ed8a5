//! Aggregation query builder.

use std::collections::BTreeMap;

use serde::Serialize;

use super::status::{StatusCategory, StatusStage};
use super::templates;
use super::types::{Cardinality, FilterParams, OfficeCode, ParamValue, RecordFamily, ReportKind};
use crate::window::TimeWindow;

/// A parametrized aggregation query for one record family.
///
/// The template keeps the family-dependent tokens unresolved, so
/// [`retarget`](Self::retarget) only swaps the family and leaves the
/// template and every bound value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySpec {
    kind: ReportKind,
    family: RecordFamily,
    template: String,
    parameters: BTreeMap<&'static str, ParamValue>,
}

impl QuerySpec {
    /// Report this query belongs to.
    #[must_use]
    pub const fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Record family the query runs against.
    #[must_use]
    pub const fn family(&self) -> RecordFamily {
        self.family
    }

    /// Template with family-dependent tokens still in place.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Named parameters and their bound values.
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<&'static str, ParamValue> {
        &self.parameters
    }

    /// Whether one row or many are expected back.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.kind.cardinality()
    }

    /// Same query against another family.
    #[must_use]
    pub fn retarget(&self, family: RecordFamily) -> Self {
        Self {
            family,
            ..self.clone()
        }
    }

    /// Final SQL text with family tokens resolved. Parameters stay as `:name`.
    #[must_use]
    pub fn sql(&self) -> String {
        let mut sql = self
            .template
            .replace(templates::FAMILY_TOKEN, self.family.tag());
        for category in [StatusCategory::ExternalReleased, StatusCategory::InternalReleased] {
            sql = sql.replace(category.token(), &category.sql_list(self.kind, self.family));
        }
        sql
    }
}

/// Builds [`QuerySpec`]s for each report kind.
pub struct ReportQueryBuilder;

impl ReportQueryBuilder {
    /// Builds the query for `kind` over `window` against `family`.
    #[must_use]
    pub fn build(
        kind: ReportKind,
        window: &TimeWindow,
        family: RecordFamily,
        extra: &FilterParams,
    ) -> QuerySpec {
        let (template, parameters) = match kind {
            ReportKind::DailyInboundOutboundVolume => Self::daily_volume(window),
            ReportKind::ReleaseRateSummary => {
                (templates::RELEASE_RATE.to_string(), Self::half_open(window))
            }
            ReportKind::StatusDistribution => (
                templates::STATUS_DISTRIBUTION.replace("{status_column}", extra.stage.column()),
                Self::half_open(window),
            ),
            ReportKind::IntradayTestVolume => Self::intraday(window, &extra.test_prefix),
            ReportKind::GroupedExport => Self::grouped_export(window, extra),
        };

        QuerySpec {
            kind,
            family,
            template,
            parameters,
        }
    }

    /// The four distribution queries for one window: each family by each stage.
    #[must_use]
    pub fn status_distribution_set(window: &TimeWindow) -> Vec<QuerySpec> {
        RecordFamily::ALL
            .into_iter()
            .flat_map(|family| {
                StatusStage::ALL.into_iter().map(move |stage| {
                    Self::build(
                        ReportKind::StatusDistribution,
                        window,
                        family,
                        &FilterParams::default().with_stage(stage),
                    )
                })
            })
            .collect()
    }

    fn daily_volume(window: &TimeWindow) -> (String, BTreeMap<&'static str, ParamValue>) {
        let value = templates::DECLARATION_VALUE.replace("{value_filter}", templates::DAILY_VALUE_FILTER);
        let template = templates::DAILY_VOLUME.replace("{declaration_value}", &value);
        let parameters = BTreeMap::from([
            ("beginDate", ParamValue::Date(window.begin_date())),
            ("endDate", ParamValue::Date(window.end_date())),
        ]);
        (template, parameters)
    }

    fn half_open(window: &TimeWindow) -> BTreeMap<&'static str, ParamValue> {
        BTreeMap::from([
            ("beginDate", ParamValue::Timestamp(window.begin())),
            ("endDate", ParamValue::Timestamp(window.exclusive_end())),
        ])
    }

    fn intraday(window: &TimeWindow, prefix: &str) -> (String, BTreeMap<&'static str, ParamValue>) {
        let parameters = BTreeMap::from([
            ("beginTime", ParamValue::Timestamp(window.begin())),
            ("endTime", ParamValue::Timestamp(window.exclusive_end())),
            ("referencePattern", ParamValue::Text(like_prefix(prefix))),
        ]);
        (templates::INTRADAY_TEST_VOLUME.to_string(), parameters)
    }

    fn grouped_export(
        window: &TimeWindow,
        extra: &FilterParams,
    ) -> (String, BTreeMap<&'static str, ParamValue>) {
        let value = templates::DECLARATION_VALUE.replace("{value_filter}", templates::EXPORT_VALUE_FILTER);
        let (month_select, group_keys) = if extra.group_by_month {
            (
                templates::MONTH_EXPR,
                format!(
                    "t.customs_code, {}, t.agent_name, t.ebp_name, t.owner_name",
                    templates::MONTH_EXPR
                ),
            )
        } else {
            (
                templates::NO_MONTH,
                "t.customs_code, t.agent_name, t.ebp_name, t.owner_name".to_string(),
            )
        };

        let template = templates::GROUPED_EXPORT
            .replace("{declaration_value}", &value)
            .replace("{month_select}", month_select)
            .replace("{status_filter}", extra.selector.clause())
            .replace("{office_filter}", &office_filter(&extra.offices))
            .replace("{group_keys}", &group_keys);

        (template, Self::half_open(window))
    }
}

/// `IN` clause over allow-listed office codes; empty when no office is selected.
fn office_filter(offices: &[OfficeCode]) -> String {
    if offices.is_empty() {
        return String::new();
    }
    let quoted = offices
        .iter()
        .map(|office| format!("'{}'", office.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("\n   AND t.customs_code IN ({quoted})")
}

/// `LIKE` pattern matching values that start with `prefix` literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
