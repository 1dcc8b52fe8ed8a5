//! Grouped export layout.
//!
//! Defines what goes in which spreadsheet column. Encoding the workbook is
//! left to the spreadsheet writer; this module hands it the file name, the
//! label row and the data rows in label order.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};


/// Column labels in order, without the month column.
const BASE_LABELS: [&str; 9] = [
    "Customs office",
    "Declaring agent",
    "E-commerce platform",
    "Goods owner",
    "Declarations",
    "Value (CNY)",
    "Item quantity",
    "Value per declaration",
    "Value per item",
];

/// Label of the optional month column.
pub const MONTH_LABEL: &str = "Month";

/// Position of the month column when month grouping is on.
pub const MONTH_COLUMN: usize = 1;

/// Column layout for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    month_grouped: bool,
}

impl ColumnPlan {
    /// Creates the plan; month grouping inserts a column after the office.
    #[must_use]
    pub const fn new(month_grouped: bool) -> Self {
        Self { month_grouped }
    }

    /// Whether the month column is present.
    #[must_use]
    pub const fn is_month_grouped(&self) -> bool {
        self.month_grouped
    }

    /// Header labels, in column order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = BASE_LABELS.to_vec();
        if self.month_grouped {
            labels.insert(MONTH_COLUMN, MONTH_LABEL);
        }
        labels
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        BASE_LABELS.len() + if self.month_grouped { 1 } else { 0 }
    }
}

/// Name of the generated workbook:
/// `{beginDate}_{endDate}_{generationTimestamp}_export_data.xlsx`.
#[must_use]
pub fn export_file_name(begin: NaiveDate, end: NaiveDate, generated_at: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}_export_data.xlsx",
        begin.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        generated_at.format("%Y%m%d%H%M%S")
    )
}

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Text value.
    Text(String),
    /// Whole number.
    Count(i64),
    /// Decimal amount.
    Amount(Decimal),
    /// No value.
    Empty,
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Empty, Self::Text)
    }
}

/// One grouped export row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    /// Customs office code.
    pub office: Option<String>,
    /// `YYYY-MM` when month grouping is on.
    pub month: Option<String>,
    /// Declaring agent.
    pub agent: Option<String>,
    /// E-commerce platform.
    pub platform: Option<String>,
    /// Goods owner.
    pub owner: Option<String>,
    /// Declarations in the group.
    pub declarations: i64,
    /// Value converted with the latest exchange rate.
    pub total_value: Decimal,
    /// Declared item quantity.
    pub item_quantity: Decimal,
}

impl ExportRow {
    /// Value divided by declarations, to two places.
    #[must_use]
    pub fn value_per_declaration(&self) -> Decimal {
        ratio(self.total_value, Decimal::from(self.declarations))
    }

    /// Value divided by item quantity, to two places.
    #[must_use]
    pub fn value_per_item(&self) -> Decimal {
        ratio(self.total_value, self.item_quantity)
    }

    /// Cells in the order of `plan`'s labels.
    #[must_use]
    pub fn cells(&self, plan: &ColumnPlan) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(plan.width());
        cells.push(Cell::from(self.office.clone()));
        if plan.is_month_grouped() {
            cells.push(Cell::from(self.month.clone()));
        }
        cells.extend([
            Cell::from(self.agent.clone()),
            Cell::from(self.platform.clone()),
            Cell::from(self.owner.clone()),
            Cell::Count(self.declarations),
            Cell::Amount(self.total_value),
            Cell::Amount(self.item_quantity),
            Cell::Amount(self.value_per_declaration()),
            Cell::Amount(self.value_per_item()),
        ]);
        cells
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    (numerator / denominator).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Everything the spreadsheet writer needs for one workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSheet {
    /// Generated file name.
    pub file_name: String,
    /// First row.
    pub labels: Vec<String>,
    /// Data rows, each in label order.
    pub rows: Vec<Vec<Cell>>,
}

impl ExportSheet {
    /// Lays out `rows` according to `plan`.
    #[must_use]
    pub fn new(file_name: String, plan: &ColumnPlan, rows: &[ExportRow]) -> Self {
        Self {
            file_name,
            labels: plan.labels().into_iter().map(String::from).collect(),
            rows: rows.iter().map(|row| row.cells(plan)).collect(),
        }
    }
}
