//! Status codes and their business categories.

use serde::{Deserialize, Serialize};

use super::types::{RecordFamily, ReportKind};

/// Review stage a status column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusStage {
    /// Platform-side review (`app_status`).
    External,
    /// Customs-side review (`cus_status`).
    Internal,
}

impl StatusStage {
    /// Both stages, external first.
    pub const ALL: [Self; 2] = [Self::External, Self::Internal];

    /// Status column on the declaration header.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::External => "app_status",
            Self::Internal => "cus_status",
        }
    }
}

/// A named set of raw status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    /// Released at the external review stage.
    ExternalReleased,
    /// Released at the customs review stage.
    InternalReleased,
}

impl StatusCategory {
    /// Stage whose column the category is matched against.
    #[must_use]
    pub const fn stage(self) -> StatusStage {
        match self {
            Self::ExternalReleased => StatusStage::External,
            Self::InternalReleased => StatusStage::Internal,
        }
    }

    /// Raw codes making up this category for a report and family.
    ///
    /// The outbound family counts `899` as externally released and `21` as
    /// released by customs; the inbound family does not. The daily volume
    /// report counts `800` and `899` for both families.
    #[must_use]
    pub const fn codes(self, kind: ReportKind, family: RecordFamily) -> &'static [&'static str] {
        match (kind, self, family) {
            (ReportKind::DailyInboundOutboundVolume, Self::ExternalReleased, _)
            | (_, Self::ExternalReleased, RecordFamily::Outbound) => &["800", "899"],
            (_, Self::ExternalReleased, RecordFamily::Inbound) => &["800"],
            (_, Self::InternalReleased, RecordFamily::Inbound) => &["26"],
            (_, Self::InternalReleased, RecordFamily::Outbound) => &["26", "21"],
        }
    }

    /// Template token the quoted code list is substituted for.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::ExternalReleased => "{external_released}",
            Self::InternalReleased => "{internal_released}",
        }
    }

    /// Codes rendered as a SQL literal list, e.g. `'800', '899'`.
    #[must_use]
    pub fn sql_list(self, kind: ReportKind, family: RecordFamily) -> String {
        self.codes(kind, family)
            .iter()
            .map(|code| format!("'{code}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Which released declarations the grouped export includes (`invtStatus`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSelector {
    /// Released at either stage (`0`).
    #[default]
    Either,
    /// Released at the external stage (`1`).
    ExternalOnly,
    /// Released by customs (`2`).
    InternalOnly,
}

impl StatusSelector {
    /// Parses the `invtStatus` request flag. Anything unrecognised selects `Either`.
    #[must_use]
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some("1") => Self::ExternalOnly,
            Some("2") => Self::InternalOnly,
            _ => Self::Either,
        }
    }

    /// Filter clause over header alias `t`, with category tokens left in place.
    #[must_use]
    pub const fn clause(self) -> &'static str {
        match self {
            Self::Either => {
                "(t.app_status IN ({external_released}) OR t.cus_status IN ({internal_released}))"
            }
            Self::ExternalOnly => "t.app_status IN ({external_released})",
            Self::InternalOnly => "t.cus_status IN ({internal_released})",
        }
    }
}
