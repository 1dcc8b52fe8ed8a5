//! Time window types.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Resolution of the bounds a report compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Calendar days (`YYYY-MM-DD`).
    Day,
    /// Time of day (`HH:MM`).
    Hour,
}

/// Bounds echoed back to the caller alongside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEcho {
    /// Begin bound (`YYYY-MM-DD` or `HH:MM`).
    pub begin: String,
    /// End bound (`YYYY-MM-DD` or `HH:MM`).
    pub end: String,
}

/// A validated report window.
///
/// Invariant: `begin <= end`. The value is immutable; the only way to get one
/// is through [`RangeValidator`](super::RangeValidator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    begin: NaiveDateTime,
    end: NaiveDateTime,
    granularity: Granularity,
    end_adjustment: TimeDelta,
    echo: RangeEcho,
}

impl TimeWindow {
    pub(crate) const fn new(
        begin: NaiveDateTime,
        end: NaiveDateTime,
        granularity: Granularity,
        end_adjustment: TimeDelta,
        echo: RangeEcho,
    ) -> Self {
        Self {
            begin,
            end,
            granularity,
            end_adjustment,
            echo,
        }
    }

    /// Start of the window.
    #[must_use]
    pub const fn begin(&self) -> NaiveDateTime {
        self.begin
    }

    /// End of the window as requested, before any adjustment.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Calendar date of the start.
    #[must_use]
    pub fn begin_date(&self) -> NaiveDate {
        self.begin.date()
    }

    /// Calendar date of the requested end.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    /// Bound resolution.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// How far the end is pushed out to form the exclusive upper bound.
    #[must_use]
    pub const fn end_adjustment(&self) -> TimeDelta {
        self.end_adjustment
    }

    /// Exclusive upper bound for half-open `[begin, end)` comparisons.
    #[must_use]
    pub fn exclusive_end(&self) -> NaiveDateTime {
        self.end + self.end_adjustment
    }

    /// Human-readable bounds for echoing back.
    #[must_use]
    pub const fn echo(&self) -> &RangeEcho {
        &self.echo
    }
}

/// Successful validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeOutcome {
    /// The caller supplied a usable range; run the report.
    Requested(TimeWindow),
    /// No range was supplied; show the default window without running anything.
    Defaults(TimeWindow),
}

impl RangeOutcome {
    /// The window regardless of how it was obtained.
    #[must_use]
    pub const fn window(&self) -> &TimeWindow {
        match self {
            Self::Requested(window) | Self::Defaults(window) => window,
        }
    }
}
