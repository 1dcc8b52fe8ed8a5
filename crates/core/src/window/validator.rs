//! Range validator.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use super::error::{RangeError, RangeRejection};
use super::types::{Granularity, RangeEcho, RangeOutcome, TimeWindow};
use crate::reports::ReportKind;

/// Longest range accepted by span-limited reports unless configured otherwise.
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 30;

/// Days covered by the default window shown when no range is supplied.
const DEFAULT_LOOKBACK_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DAY_START: &str = "00:00";
const DAY_END: &str = "23:59";

/// Removes whitespace and the characters `' " \ /` from a raw request value.
///
/// Idempotent: sanitizing a sanitized string returns it unchanged.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '\'' | '"' | '\\' | '/'))
        .collect()
}

/// Checks `value` against a shape where `9` stands for an ASCII digit and any
/// other byte must match literally.
fn matches_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(v, s)| match s {
            b'9' => v.is_ascii_digit(),
            _ => v == s,
        })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if !matches_shape(value, "9999-99-99") {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    if !matches_shape(value, "99:99") {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

/// Validates report ranges against a fixed notion of "now".
#[derive(Debug, Clone)]
pub struct RangeValidator {
    now: NaiveDateTime,
    max_span_days: i64,
}

impl RangeValidator {
    /// Creates a validator that treats `now` as the current local time.
    #[must_use]
    pub const fn at(now: NaiveDateTime) -> Self {
        Self {
            now,
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
        }
    }

    /// Creates a validator using the current wall-clock time in `tz`.
    #[must_use]
    pub fn now_in<Tz: TimeZone>(tz: &Tz) -> Self {
        Self::at(Utc::now().with_timezone(tz).naive_local())
    }

    /// Overrides the maximum span for span-limited reports.
    #[must_use]
    pub const fn with_max_span_days(mut self, days: i64) -> Self {
        self.max_span_days = days;
        self
    }

    /// The instant this validator treats as "now".
    #[must_use]
    pub const fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Validates a raw begin/end pair for `kind`.
    ///
    /// Missing bounds on a date report yield [`RangeOutcome::Defaults`] and no
    /// query should run.
    ///
    /// The intraday report never yields `Defaults`. A missing bound counts as
    /// an empty one (`00:00` or `23:59`), so the outcome is always
    /// [`RangeOutcome::Requested`] for today and the report runs.
    ///
    /// # Errors
    ///
    /// Returns a [`RangeRejection`] carrying the error and the bounds to echo
    /// when the input is malformed, inverted, or spans too many days.
    pub fn validate(
        &self,
        raw_begin: Option<&str>,
        raw_end: Option<&str>,
        kind: ReportKind,
    ) -> Result<RangeOutcome, RangeRejection> {
        if kind.uses_time_of_day() {
            return self
                .validate_times(raw_begin, raw_end)
                .map(RangeOutcome::Requested);
        }

        match (raw_begin, raw_end) {
            (Some(begin), Some(end)) => self
                .validate_dates(begin, end, kind)
                .map(RangeOutcome::Requested),
            _ => Ok(RangeOutcome::Defaults(self.default_window())),
        }
    }

    /// Trailing week up to today.
    #[must_use]
    pub fn default_window(&self) -> TimeWindow {
        let begin = self.today() - TimeDelta::days(DEFAULT_LOOKBACK_DAYS);
        let end = self.today();
        TimeWindow::new(
            begin.and_time(NaiveTime::MIN),
            end.and_time(NaiveTime::MIN),
            Granularity::Day,
            TimeDelta::zero(),
            RangeEcho {
                begin: begin.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            },
        )
    }

    fn today(&self) -> NaiveDate {
        self.now.date()
    }

    fn validate_dates(
        &self,
        raw_begin: &str,
        raw_end: &str,
        kind: ReportKind,
    ) -> Result<TimeWindow, RangeRejection> {
        let begin_text = sanitize(raw_begin);
        let end_text = sanitize(raw_end);

        let (Some(begin), Some(end)) = (parse_date(&begin_text), parse_date(&end_text)) else {
            return Err(RangeRejection {
                error: RangeError::MalformedDate,
                echo: self.default_window().echo().clone(),
            });
        };

        // Past this point the begin date is known good, so it is echoed as-is.
        let parsed_echo = RangeEcho {
            begin: begin.format(DATE_FORMAT).to_string(),
            end: self.today().format(DATE_FORMAT).to_string(),
        };

        if begin > end {
            return Err(RangeRejection {
                error: RangeError::InvertedRange {
                    begin: begin_text,
                    end: end_text,
                },
                echo: parsed_echo,
            });
        }

        let days = (end - begin).num_days();
        if kind.limits_span() && days > self.max_span_days {
            return Err(RangeRejection {
                error: RangeError::SpanTooLarge {
                    days,
                    max: self.max_span_days,
                },
                echo: parsed_echo,
            });
        }

        Ok(TimeWindow::new(
            begin.and_time(NaiveTime::MIN),
            end.and_time(NaiveTime::MIN),
            Granularity::Day,
            TimeDelta::days(kind.end_adjustment_days()),
            RangeEcho {
                begin: begin.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            },
        ))
    }

    fn validate_times(
        &self,
        raw_begin: Option<&str>,
        raw_end: Option<&str>,
    ) -> Result<TimeWindow, RangeRejection> {
        let begin_text = raw_begin.map(sanitize).unwrap_or_default();
        let end_text = raw_end.map(sanitize).unwrap_or_default();
        let begin_text = if begin_text.is_empty() {
            DAY_START.to_string()
        } else {
            begin_text
        };
        let end_text = if end_text.is_empty() {
            DAY_END.to_string()
        } else {
            end_text
        };

        let (Some(begin), Some(end)) = (parse_time(&begin_text), parse_time(&end_text)) else {
            return Err(RangeRejection {
                error: RangeError::MalformedTime,
                echo: RangeEcho {
                    begin: DAY_START.to_string(),
                    end: DAY_END.to_string(),
                },
            });
        };

        if begin > end {
            return Err(RangeRejection {
                error: RangeError::InvertedRange {
                    begin: begin_text.clone(),
                    end: end_text,
                },
                echo: RangeEcho {
                    begin: begin_text,
                    end: DAY_END.to_string(),
                },
            });
        }

        let today = self.today();
        Ok(TimeWindow::new(
            today.and_time(begin),
            today.and_time(end),
            Granularity::Hour,
            TimeDelta::zero(),
            RangeEcho {
                begin: begin_text,
                end: end_text,
            },
        ))
    }
}
