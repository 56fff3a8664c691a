//! # Cairo Civil Calendar
//!
//! Date arithmetic for invoice visibility windows and report presets.
//!
//! ## The Timezone Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FIXED OFFSET, NOT AN IANA LOOKUP                                       │
//! │                                                                         │
//! │  The business rule is "Cairo civil dates, UTC+2, no DST" — Egypt has   │
//! │  not observed DST since 2011, and the console's day boundaries must    │
//! │  not move if a timezone database ever says otherwise.                  │
//! │                                                                         │
//! │  "Today" = current UTC time shifted by +2h, truncated to a date.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Visibility Windows
//! - manager    → `None`: unrestricted, the caller must not filter
//! - sales      → today only (single-day window)
//! - supervisor → trailing 7 days ending today, inclusive; user-supplied
//!   filter dates are clamped into the window rather than rejected

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::authz::Role;
use crate::error::ValidationError;

/// Cairo's permanent offset from UTC. No DST since 2011.
pub const CAIRO_UTC_OFFSET_HOURS: i64 = 2;

/// Cairo civil date of a UTC instant.
#[inline]
pub fn cairo_date(at: DateTime<Utc>) -> NaiveDate {
    (at + Duration::hours(CAIRO_UTC_OFFSET_HOURS)).date_naive()
}

/// Today on the Cairo civil calendar.
#[inline]
pub fn today_cairo() -> NaiveDate {
    cairo_date(Utc::now())
}

// =============================================================================
// Date Bounds
// =============================================================================

/// An inclusive civil-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateBounds {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl DateBounds {
    /// Checks whether a date falls inside the range (inclusive both ends).
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// The invoice date range a role may view, or `None` for no restriction.
///
/// `None` means the caller must not filter at all — it is not an empty
/// range.
pub fn invoice_date_bounds(role: Role) -> Option<DateBounds> {
    invoice_date_bounds_on(role, today_cairo())
}

/// Deterministic form of [`invoice_date_bounds`] for a given "today".
pub fn invoice_date_bounds_on(role: Role, today: NaiveDate) -> Option<DateBounds> {
    match role {
        Role::Manager => None,
        Role::Sales => Some(DateBounds {
            from: today,
            to: today,
        }),
        Role::Supervisor => Some(DateBounds {
            // 7 inclusive days ending today
            from: today - Days::new(6),
            to: today,
        }),
    }
}

// =============================================================================
// Clamping
// =============================================================================

/// Which edge of a window a bound protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    /// The bound is a lower limit; earlier dates are pulled up to it.
    Min,
    /// The bound is an upper limit; later dates are pulled down to it.
    Max,
}

/// Constrains a user-supplied filter date to a bound without rejecting the
/// request. An absent date resolves to the bound itself.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use dukkan_core::{clamp_date, Clamp};
///
/// let bound = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let early = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
///
/// assert_eq!(clamp_date(Some(early), bound, Clamp::Min), bound);
/// assert_eq!(clamp_date(None, bound, Clamp::Max), bound);
/// ```
pub fn clamp_date(supplied: Option<NaiveDate>, bound: NaiveDate, direction: Clamp) -> NaiveDate {
    match supplied {
        None => bound,
        Some(date) => match direction {
            Clamp::Min => {
                if date < bound {
                    bound
                } else {
                    date
                }
            }
            Clamp::Max => {
                if date > bound {
                    bound
                } else {
                    date
                }
            }
        },
    }
}

/// Parses a `YYYY-MM-DD` filter input. Empty or malformed input yields
/// `None`, which feeds the clamp's "absent" branch.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

// =============================================================================
// Report Presets
// =============================================================================

/// Named date ranges offered by the reports screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum DatePreset {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    #[serde(rename = "last-3-months")]
    LastThreeMonths,
    ThisYear,
}

impl DatePreset {
    /// Preset identifier used in query strings.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DatePreset::Today => "today",
            DatePreset::Yesterday => "yesterday",
            DatePreset::ThisWeek => "this-week",
            DatePreset::LastWeek => "last-week",
            DatePreset::ThisMonth => "this-month",
            DatePreset::LastMonth => "last-month",
            DatePreset::LastThreeMonths => "last-3-months",
            DatePreset::ThisYear => "this-year",
        }
    }

    /// Human-readable label for the preset picker.
    pub const fn label(&self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::Yesterday => "Yesterday",
            DatePreset::ThisWeek => "This Week",
            DatePreset::LastWeek => "Last Week",
            DatePreset::ThisMonth => "This Month",
            DatePreset::LastMonth => "Last Month",
            DatePreset::LastThreeMonths => "Last 3 Months",
            DatePreset::ThisYear => "This Year",
        }
    }

    /// Resolves the preset against the Cairo clock.
    pub fn range(&self) -> DateBounds {
        self.range_on(today_cairo())
    }

    /// Deterministic form of [`DatePreset::range`] for a given "today".
    ///
    /// Weeks start on Monday. "This *" ranges end today; `LastMonth` is the
    /// full previous calendar month.
    pub fn range_on(&self, today: NaiveDate) -> DateBounds {
        match self {
            DatePreset::Today => DateBounds {
                from: today,
                to: today,
            },
            DatePreset::Yesterday => {
                let yesterday = today - Days::new(1);
                DateBounds {
                    from: yesterday,
                    to: yesterday,
                }
            }
            DatePreset::ThisWeek => DateBounds {
                from: monday_of_week(today),
                to: today,
            },
            DatePreset::LastWeek => {
                let this_monday = monday_of_week(today);
                DateBounds {
                    from: this_monday - Days::new(7),
                    to: this_monday - Days::new(1),
                }
            }
            DatePreset::ThisMonth => DateBounds {
                from: first_of_month(today),
                to: today,
            },
            DatePreset::LastMonth => {
                let last_of_previous = first_of_month(today) - Days::new(1);
                DateBounds {
                    from: first_of_month(last_of_previous),
                    to: last_of_previous,
                }
            }
            DatePreset::LastThreeMonths => DateBounds {
                from: today - Months::new(3),
                to: today,
            },
            DatePreset::ThisYear => DateBounds {
                // ordinal 1 exists in every year
                from: today.with_ordinal(1).unwrap_or(today),
                to: today,
            },
        }
    }
}

impl FromStr for DatePreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(DatePreset::Today),
            "yesterday" => Ok(DatePreset::Yesterday),
            "this-week" => Ok(DatePreset::ThisWeek),
            "last-week" => Ok(DatePreset::LastWeek),
            "this-month" => Ok(DatePreset::ThisMonth),
            "last-month" => Ok(DatePreset::LastMonth),
            "last-3-months" => Ok(DatePreset::LastThreeMonths),
            "this-year" => Ok(DatePreset::ThisYear),
            other => Err(ValidationError::InvalidFormat {
                field: "preset".to_string(),
                reason: format!("unknown preset '{other}'"),
            }),
        }
    }
}

fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cairo_date_shifts_by_two_hours() {
        // 23:30 UTC is already the next civil day in Cairo
        let at = DateTime::parse_from_rfc3339("2024-03-10T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(cairo_date(at), date(2024, 3, 11));

        let at = DateTime::parse_from_rfc3339("2024-03-10T21:59:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(cairo_date(at), date(2024, 3, 10));
    }

    #[test]
    fn test_manager_is_unbounded() {
        assert_eq!(invoice_date_bounds_on(Role::Manager, date(2024, 3, 10)), None);
    }

    #[test]
    fn test_sales_sees_only_today() {
        let today = date(2024, 3, 10);
        let bounds = invoice_date_bounds_on(Role::Sales, today).unwrap();
        assert_eq!(bounds.from, today);
        assert_eq!(bounds.to, today);
    }

    #[test]
    fn test_supervisor_sees_trailing_seven_days() {
        let today = date(2024, 3, 10);
        let bounds = invoice_date_bounds_on(Role::Supervisor, today).unwrap();
        assert_eq!(bounds.from, date(2024, 3, 4));
        assert_eq!(bounds.to, today);
        // inclusive span of exactly 7 days
        assert_eq!((bounds.to - bounds.from).num_days(), 6);
        assert!(bounds.contains(bounds.from));
        assert!(bounds.contains(today));
        assert!(!bounds.contains(date(2024, 3, 3)));
    }

    #[test]
    fn test_clamp_date() {
        let bound = date(2024, 1, 5);

        assert_eq!(clamp_date(Some(date(2024, 1, 1)), bound, Clamp::Min), bound);
        assert_eq!(
            clamp_date(Some(date(2024, 1, 7)), bound, Clamp::Min),
            date(2024, 1, 7)
        );
        assert_eq!(clamp_date(Some(date(2024, 1, 10)), bound, Clamp::Max), bound);
        assert_eq!(
            clamp_date(Some(date(2024, 1, 2)), bound, Clamp::Max),
            date(2024, 1, 2)
        );
        assert_eq!(clamp_date(None, bound, Clamp::Min), bound);
        assert_eq!(clamp_date(None, bound, Clamp::Max), bound);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("  2024-01-05  "), Some(date(2024, 1, 5)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("05/01/2024"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_preset_week_ranges() {
        // 2024-03-10 is a Sunday
        let today = date(2024, 3, 10);

        let this_week = DatePreset::ThisWeek.range_on(today);
        assert_eq!(this_week.from, date(2024, 3, 4)); // Monday
        assert_eq!(this_week.to, today);

        let last_week = DatePreset::LastWeek.range_on(today);
        assert_eq!(last_week.from, date(2024, 2, 26));
        assert_eq!(last_week.to, date(2024, 3, 3));
    }

    #[test]
    fn test_preset_month_ranges() {
        let today = date(2024, 3, 10);

        let this_month = DatePreset::ThisMonth.range_on(today);
        assert_eq!(this_month.from, date(2024, 3, 1));
        assert_eq!(this_month.to, today);

        let last_month = DatePreset::LastMonth.range_on(today);
        assert_eq!(last_month.from, date(2024, 2, 1));
        assert_eq!(last_month.to, date(2024, 2, 29)); // leap year
    }

    #[test]
    fn test_preset_longer_ranges() {
        let today = date(2024, 3, 31);

        let last_three = DatePreset::LastThreeMonths.range_on(today);
        // three calendar months back, day clamped to the month's end
        assert_eq!(last_three.from, date(2023, 12, 31));
        assert_eq!(last_three.to, today);

        let this_year = DatePreset::ThisYear.range_on(today);
        assert_eq!(this_year.from, date(2024, 1, 1));
    }

    #[test]
    fn test_preset_ids_round_trip() {
        for preset in [
            DatePreset::Today,
            DatePreset::Yesterday,
            DatePreset::ThisWeek,
            DatePreset::LastWeek,
            DatePreset::ThisMonth,
            DatePreset::LastMonth,
            DatePreset::LastThreeMonths,
            DatePreset::ThisYear,
        ] {
            assert_eq!(preset.as_str().parse::<DatePreset>().unwrap(), preset);
        }
        assert!("last-year".parse::<DatePreset>().is_err());
    }
}
