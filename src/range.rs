//! Date range resolution for report queries.
//!
//! Quick-range tokens are resolved against an explicit reference date so the
//! same selection always yields the same bounds.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{AppError, Result};

/// Inclusive calendar-day interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppError::invalid_range(format!("start {start} is after end {end}")));
        }
        Ok(Self { start, end })
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Check if a date falls inside the range (bounds included).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day of the range in ascending order.
    pub fn iter_days(self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Named date-range selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickRangeToken {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    Custom,
}

impl QuickRangeToken {
    /// Wire name used in query strings and export file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Last7Days => "last_7_days",
            Self::Last30Days => "last_30_days",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for QuickRangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuickRangeToken {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "last_7_days" => Ok(Self::Last7Days),
            "last_30_days" => Ok(Self::Last30Days),
            // "month" is the older name for this_month
            "this_month" | "month" => Ok(Self::ThisMonth),
            "last_month" => Ok(Self::LastMonth),
            "custom" => Ok(Self::Custom),
            _ => Err(AppError::invalid_range(format!("Unknown range '{s}'"))),
        }
    }
}

/// Resolve a range token into concrete bounds.
///
/// `explicit` is only consulted for [`QuickRangeToken::Custom`], which
/// requires it.
pub fn resolve(
    token: QuickRangeToken,
    explicit: Option<(NaiveDate, NaiveDate)>,
    reference_date: NaiveDate,
) -> Result<DateRange> {
    let d = reference_date;
    let range = match token {
        QuickRangeToken::Today => DateRange::day(d),
        QuickRangeToken::Yesterday => DateRange::day(days_before(d, 1)?),
        QuickRangeToken::Last7Days => DateRange {
            start: days_before(d, 6)?,
            end: d,
        },
        QuickRangeToken::Last30Days => DateRange {
            start: days_before(d, 29)?,
            end: d,
        },
        QuickRangeToken::ThisMonth => DateRange {
            start: first_of_month(d),
            end: d,
        },
        QuickRangeToken::LastMonth => {
            let end = days_before(first_of_month(d), 1)?;
            DateRange {
                start: first_of_month(end),
                end,
            }
        }
        QuickRangeToken::Custom => {
            let (start, end) =
                explicit.ok_or_else(|| AppError::invalid_range("Custom range requires start and end dates"))?;
            DateRange::new(start, end)?
        }
    };

    Ok(range)
}

/// Resolve with textual custom bounds, as typed by the user.
pub fn resolve_input(
    token: QuickRangeToken,
    start: Option<&str>,
    end: Option<&str>,
    reference_date: NaiveDate,
) -> Result<DateRange> {
    let explicit = match (start, end) {
        (Some(s), Some(e)) => Some((parse_bound(s)?, parse_bound(e)?)),
        (None, None) => None,
        _ if token == QuickRangeToken::Custom => {
            return Err(AppError::invalid_range("Please select both start and end dates"));
        }
        _ => None,
    };
    resolve(token, explicit, reference_date)
}

fn parse_bound(input: &str) -> Result<NaiveDate> {
    parse_flexible_date(input).ok_or_else(|| AppError::invalid_range(format!("Invalid date '{input}'")))
}

/// Parse date from multiple formats: "2000-1-1", "2000/1/1", "2000 1 1", "2000.1.1"
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    let parts: Vec<&str> = input
        .split(['-', '/', ' ', '.'])
        .filter(|s| !s.is_empty())
        .collect();

    if parts.len() != 3 {
        return None;
    }

    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn days_before(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| AppError::invalid_range(format!("{days} days before {date} is out of range")))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today_is_single_day() {
        for d in [ymd(2024, 1, 1), ymd(2024, 2, 29), ymd(2023, 12, 31)] {
            let range = resolve(QuickRangeToken::Today, None, d).unwrap();
            assert_eq!((range.start(), range.end()), (d, d));
        }
    }

    #[test]
    fn test_yesterday_crosses_year() {
        let range = resolve(QuickRangeToken::Yesterday, None, ymd(2024, 1, 1)).unwrap();
        assert_eq!(range, DateRange::day(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_last_7_days_spans_seven_days() {
        for d in [ymd(2024, 3, 3), ymd(2024, 1, 2), ymd(2024, 3, 1)] {
            let range = resolve(QuickRangeToken::Last7Days, None, d).unwrap();
            assert_eq!(range.end(), d);
            assert_eq!(range.days(), 7);
        }
    }

    #[test]
    fn test_last_30_days() {
        let range = resolve(QuickRangeToken::Last30Days, None, ymd(2024, 3, 15)).unwrap();
        assert_eq!(range.start(), ymd(2024, 2, 15));
        assert_eq!(range.days(), 30);
    }

    #[test]
    fn test_this_month() {
        let range = resolve(QuickRangeToken::ThisMonth, None, ymd(2024, 3, 15)).unwrap();
        assert_eq!(range.start(), ymd(2024, 3, 1));
        assert_eq!(range.end(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_last_month_in_january_rolls_back_a_year() {
        for day in [1, 15, 31] {
            let range = resolve(QuickRangeToken::LastMonth, None, ymd(2024, 1, day)).unwrap();
            assert_eq!(range.start(), ymd(2023, 12, 1));
            assert_eq!(range.end(), ymd(2023, 12, 31));
        }
    }

    #[test]
    fn test_last_month_leap_february() {
        let range = resolve(QuickRangeToken::LastMonth, None, ymd(2024, 3, 31)).unwrap();
        assert_eq!(range.start(), ymd(2024, 2, 1));
        assert_eq!(range.end(), ymd(2024, 2, 29));
    }

    #[test]
    fn test_custom_requires_bounds() {
        let err = resolve(QuickRangeToken::Custom, None, ymd(2024, 3, 15)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }

    #[test]
    fn test_custom_rejects_inverted_bounds() {
        let d = ymd(2024, 3, 15);
        let inverted = Some((ymd(2024, 3, 10), ymd(2024, 3, 9)));
        assert!(matches!(
            resolve(QuickRangeToken::Custom, inverted, d),
            Err(AppError::InvalidRange(_))
        ));

        let single = Some((ymd(2024, 3, 10), ymd(2024, 3, 10)));
        assert_eq!(
            resolve(QuickRangeToken::Custom, single, d).unwrap(),
            DateRange::day(ymd(2024, 3, 10))
        );
    }

    #[test]
    fn test_explicit_bounds_ignored_for_named_tokens() {
        let explicit = Some((ymd(2020, 1, 1), ymd(2020, 1, 2)));
        let range = resolve(QuickRangeToken::Today, explicit, ymd(2024, 3, 15)).unwrap();
        assert_eq!(range, DateRange::day(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_resolve_input_flexible_formats() {
        let range = resolve_input(
            QuickRangeToken::Custom,
            Some("2024/3/1"),
            Some("2024.3.9"),
            ymd(2024, 3, 15),
        )
        .unwrap();
        assert_eq!(range.start(), ymd(2024, 3, 1));
        assert_eq!(range.end(), ymd(2024, 3, 9));
    }

    #[test]
    fn test_resolve_input_rejects_garbage_and_half_ranges() {
        let d = ymd(2024, 3, 15);
        assert!(resolve_input(QuickRangeToken::Custom, Some("yesterday-ish"), Some("2024-03-01"), d).is_err());
        assert!(resolve_input(QuickRangeToken::Custom, Some("2024-03-01"), None, d).is_err());
    }

    #[test]
    fn test_token_round_trips_wire_names() {
        for token in [
            QuickRangeToken::Today,
            QuickRangeToken::Yesterday,
            QuickRangeToken::Last7Days,
            QuickRangeToken::Last30Days,
            QuickRangeToken::ThisMonth,
            QuickRangeToken::LastMonth,
            QuickRangeToken::Custom,
        ] {
            assert_eq!(token.as_str().parse::<QuickRangeToken>().unwrap(), token);
        }
        assert_eq!("month".parse::<QuickRangeToken>().unwrap(), QuickRangeToken::ThisMonth);
        assert_eq!("last-7-days".parse::<QuickRangeToken>().unwrap(), QuickRangeToken::Last7Days);
    }

    #[test]
    fn test_earliest_date_errors_instead_of_overflowing() {
        for token in [
            QuickRangeToken::Yesterday,
            QuickRangeToken::Last7Days,
            QuickRangeToken::Last30Days,
            QuickRangeToken::LastMonth,
        ] {
            let err = resolve(token, None, NaiveDate::MIN).unwrap_err();
            assert!(matches!(err, AppError::InvalidRange(_)), "{token}: {err}");
        }

        assert_eq!(
            resolve(QuickRangeToken::Today, None, NaiveDate::MIN).unwrap(),
            DateRange::day(NaiveDate::MIN)
        );
        assert!(resolve(QuickRangeToken::ThisMonth, None, NaiveDate::MIN).is_ok());
    }

    #[test]
    fn test_iter_days_inclusive() {
        let range = DateRange::new(ymd(2024, 2, 27), ymd(2024, 3, 1)).unwrap();
        let days: Vec<_> = range.iter_days().collect();
        assert_eq!(days, vec![ymd(2024, 2, 27), ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]);
        assert!(range.contains(ymd(2024, 3, 1)));
        assert!(!range.contains(ymd(2024, 3, 2)));
    }

    #[test]
    fn test_parse_flexible_date() {
        assert_eq!(parse_flexible_date("2000-1-1"), Some(ymd(2000, 1, 1)));
        assert_eq!(parse_flexible_date(" 2000 12 31 "), Some(ymd(2000, 12, 31)));
        assert_eq!(parse_flexible_date("2000-02-30"), None);
        assert_eq!(parse_flexible_date("2000-02"), None);
    }
}
