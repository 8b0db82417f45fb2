//! Calendar windows in UTC
//!
//! Month, year and day boundaries are all computed in UTC. Query strings
//! accept either RFC 3339 timestamps or bare `YYYY-MM-DD` dates.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{Error, Result};
use crate::models::DateRange;

/// First instant of the month containing `dt`
pub fn month_start(dt: DateTime<Utc>) -> DateTime<Utc> {
    let date = dt.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// First instant of the month after the one containing `dt`
pub fn next_month_start(dt: DateTime<Utc>) -> DateTime<Utc> {
    let start = month_start(dt);
    start.checked_add_months(Months::new(1)).unwrap_or(start)
}

/// Last instant of the month containing `dt`
pub fn month_end(dt: DateTime<Utc>) -> DateTime<Utc> {
    next_month_start(dt) - Duration::nanoseconds(1)
}

/// First instant of the month before the one containing `dt`
pub fn previous_month(dt: DateTime<Utc>) -> DateTime<Utc> {
    let start = month_start(dt);
    start.checked_sub_months(Months::new(1)).unwrap_or(start)
}

/// First and last instant of a UTC calendar year
pub fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| Error::InvalidInput(format!("Year out of range: {}", year)))?;
    let next = year
        .checked_add(1)
        .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .ok_or_else(|| Error::InvalidInput(format!("Year out of range: {}", year)))?;

    let start = first.and_time(NaiveTime::MIN).and_utc();
    let end = next.and_time(NaiveTime::MIN).and_utc() - Duration::nanoseconds(1);
    Ok((start, end))
}

/// Parse one bound of a date range.
///
/// A bare date means the start of that day, or its last second when `is_end`.
pub fn parse_bound(value: &str, is_end: bool) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = if is_end {
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
        } else {
            NaiveTime::MIN
        };
        return Ok(date.and_time(time).and_utc());
    }

    Err(Error::InvalidInput(format!(
        "Invalid date '{}' (use YYYY-MM-DD or RFC 3339)",
        value
    )))
}

/// Build a range from optional query-string bounds. Empty strings count as absent.
pub fn parse_date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let start = start
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_bound(s, false))
        .transpose()?;
    let end = end
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_bound(s, true))
        .transpose()?;
    Ok(DateRange::new(start, end))
}

/// Named report periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    ThisMonth,
    LastMonth,
    ThisYear,
    Last30Days,
    Last90Days,
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::ThisYear => "this-year",
            Self::Last30Days => "last-30-days",
            Self::Last90Days => "last-90-days",
            Self::All => "all",
        }
    }

    /// The window this period covers relative to `now`
    pub fn range(&self, now: DateTime<Utc>) -> DateRange {
        match self {
            Self::ThisMonth => DateRange::between(month_start(now), now),
            Self::LastMonth => {
                let prev = previous_month(now);
                DateRange::between(prev, month_end(prev))
            }
            Self::ThisYear => match year_bounds(now.year()) {
                Ok((start, _)) => DateRange::between(start, now),
                Err(_) => DateRange::default(),
            },
            Self::Last30Days => DateRange::between(now - Duration::days(30), now),
            Self::Last90Days => DateRange::between(now - Duration::days(90), now),
            Self::All => DateRange::default(),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "this-month" => Ok(Self::ThisMonth),
            "last-month" => Ok(Self::LastMonth),
            "this-year" => Ok(Self::ThisYear),
            "last-30-days" => Ok(Self::Last30Days),
            "last-90-days" => Ok(Self::Last90Days),
            "all" => Ok(Self::All),
            _ => Err(format!(
                "Unknown period: {}. Available: this-month, last-month, this-year, last-30-days, last-90-days, all",
                s
            )),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_month_boundaries() {
        let now = at(2024, 3, 15, 10, 30, 0);
        assert_eq!(month_start(now), at(2024, 3, 1, 0, 0, 0));
        assert_eq!(next_month_start(now), at(2024, 4, 1, 0, 0, 0));
        assert_eq!(previous_month(now), at(2024, 2, 1, 0, 0, 0));

        let end = month_end(now);
        assert_eq!(end.day(), 31);
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert!(end < at(2024, 4, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_boundaries_across_year() {
        let jan = at(2024, 1, 20, 0, 0, 0);
        assert_eq!(previous_month(jan), at(2023, 12, 1, 0, 0, 0));

        let dec = at(2023, 12, 5, 0, 0, 0);
        assert_eq!(next_month_start(dec), at(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_leap_february_end() {
        let end = month_end(at(2024, 2, 10, 0, 0, 0));
        assert_eq!(end.day(), 29);
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start, at(2024, 1, 1, 0, 0, 0));
        assert_eq!(end.year(), 2024);
        assert_eq!((end.month(), end.day()), (12, 31));
    }

    #[test]
    fn test_parse_bound_formats() {
        assert_eq!(
            parse_bound("2024-05-01", false).unwrap(),
            at(2024, 5, 1, 0, 0, 0)
        );
        assert_eq!(
            parse_bound("2024-05-01", true).unwrap(),
            at(2024, 5, 1, 23, 59, 59)
        );
        assert_eq!(
            parse_bound("2024-05-01T08:00:00+02:00", false).unwrap(),
            at(2024, 5, 1, 6, 0, 0)
        );
        assert!(matches!(
            parse_bound("yesterday", false),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_date_range_optional_bounds() {
        let range = parse_date_range(None, Some("2024-01-31")).unwrap();
        assert!(range.start.is_none());
        assert_eq!(range.end, Some(at(2024, 1, 31, 23, 59, 59)));

        let empty = parse_date_range(Some(""), None).unwrap();
        assert!(empty.is_unbounded());
    }

    #[test]
    fn test_period_ranges() {
        let now = at(2024, 3, 15, 12, 0, 0);

        let this_month = Period::ThisMonth.range(now);
        assert_eq!(this_month.start, Some(at(2024, 3, 1, 0, 0, 0)));
        assert_eq!(this_month.end, Some(now));

        let last_month = Period::LastMonth.range(now);
        assert_eq!(last_month.start, Some(at(2024, 2, 1, 0, 0, 0)));
        assert!(last_month.contains(&at(2024, 2, 29, 23, 59, 59)));
        assert!(!last_month.contains(&at(2024, 3, 1, 0, 0, 0)));

        assert!(Period::All.range(now).is_unbounded());
        assert_eq!(
            Period::Last30Days.range(now).start,
            Some(now - Duration::days(30))
        );
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("this-year".parse::<Period>().unwrap(), Period::ThisYear);
        assert_eq!("LAST-90-DAYS".parse::<Period>().unwrap(), Period::Last90Days);
        assert!("fortnight".parse::<Period>().is_err());
    }
}
