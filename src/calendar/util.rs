use std::iter::successors;
use thiserror::Error;
use time::{Date, Month, Month::*, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

/// Column headings for a Monday-first week
pub(crate) static WEEKDAY_HEADER: [&str; DAYS_IN_WEEK] =
    ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

pub(crate) trait WeekdayExt {
    fn abbr(&self) -> &'static str;
}

impl WeekdayExt for Weekday {
    fn abbr(&self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }
}

pub(crate) trait MonthExt {
    fn abbr(&self) -> &'static str;
}

impl MonthExt for Month {
    fn abbr(&self) -> &'static str {
        match self {
            January => "Jan",
            February => "Feb",
            March => "Mar",
            April => "Apr",
            May => "May",
            June => "Jun",
            July => "Jul",
            August => "Aug",
            September => "Sep",
            October => "Oct",
            November => "Nov",
            December => "Dec",
        }
    }
}

/// Parses an English three-letter month abbreviation.  Matching is
/// case-sensitive, so "Jan" is accepted but "jan" and "JAN" are not.
pub(crate) fn parse_month_abbr(s: &str) -> Result<Month, ParseMonthError> {
    match s {
        "Jan" => Ok(January),
        "Feb" => Ok(February),
        "Mar" => Ok(March),
        "Apr" => Ok(April),
        "May" => Ok(May),
        "Jun" => Ok(June),
        "Jul" => Ok(July),
        "Aug" => Ok(August),
        "Sep" => Ok(September),
        "Oct" => Ok(October),
        "Nov" => Ok(November),
        "Dec" => Ok(December),
        _ => Err(ParseMonthError(s.to_owned())),
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown month abbreviation {0:?}")]
pub(crate) struct ParseMonthError(pub(crate) String);

pub(super) fn iter_days_after(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day()).skip(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_month_abbr() {
        assert_eq!(parse_month_abbr("Jan"), Ok(January));
        assert_eq!(parse_month_abbr("Sep"), Ok(September));
        assert_eq!(parse_month_abbr("Dec"), Ok(December));
    }

    #[test]
    fn test_parse_month_abbr_is_case_sensitive() {
        assert_eq!(
            parse_month_abbr("jan"),
            Err(ParseMonthError(String::from("jan")))
        );
        assert!(parse_month_abbr("JAN").is_err());
        assert!(parse_month_abbr("January").is_err());
        assert!(parse_month_abbr("").is_err());
    }

    #[test]
    fn test_abbr_round_trip() {
        let mut month = January;
        for _ in 0..12 {
            assert_eq!(parse_month_abbr(month.abbr()), Ok(month));
            month = month.next();
        }
        assert_eq!(month, January);
    }

    #[test]
    fn test_weekday_abbr() {
        assert_eq!(Weekday::Monday.abbr(), "Mon");
        assert_eq!(Weekday::Sunday.abbr(), "Sun");
    }

    #[test]
    fn test_iter_days_after_crosses_year() {
        let mut iter = iter_days_after(date!(2023 - 12 - 30));
        assert_eq!(iter.next(), Some(date!(2023 - 12 - 31)));
        assert_eq!(iter.next(), Some(date!(2024 - 01 - 01)));
        assert_eq!(iter.next(), Some(date!(2024 - 01 - 02)));
    }
}
