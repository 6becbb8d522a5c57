use super::util::{MonthExt, WeekdayExt, WEEKDAY_HEADER};
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;
use time::Date;

/// A display format for dates, written with moment-style placeholders:
///
/// - `D`, `DD`: day of the month, unpadded or zero-padded to two digits
/// - `Do`: day of the month as an ordinal ("1st", "22nd")
/// - `DDD`, `DDDD`: day of the year, unpadded or zero-padded to three digits
/// - `M`, `MM`: month number, unpadded or zero-padded to two digits
/// - `MMM`, `MMMM`: month abbreviation ("Jan") or full name ("January")
/// - `YY`, `YYYY`: last two digits of the year, or the year padded to four
/// - `d`: day of the week as a number, 0 for Sunday through 6 for Saturday
/// - `dd`, `ddd`, `dddd`: weekday as "Mo", "Mon" or "Monday"
/// - `[...]`: literal text
///
/// Only these placeholders are recognised.  Any other character, including
/// the letters of other moment placeholders, is copied through unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DisplayFormat(Vec<Token>);

#[derive(Clone, Debug, Eq, PartialEq)]
enum Token {
    Day,
    DayPadded,
    DayOrdinal,
    DayOfYear,
    DayOfYearPadded,
    Month,
    MonthPadded,
    MonthAbbr,
    MonthName,
    YearShort,
    Year,
    WeekdayNumber,
    WeekdayShort,
    WeekdayAbbr,
    WeekdayName,
    Literal(String),
}

impl DisplayFormat {
    pub(crate) fn parse(s: &str) -> Result<DisplayFormat, FormatError> {
        let mut tokens = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                'D' => match take_run(&mut chars, 'D', 4) {
                    4 => tokens.push(Token::DayOfYearPadded),
                    3 => tokens.push(Token::DayOfYear),
                    2 => tokens.push(Token::DayPadded),
                    _ if chars.next_if_eq(&'o').is_some() => tokens.push(Token::DayOrdinal),
                    _ => tokens.push(Token::Day),
                },
                'M' => match take_run(&mut chars, 'M', 4) {
                    4 => tokens.push(Token::MonthName),
                    3 => tokens.push(Token::MonthAbbr),
                    2 => tokens.push(Token::MonthPadded),
                    _ => tokens.push(Token::Month),
                },
                'Y' => match take_run(&mut chars, 'Y', 4) {
                    4 | 1 => tokens.push(Token::Year),
                    2 => tokens.push(Token::YearShort),
                    _ => tokens.extend([Token::YearShort, Token::Year]),
                },
                'd' => match take_run(&mut chars, 'd', 4) {
                    4 => tokens.push(Token::WeekdayName),
                    3 => tokens.push(Token::WeekdayAbbr),
                    2 => tokens.push(Token::WeekdayShort),
                    _ => tokens.push(Token::WeekdayNumber),
                },
                '[' => {
                    let mut text = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(c) => text.push(c),
                            None => return Err(FormatError::UnterminatedLiteral),
                        }
                    }
                    push_literal(&mut tokens, &text);
                }
                c => push_literal(&mut tokens, c.encode_utf8(&mut [0; 4])),
            }
        }
        Ok(DisplayFormat(tokens))
    }

    pub(crate) fn render(&self, date: Date) -> String {
        Rendered { format: self, date }.to_string()
    }
}

impl Default for DisplayFormat {
    /// `DD/MM/YYYY`
    fn default() -> DisplayFormat {
        DisplayFormat(vec![
            Token::DayPadded,
            Token::Literal(String::from("/")),
            Token::MonthPadded,
            Token::Literal(String::from("/")),
            Token::Year,
        ])
    }
}

impl FromStr for DisplayFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<DisplayFormat, FormatError> {
        DisplayFormat::parse(s)
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum FormatError {
    #[error("unterminated '[' in display format")]
    UnterminatedLiteral,
}

#[derive(Clone, Copy, Debug)]
struct Rendered<'a> {
    format: &'a DisplayFormat,
    date: Date,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date;
        for token in &self.format.0 {
            match token {
                Token::Day => write!(f, "{}", date.day())?,
                Token::DayPadded => write!(f, "{:02}", date.day())?,
                Token::DayOrdinal => write!(f, "{}{}", date.day(), ordinal_suffix(date.day()))?,
                Token::DayOfYear => write!(f, "{}", date.ordinal())?,
                Token::DayOfYearPadded => write!(f, "{:03}", date.ordinal())?,
                Token::Month => write!(f, "{}", u8::from(date.month()))?,
                Token::MonthPadded => write!(f, "{:02}", u8::from(date.month()))?,
                Token::MonthAbbr => f.write_str(date.month().abbr())?,
                Token::MonthName => write!(f, "{}", date.month())?,
                Token::YearShort => write!(f, "{:02}", date.year().rem_euclid(100))?,
                Token::Year => write!(f, "{:04}", date.year())?,
                Token::WeekdayNumber => write!(f, "{}", date.weekday().number_days_from_sunday())?,
                Token::WeekdayShort => f.write_str(
                    WEEKDAY_HEADER[usize::from(date.weekday().number_days_from_monday())],
                )?,
                Token::WeekdayAbbr => f.write_str(date.weekday().abbr())?,
                Token::WeekdayName => write!(f, "{}", date.weekday())?,
                Token::Literal(s) => f.write_str(s)?,
            }
        }
        Ok(())
    }
}

// Consumes further repeats of `ch` (which has already been consumed once)
// and returns the total length of the run, capped at `max`
fn take_run(chars: &mut Peekable<Chars<'_>>, ch: char, max: usize) -> usize {
    let mut n = 1;
    while n < max && chars.next_if_eq(&ch).is_some() {
        n += 1;
    }
    n
}

fn ordinal_suffix(day: u8) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn push_literal(tokens: &mut Vec<Token>, s: &str) {
    if let Some(Token::Literal(prev)) = tokens.last_mut() {
        prev.push_str(s);
    } else {
        tokens.push(Token::Literal(s.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn render(fmt: &str, date: Date) -> String {
        DisplayFormat::parse(fmt).unwrap().render(date)
    }

    #[test]
    fn test_default() {
        let fmt = DisplayFormat::default();
        assert_eq!(fmt, DisplayFormat::parse("DD/MM/YYYY").unwrap());
        assert_eq!(fmt.render(date!(1987 - 12 - 03)), "03/12/1987");
    }

    #[test]
    fn test_unpadded() {
        assert_eq!(render("D.M.YYYY", date!(2024 - 02 - 05)), "5.2.2024");
        assert_eq!(render("D.M.YYYY", date!(2024 - 11 - 25)), "25.11.2024");
    }

    #[test]
    fn test_iso() {
        assert_eq!(render("YYYY-MM-DD", date!(2022 - 06 - 15)), "2022-06-15");
    }

    #[test]
    fn test_names() {
        assert_eq!(
            render("dddd, D MMMM YYYY", date!(2024 - 02 - 29)),
            "Thursday, 29 February 2024"
        );
        assert_eq!(
            render("ddd DD MMM YY", date!(2009 - 09 - 07)),
            "Mon 07 Sep 09"
        );
    }

    #[test]
    fn test_bracketed_literal() {
        assert_eq!(
            render("[Day] D [of] MMM", date!(2021 - 03 - 01)),
            "Day 1 of Mar"
        );
    }

    #[test]
    fn test_unknown_letters_are_literal() {
        assert_eq!(render("DD-MM (x)", date!(2021 - 03 - 01)), "01-03 (x)");
        assert_eq!(render("Q h:mm", date!(2021 - 03 - 01)), "Q h:mm");
    }

    #[test]
    fn test_ordinal_day() {
        let fmt = DisplayFormat::parse("Do MMMM").unwrap();
        assert_eq!(fmt.render(date!(2024 - 02 - 01)), "1st February");
        assert_eq!(fmt.render(date!(2024 - 02 - 02)), "2nd February");
        assert_eq!(fmt.render(date!(2024 - 02 - 03)), "3rd February");
        assert_eq!(fmt.render(date!(2024 - 02 - 04)), "4th February");
        assert_eq!(fmt.render(date!(2024 - 02 - 11)), "11th February");
        assert_eq!(fmt.render(date!(2024 - 02 - 12)), "12th February");
        assert_eq!(fmt.render(date!(2024 - 02 - 13)), "13th February");
        assert_eq!(fmt.render(date!(2024 - 02 - 21)), "21st February");
        assert_eq!(fmt.render(date!(2024 - 02 - 22)), "22nd February");
        assert_eq!(fmt.render(date!(2024 - 02 - 23)), "23rd February");
        assert_eq!(fmt.render(date!(2024 - 01 - 31)), "31st January");
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(render("DDD", date!(2024 - 02 - 05)), "36");
        assert_eq!(render("DDDD", date!(2024 - 02 - 05)), "036");
        assert_eq!(render("DDDD", date!(2024 - 12 - 31)), "366");
    }

    #[test]
    fn test_weekday_number_and_short_name() {
        // 2021-03-01 is a Monday, 2021-03-07 a Sunday
        assert_eq!(render("d dd", date!(2021 - 03 - 01)), "1 Mo");
        assert_eq!(render("d dd", date!(2021 - 03 - 07)), "0 Su");
        assert_eq!(render("d DD", date!(2021 - 03 - 06)), "6 06");
    }

    #[test]
    fn test_two_digit_year_wraps() {
        assert_eq!(render("YY", date!(2000 - 01 - 01)), "00");
        assert_eq!(render("YY", date!(1999 - 01 - 01)), "99");
    }

    #[test]
    fn test_unterminated_literal() {
        assert_eq!(
            DisplayFormat::parse("DD [oops"),
            Err(FormatError::UnterminatedLiteral)
        );
    }

    #[test]
    fn test_from_str() {
        let fmt = "MM/DD/YYYY".parse::<DisplayFormat>().unwrap();
        assert_eq!(fmt.render(date!(1987 - 12 - 03)), "12/03/1987");
    }
}
