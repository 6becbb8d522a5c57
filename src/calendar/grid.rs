use super::format::DisplayFormat;
use super::util::{iter_days_after, MonthExt, DAYS_IN_WEEK};
use std::slice::ChunksExact;
use thiserror::Error;
use time::{Date, Month, Weekday::*};

/// If the previous-month padding plus the days of the month come to fewer
/// than this many cells, the next-month padding runs for two weeks instead
/// of one
const SHORT_GRID_THRESHOLD: usize = 5 * DAYS_IN_WEEK;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Membership {
    PreviousMonth,
    CurrentMonth,
    NextMonth,
}

/// One square of the grid: a date, its rendering in the configured display
/// format, and which month of the view it belongs to
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DayCell {
    date: Date,
    formatted: String,
    membership: Membership,
}

impl DayCell {
    fn new(date: Date, membership: Membership, format: &DisplayFormat) -> DayCell {
        DayCell {
            date,
            formatted: format.render(date),
            membership,
        }
    }

    pub(crate) fn date(&self) -> Date {
        self.date
    }

    pub(crate) fn day(&self) -> u8 {
        self.date.day()
    }

    pub(crate) fn month(&self) -> Month {
        self.date.month()
    }

    pub(crate) fn month_abbr(&self) -> &'static str {
        self.date.month().abbr()
    }

    pub(crate) fn year(&self) -> i32 {
        self.date.year()
    }

    pub(crate) fn formatted(&self) -> &str {
        &self.formatted
    }

    pub(crate) fn membership(&self) -> Membership {
        self.membership
    }
}

/// The full set of cells shown for one month: whole Monday-to-Sunday weeks,
/// in ascending date order
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Grid {
    month: Month,
    year: i32,
    cells: Vec<DayCell>,
}

impl Grid {
    pub(crate) fn build(
        month: Month,
        year: i32,
        format: &DisplayFormat,
    ) -> Result<Grid, OutOfTimeError> {
        let first = Date::from_calendar_date(year, month, 1).map_err(|_| OutOfTimeError)?;
        let previous = days_back_to_monday(first.previous_day().ok_or(OutOfTimeError)?)?;
        let current = std::iter::once(first)
            .chain(iter_days_after(first).take_while(|d| d.month() == month))
            .collect::<Vec<_>>();
        let cycles = if previous.len() + current.len() < SHORT_GRID_THRESHOLD {
            2
        } else {
            1
        };
        let mut next = Vec::with_capacity(cycles * DAYS_IN_WEEK);
        let mut cursor = current.last().copied().unwrap_or(first);
        for _ in 0..cycles {
            cursor = cursor.next_day().ok_or(OutOfTimeError)?;
            let week_tail = days_forward_to_sunday(cursor)?;
            cursor = week_tail.last().copied().unwrap_or(cursor);
            next.extend(week_tail);
        }
        let mut cells = Vec::with_capacity(previous.len() + current.len() + next.len());
        for (days, membership) in [
            (previous, Membership::PreviousMonth),
            (current, Membership::CurrentMonth),
            (next, Membership::NextMonth),
        ] {
            cells.extend(
                days.into_iter()
                    .map(|date| DayCell::new(date, membership, format)),
            );
        }
        Ok(Grid { month, year, cells })
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn weeks(&self) -> ChunksExact<'_, DayCell> {
        self.cells.chunks_exact(DAYS_IN_WEEK)
    }

    pub(crate) fn week_count(&self) -> usize {
        self.cells.len() / DAYS_IN_WEEK
    }

    /// Returns the index of the cell for `date`, if it is shown
    pub(crate) fn position(&self, date: Date) -> Option<usize> {
        self.cells.iter().position(|c| c.date == date)
    }

    /// Returns the index of the first day of the displayed month
    pub(crate) fn first_of_month(&self) -> Option<usize> {
        self.cells
            .iter()
            .position(|c| c.membership == Membership::CurrentMonth)
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

// Walks backwards from `date` to the nearest Monday at or before it and
// returns the days walked in ascending order
fn days_back_to_monday(date: Date) -> Result<Vec<Date>, OutOfTimeError> {
    let mut days = Vec::with_capacity(DAYS_IN_WEEK);
    let mut cursor = date;
    days.push(cursor);
    while cursor.weekday() != Monday {
        cursor = cursor.previous_day().ok_or(OutOfTimeError)?;
        days.push(cursor);
    }
    days.reverse();
    Ok(days)
}

// Walks forwards from `date` to the nearest Sunday at or after it
fn days_forward_to_sunday(date: Date) -> Result<Vec<Date>, OutOfTimeError> {
    let mut days = Vec::with_capacity(DAYS_IN_WEEK);
    let mut cursor = date;
    days.push(cursor);
    while cursor.weekday() != Sunday {
        cursor = cursor.next_day().ok_or(OutOfTimeError)?;
        days.push(cursor);
    }
    Ok(days)
}
