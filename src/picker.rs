use crate::calendar::{
    parse_month_abbr, DayCell, DisplayFormat, Grid, OutOfTimeError, ParseMonthError,
};
use std::ops::RangeInclusive;
use thiserror::Error;
use time::{Month, Month::*};

/// Inclusive range of years from which a day may be selected
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Bounds {
    start: i32,
    end: i32,
}

impl Bounds {
    pub(crate) const DEFAULT_START: i32 = 1940;
    pub(crate) const DEFAULT_END: i32 = 2030;

    pub(crate) fn new(start: i32, end: i32) -> Bounds {
        Bounds { start, end }
    }

    pub(crate) fn start(&self) -> i32 {
        self.start
    }

    pub(crate) fn end(&self) -> i32 {
        self.end
    }

    pub(crate) fn contains(&self, year: i32) -> bool {
        self.years().contains(&year)
    }

    /// The options of a year selector
    pub(crate) fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::new(Bounds::DEFAULT_START, Bounds::DEFAULT_END)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct PickerConfig {
    pub(crate) bounds: Bounds,
    pub(crate) format: DisplayFormat,
}

/// Month-grid date picker state: the displayed month and its grid, the
/// selected day, and whether the grid is showing.
///
/// The displayed month and year are read from the grid itself, so they can
/// never disagree with it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DatePicker {
    config: PickerConfig,
    grid: Grid,
    selected: Option<DayCell>,
    visible: bool,
}

impl DatePicker {
    /// Creates a hidden picker showing January of the first selectable year
    pub(crate) fn new(config: PickerConfig) -> Result<DatePicker, OutOfTimeError> {
        if config.bounds.start() > config.bounds.end() {
            log::warn!(
                "start year {} is after end year {}; no day will be selectable",
                config.bounds.start(),
                config.bounds.end()
            );
        }
        let grid = Grid::build(January, config.bounds.start(), &config.format)?;
        Ok(DatePicker {
            config,
            grid,
            selected: None,
            visible: false,
        })
    }

    pub(crate) fn bounds(&self) -> Bounds {
        self.config.bounds
    }

    pub(crate) fn month(&self) -> Month {
        self.grid.month()
    }

    pub(crate) fn year(&self) -> i32 {
        self.grid.year()
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn selected(&self) -> Option<&DayCell> {
        self.selected.as_ref()
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    /// Advances one month.  Going forwards from December wraps to January,
    /// moving to the next year unless the displayed year is already the last
    /// one selectable.
    pub(crate) fn next_month(&mut self) -> Result<(), OutOfTimeError> {
        let year = self.year();
        match self.month() {
            December if year < self.config.bounds.end() => self.show(January, year + 1),
            December => self.show(January, year),
            m => self.show(m.next(), year),
        }
    }

    /// Goes back one month.  Going backwards from January wraps to December,
    /// moving to the previous year unless the displayed year is already the
    /// first one selectable.
    pub(crate) fn previous_month(&mut self) -> Result<(), OutOfTimeError> {
        let year = self.year();
        match self.month() {
            January if year > self.config.bounds.start() => self.show(December, year - 1),
            January => self.show(December, year),
            m => self.show(m.previous(), year),
        }
    }

    pub(crate) fn set_month(&mut self, month: Month) -> Result<(), OutOfTimeError> {
        self.show(month, self.year())
    }

    /// Sets the displayed month from its three-letter abbreviation
    pub(crate) fn select_month(&mut self, abbr: &str) -> Result<(), NavigationError> {
        let month = parse_month_abbr(abbr)?;
        self.set_month(month)?;
        Ok(())
    }

    pub(crate) fn set_year(&mut self, year: i32) -> Result<(), OutOfTimeError> {
        self.show(self.month(), year)
    }

    /// Moves the month selector by one option, cycling through the year
    /// without changing it
    pub(crate) fn step_month(&mut self, step: Step) -> Result<(), OutOfTimeError> {
        let month = match step {
            Step::Forwards => self.month().next(),
            Step::Backwards => self.month().previous(),
        };
        self.set_month(month)
    }

    /// Moves the year selector by one option.  Returns `Ok(false)` if the
    /// selector is already at the end of its range in that direction.
    pub(crate) fn step_year(&mut self, step: Step) -> Result<bool, OutOfTimeError> {
        let year = self.year();
        let target = match step {
            Step::Forwards => year.checked_add(1),
            Step::Backwards => year.checked_sub(1),
        };
        match target {
            Some(y) if self.config.bounds.contains(y) => {
                self.set_year(y)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Shows the grid.  If a day has been selected, the displayed month
    /// jumps back to the month of that day.
    pub(crate) fn open(&mut self) -> Result<(), OutOfTimeError> {
        self.visible = true;
        if let Some((month, year)) = self.selected.as_ref().map(|c| (c.month(), c.year())) {
            self.show(month, year)?;
        }
        Ok(())
    }

    /// Hides the grid in response to an interaction outside of the picker
    pub(crate) fn dismiss(&mut self) {
        if self.visible {
            log::debug!("Dismissing date picker");
        }
        self.visible = false;
    }

    pub(crate) fn toggle(&mut self) -> Result<(), OutOfTimeError> {
        if self.visible {
            self.dismiss();
            Ok(())
        } else {
            self.open()
        }
    }

    /// Selects `cell`, hides the grid, and returns the formatted date.  Days
    /// in years outside the bounds are ignored, leaving the picker as it was.
    pub(crate) fn pick(&mut self, cell: &DayCell) -> PickerOutput {
        if !self.config.bounds.contains(cell.year()) {
            log::debug!("Ignoring pick of out-of-bounds date {}", cell.date());
            return PickerOutput::Rejected;
        }
        log::info!(
            "Selected {} {} {} as {:?}",
            cell.day(),
            cell.month_abbr(),
            cell.year(),
            cell.formatted()
        );
        self.selected = Some(cell.clone());
        self.visible = false;
        PickerOutput::Selected(cell.formatted().to_owned())
    }

    /// Picks the cell at position `index` of the current grid
    pub(crate) fn pick_index(&mut self, index: usize) -> PickerOutput {
        match self.grid.cells().get(index).cloned() {
            Some(cell) => self.pick(&cell),
            None => PickerOutput::Rejected,
        }
    }

    fn show(&mut self, month: Month, year: i32) -> Result<(), OutOfTimeError> {
        self.grid = Grid::build(month, year, &self.config.format)?;
        log::debug!("Showing {month} {year}");
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Step {
    Forwards,
    Backwards,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum PickerOutput {
    Selected(String),
    Rejected,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum NavigationError {
    #[error(transparent)]
    Month(#[from] ParseMonthError),
    #[error(transparent)]
    OutOfTime(#[from] OutOfTimeError),
}
