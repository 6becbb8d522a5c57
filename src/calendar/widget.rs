use super::util::{MonthExt, DAYS_IN_WEEK, WEEKDAY_HEADER};
use super::Membership;
use crate::picker::DatePicker;
use crate::theme::{
    picker::{OTHER_MONTH_STYLE, SELECTED_STYLE, TITLE_STYLE, WEEKDAY_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Margin, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Clear, Widget},
};

/// Number of columns per day of week
const DAY_WIDTH: u16 = 4;

/// Width of the grid of days, not counting the border
const GRID_WIDTH: u16 = DAY_WIDTH * 7;

/// Number of lines above the weeks: the month title and the weekday header
const HEADER_LINES: u16 = 2;

/// Lines taken up by the border
const BORDER: u16 = 2;

pub(crate) const POPUP_WIDTH: u16 = GRID_WIDTH + BORDER;

/// Draws the picker's grid as a bordered popup:
///
/// ```text
/// ┌────────────────────────────┐
/// │        < Feb 2024 >        │
/// │ Mo  Tu  We  Th  Fr  Sa  Su │
/// │ 29  30  31   1   2   3   4 │
/// │  5   6   7   8   9  10  11 │
/// ...
/// └────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug)]
pub(crate) struct PickerPopup<'a> {
    picker: &'a DatePicker,
    cursor: Option<usize>,
}

impl<'a> PickerPopup<'a> {
    pub(crate) fn new(picker: &'a DatePicker) -> Self {
        PickerPopup {
            picker,
            cursor: None,
        }
    }

    pub(crate) fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Returns the area the popup occupies when dropped down below `anchor`,
    /// shifted up or left as needed to stay within `screen`
    pub(crate) fn area(picker: &DatePicker, anchor: Position, screen: Rect) -> Rect {
        let height = popup_height(picker);
        let x = anchor
            .x
            .min(screen.right().saturating_sub(POPUP_WIDTH))
            .max(screen.x);
        let y = anchor
            .y
            .saturating_add(1)
            .min(screen.bottom().saturating_sub(height))
            .max(screen.y);
        Rect::new(x, y, POPUP_WIDTH, height).intersection(screen)
    }

    /// Returns what was drawn at `pos`, given that the popup was rendered at
    /// `area`
    pub(crate) fn hit_test(picker: &DatePicker, area: Rect, pos: Position) -> Option<PopupHit> {
        let inner = area.inner(Margin::new(1, 1));
        if !inner.contains(pos) {
            return None;
        }
        if pos.y == inner.y {
            let title = title(picker);
            let start = inner.x.saturating_add(title_offset(inner.width, &title));
            let end = start.saturating_add(text_width(&title)).saturating_sub(1);
            return if pos.x == start {
                Some(PopupHit::PreviousMonth)
            } else if pos.x == end {
                Some(PopupHit::NextMonth)
            } else {
                None
            };
        }
        let row = pos.y.checked_sub(inner.y.saturating_add(HEADER_LINES))?;
        let col = pos.x.saturating_sub(inner.x);
        if col >= GRID_WIDTH {
            return None;
        }
        let index = usize::from(row) * DAYS_IN_WEEK + usize::from(col / DAY_WIDTH);
        (index < picker.grid().len()).then_some(PopupHit::Day(index))
    }
}

/// The parts of the popup that respond to clicks
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PopupHit {
    /// The `<` arrow in the title
    PreviousMonth,
    /// The `>` arrow in the title
    NextMonth,
    /// The grid cell at the given index
    Day(usize),
}

impl Widget for PickerPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::bordered().style(BASE_STYLE);
        let inner = block.inner(area);
        block.render(area, buf);
        let title = title(self.picker);
        let title_area = Rect {
            x: inner.x.saturating_add(title_offset(inner.width, &title)),
            height: 1,
            ..inner
        }
        .intersection(inner);
        Line::styled(title, TITLE_STYLE).render(title_area, buf);
        let mut lines = vec![Line::from_iter(
            WEEKDAY_HEADER
                .iter()
                .map(|wd| Span::styled(format!(" {wd} "), WEEKDAY_STYLE)),
        )];
        let selected = self.picker.selected().map(|c| c.date());
        for (w, week) in self.picker.grid().weeks().enumerate() {
            lines.push(Line::from_iter(week.iter().enumerate().map(|(d, cell)| {
                let text = if self.cursor == Some(w * DAYS_IN_WEEK + d) {
                    format!("[{:2}]", cell.day())
                } else {
                    format!(" {:2} ", cell.day())
                };
                let style = if selected == Some(cell.date()) {
                    SELECTED_STYLE
                } else if cell.membership() == Membership::CurrentMonth {
                    BASE_STYLE
                } else {
                    OTHER_MONTH_STYLE
                };
                Span::styled(text, style)
            })));
        }
        for (y, line) in std::iter::zip(inner.y.saturating_add(1)..inner.bottom(), lines) {
            line.render(Rect { y, height: 1, ..inner }, buf);
        }
    }
}

fn title(picker: &DatePicker) -> String {
    format!("< {} {} >", picker.month().abbr(), picker.year())
}

fn text_width(s: &str) -> u16 {
    u16::try_from(s.chars().count()).unwrap_or(u16::MAX)
}

// Column at which `title` starts when centred in `width` columns
fn title_offset(width: u16, title: &str) -> u16 {
    width.saturating_sub(text_width(title)) / 2
}

fn popup_height(picker: &DatePicker) -> u16 {
    let weeks = u16::try_from(picker.grid().week_count()).unwrap_or(u16::MAX);
    weeks.saturating_add(HEADER_LINES + BORDER)
}
