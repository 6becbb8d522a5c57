use crate::calendar::{PickerPopup, PopupHit};
use crate::help::Help;
use crate::picker::{DatePicker, PickerOutput, Step};
use crate::theme::{BASE_STYLE, FIELD_STYLE, HINT_STYLE};
use crossterm::event::{
    read, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::Widget,
    Terminal,
};
use std::io::{self, Write};

static FIELD_LABEL: &str = "Date: ";

/// The host screen: a single date field that the date picker fills in
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct App {
    date: String,
    picker: DatePicker,
    cursor: usize,
    state: AppState,
    // Where the field and the popup were last drawn, for mouse hit testing
    field_area: Rect,
    popup_area: Option<Rect>,
}

impl App {
    pub(crate) fn new(date: String, picker: DatePicker) -> App {
        let mut app = App {
            date,
            picker,
            cursor: 0,
            state: AppState::Browsing,
            field_area: Rect::default(),
            popup_area: None,
        };
        app.reset_cursor();
        app
    }

    /// Runs until the user quits and returns the final value of the date
    /// field
    pub(crate) fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<String> {
        while !self.quitting() {
            self.draw(terminal)?;
            self.handle_input()?;
        }
        Ok(self.date)
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(&mut *self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        let event = read()?;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        } else if let Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) = event
        {
            if !self.handle_click(Position::new(column, row)) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Browsing if self.picker.is_visible() => self.handle_picker_key(key),
            AppState::Browsing => match key {
                KeyCode::Enter | KeyCode::Char(' ') => self.toggle_picker(),
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Browsing;
                true
            }
            AppState::Quitting => false,
        }
    }

    fn handle_picker_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
            KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-7),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(7),
            KeyCode::Char('<') | KeyCode::PageUp => self.previous_month(),
            KeyCode::Char('>') | KeyCode::PageDown => self.next_month(),
            KeyCode::Char('m') => self.step_month(Step::Forwards),
            KeyCode::Char('M') => self.step_month(Step::Backwards),
            KeyCode::Char('y') => self.step_year(Step::Forwards),
            KeyCode::Char('Y') => self.step_year(Step::Backwards),
            KeyCode::Enter | KeyCode::Char(' ') => self.pick(self.cursor),
            KeyCode::Esc => {
                self.picker.dismiss();
                true
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            KeyCode::Char('q') => {
                self.state = AppState::Quitting;
                true
            }
            _ => false,
        }
    }

    // Returns `false` if the click did nothing
    fn handle_click(&mut self, pos: Position) -> bool {
        if self.state != AppState::Browsing {
            return false;
        }
        match self.popup_area {
            Some(area) if self.picker.is_visible() => {
                if area.contains(pos) {
                    match PickerPopup::hit_test(&self.picker, area, pos) {
                        Some(PopupHit::Day(i)) => {
                            self.cursor = i;
                            self.pick(i)
                        }
                        Some(PopupHit::PreviousMonth) => self.previous_month(),
                        Some(PopupHit::NextMonth) => self.next_month(),
                        None => true,
                    }
                } else {
                    // Any click outside of the popup closes it
                    self.picker.dismiss();
                    true
                }
            }
            _ if self.field_area.contains(pos) => self.toggle_picker(),
            _ => false,
        }
    }

    fn toggle_picker(&mut self) -> bool {
        let r = self.picker.toggle().is_ok();
        self.reset_cursor();
        r
    }

    fn pick(&mut self, index: usize) -> bool {
        match self.picker.pick_index(index) {
            PickerOutput::Selected(date) => {
                self.date = date;
                true
            }
            PickerOutput::Rejected => false,
        }
    }

    fn move_cursor(&mut self, offset: isize) -> bool {
        match self.cursor.checked_add_signed(offset) {
            Some(i) if i < self.picker.grid().len() => {
                self.cursor = i;
                true
            }
            _ => false,
        }
    }

    fn previous_month(&mut self) -> bool {
        let r = self.picker.previous_month().is_ok();
        self.reset_cursor();
        r
    }

    fn next_month(&mut self) -> bool {
        let r = self.picker.next_month().is_ok();
        self.reset_cursor();
        r
    }

    fn step_month(&mut self, step: Step) -> bool {
        let r = self.picker.step_month(step).is_ok();
        self.reset_cursor();
        r
    }

    fn step_year(&mut self, step: Step) -> bool {
        let r = self.picker.step_year(step).unwrap_or(false);
        self.reset_cursor();
        r
    }

    // Puts the cursor on the selected day if it's in view, otherwise on the
    // first of the displayed month
    fn reset_cursor(&mut self) {
        let grid = self.picker.grid();
        self.cursor = self
            .picker
            .selected()
            .and_then(|c| grid.position(c.date()))
            .or_else(|| grid.first_of_month())
            .unwrap_or(0);
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let label_width = u16::try_from(FIELD_LABEL.len()).unwrap_or(u16::MAX);
        let field_width = u16::try_from(self.date.chars().count())
            .unwrap_or(u16::MAX)
            .max(1);
        let field_line = Rect {
            x: area.x.saturating_add(1),
            y: area.y.saturating_add(1),
            width: area.width.saturating_sub(1),
            height: 1,
        }
        .intersection(area);
        self.field_area = Rect {
            x: field_line.x.saturating_add(label_width),
            width: field_width,
            ..field_line
        }
        .intersection(area);
        Line::from_iter([
            Span::styled(FIELD_LABEL, BASE_STYLE),
            Span::styled(self.date.as_str(), FIELD_STYLE),
        ])
        .render(field_line, buf);
        let bounds = self.picker.bounds();
        Line::styled(
            format!(
                "ENTER: choose a date ({}-{})   ?: help   q: quit",
                bounds.start(),
                bounds.end()
            ),
            HINT_STYLE,
        )
        .render(
            Rect {
                y: field_line.y.saturating_add(1),
                ..field_line
            }
            .intersection(area),
            buf,
        );
        self.popup_area = None;
        if self.picker.is_visible() {
            let anchor = Position::new(self.field_area.x, self.field_area.y);
            let popup_area = PickerPopup::area(&self.picker, anchor, area);
            PickerPopup::new(&self.picker)
                .cursor(self.cursor)
                .render(popup_area, buf);
            self.popup_area = Some(popup_area);
        }
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Browsing,
    Helping,
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::{Bounds, PickerConfig};
    use time::Month;

    fn app() -> App {
        let picker = DatePicker::new(PickerConfig::default()).unwrap();
        App::new(String::from("03/12/1987"), picker)
    }

    fn render(app: &mut App) -> Buffer {
        let area = Rect::new(0, 0, 60, 16);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn test_open_and_pick_first_of_month() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Enter));
        assert!(app.picker.is_visible());
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.date, "01/01/1940");
        assert!(!app.picker.is_visible());
    }

    #[test]
    fn test_navigate_and_pick() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        assert!(app.handle_key(KeyCode::PageDown));
        assert_eq!(app.picker.month(), Month::February);
        assert!(app.handle_key(KeyCode::Right));
        assert!(app.handle_key(KeyCode::Down));
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.date, "09/02/1940");
    }

    #[test]
    fn test_pick_out_of_bounds_is_rejected() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        // Jan 1 1940 is a Monday, so the cell to its left is Dec 31 1939
        assert!(app.handle_key(KeyCode::Left));
        assert!(!app.handle_key(KeyCode::Enter));
        assert_eq!(app.date, "03/12/1987");
        assert!(app.picker.is_visible());
        assert_eq!(app.picker.selected(), None);
    }

    #[test]
    fn test_cursor_stays_in_grid() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        assert!(app.handle_key(KeyCode::Up));
        assert!(!app.handle_key(KeyCode::Up));
        assert_eq!(app.cursor, 0);
        assert!(!app.handle_key(KeyCode::Left));
    }

    #[test]
    fn test_reopen_returns_to_selection() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('y'));
        app.handle_key(KeyCode::Char('m'));
        assert_eq!((app.picker.month(), app.picker.year()), (Month::February, 1941));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.date, "01/02/1941");
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::PageDown);
        app.handle_key(KeyCode::PageDown);
        app.handle_key(KeyCode::Esc);
        assert!(!app.picker.is_visible());
        app.handle_key(KeyCode::Enter);
        assert_eq!((app.picker.month(), app.picker.year()), (Month::February, 1941));
        let selected = app.picker.grid().cells()[app.cursor].date();
        assert_eq!(Some(selected), app.picker.selected().map(|c| c.date()));
    }

    #[test]
    fn test_year_selector_stops_at_bounds() {
        let picker = DatePicker::new(PickerConfig {
            bounds: Bounds::new(2000, 2001),
            ..PickerConfig::default()
        })
        .unwrap();
        let mut app = App::new(String::new(), picker);
        app.handle_key(KeyCode::Enter);
        assert!(!app.handle_key(KeyCode::Char('Y')));
        assert!(app.handle_key(KeyCode::Char('y')));
        assert!(!app.handle_key(KeyCode::Char('y')));
        assert_eq!(app.picker.year(), 2001);
    }

    #[test]
    fn test_help_is_dismissed_by_any_key() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::Helping);
        assert!(app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Browsing);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.quitting());
    }

    #[test]
    fn test_render_field() {
        let mut app = app();
        let buffer = render(&mut app);
        assert_eq!(row(&buffer, 1).trim_end(), " Date: 03/12/1987");
        assert_eq!(app.field_area, Rect::new(7, 1, 10, 1));
        assert_eq!(app.popup_area, None);
    }

    #[test]
    fn test_render_popup_under_field() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        let buffer = render(&mut app);
        assert_eq!(app.popup_area, Some(Rect::new(7, 2, 30, 10)));
        assert!(row(&buffer, 3).contains("< Jan 1940 >"));
        // Dec 25-31 1939, then the cursor on Jan 1
        assert!(row(&buffer, 5).contains("│ 25  26  27  28  29  30  31 │"));
        assert!(row(&buffer, 6).contains("│[ 1]  2   3   4   5   6   7 │"));
    }

    #[test]
    fn test_click_on_cell_picks_it() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        render(&mut app);
        // Second row of weeks, third column: Jan 3 1940
        assert!(app.handle_click(Position::new(8 + 9, 6)));
        assert_eq!(app.date, "03/01/1940");
        assert!(!app.picker.is_visible());
    }

    #[test]
    fn test_click_on_title_arrows_changes_month() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        render(&mut app);
        // Popup inner area starts at column 8; "< Jan 1940 >" is centred in it
        assert!(app.handle_click(Position::new(16 + 11, 3)));
        assert_eq!((app.picker.month(), app.picker.year()), (Month::February, 1940));
        render(&mut app);
        assert!(app.handle_click(Position::new(16, 3)));
        assert!(app.handle_click(Position::new(16, 3)));
        // Going back from January of the first year stays in that year
        assert_eq!((app.picker.month(), app.picker.year()), (Month::December, 1940));
        assert!(app.picker.is_visible());
        let first = app.picker.grid().first_of_month();
        assert_eq!(Some(app.cursor), first);
    }

    #[test]
    fn test_click_outside_dismisses() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        render(&mut app);
        assert!(app.handle_click(Position::new(50, 14)));
        assert!(!app.picker.is_visible());
        assert_eq!(app.date, "03/12/1987");
    }

    #[test]
    fn test_click_on_field_opens_picker() {
        let mut app = app();
        render(&mut app);
        assert!(!app.handle_click(Position::new(50, 14)));
        assert!(app.handle_click(Position::new(9, 1)));
        assert!(app.picker.is_visible());
    }
}
