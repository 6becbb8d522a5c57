mod format;
mod grid;
mod util;
mod widget;
pub(crate) use self::format::DisplayFormat;
pub(crate) use self::grid::{DayCell, Grid, Membership, OutOfTimeError};
pub(crate) use self::util::{parse_month_abbr, ParseMonthError};
pub(crate) use self::widget::{PickerPopup, PopupHit};
