mod app;
mod calendar;
mod help;
mod picker;
mod theme;
use crate::app::App;
use crate::calendar::DisplayFormat;
use crate::picker::{Bounds, DatePicker, PickerConfig};
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Initial value of the date field when none is given on the command line
static DEFAULT_DATE: &str = "03/12/1987";

const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
    "debug"
} else {
    "info"
};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        date: String,
        month: Option<String>,
        config: PickerConfig,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut date = None;
        let mut month = None;
        let mut start_year = None;
        let mut end_year = None;
        let mut format = None;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('s') | Arg::Long("start-year") => {
                    start_year = Some(parser.value()?.parse::<i32>()?);
                }
                Arg::Short('e') | Arg::Long("end-year") => {
                    end_year = Some(parser.value()?.parse::<i32>()?);
                }
                Arg::Short('f') | Arg::Long("format") => {
                    format = Some(parser.value()?.parse::<DisplayFormat>()?);
                }
                Arg::Short('m') | Arg::Long("month") => {
                    month = Some(parser.value()?.string()?);
                }
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if date.is_none() => date = Some(value.string()?),
                _ => return Err(arg.unexpected()),
            }
        }
        let config = PickerConfig {
            bounds: Bounds::new(
                start_year.unwrap_or(Bounds::DEFAULT_START),
                end_year.unwrap_or(Bounds::DEFAULT_END),
            ),
            format: format.unwrap_or_default(),
        };
        Ok(Command::Run {
            date: date.unwrap_or_else(|| String::from(DEFAULT_DATE)),
            month,
            config,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                date,
                month,
                config,
                log_file,
            } => {
                let _logger = init_logging(log_file.as_deref())?;
                let mut picker =
                    DatePicker::new(config).context("failed to build initial calendar")?;
                if let Some(month) = month {
                    picker
                        .select_month(&month)
                        .context("failed to set initial month")?;
                }
                let date = with_terminal(|mut terminal| {
                    App::new(date, picker)
                        .run(&mut terminal)
                        .context("failed to run date picker")
                })?;
                log::info!("Exiting with date {date:?}");
                println!("{date}");
                Ok(())
            }
            Command::Help => {
                println!("Usage: datepick [OPTIONS] [DATE]");
                println!();
                println!("Terminal month-grid date picker");
                println!();
                println!("Options:");
                println!("  -s, --start-year <YEAR>  First selectable year [default: 1940]");
                println!("  -e, --end-year <YEAR>    Last selectable year [default: 2030]");
                println!("  -f, --format <FORMAT>    Display format for picked dates [default: DD/MM/YYYY]");
                println!("  -m, --month <MON>        Month to show first, e.g. \"Jun\" [default: Jan]");
                println!("      --log-file <PATH>    Write a log to PATH");
                println!("  -h, --help               Display this help message and exit");
                println!("  -V, --version            Show the program version and exit");
                println!();
                println!("DATE is the initial contents of the date field [default: {DEFAULT_DATE}].");
                println!("The final contents are printed on exit.");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

// The terminal belongs to the UI, so logs only go to a file, and only when
// one is requested
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<LoggerHandle>> {
    let Some(path) = log_file else {
        return Ok(None);
    };
    let handle = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)
        .context("invalid log specification")?
        .log_to_file(FileSpec::try_from(path).context("invalid log file path")?)
        .start()
        .context("failed to start logger")?;
    Ok(Some(handle))
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = match MouseCapture::enable(io::stdout()) {
        Ok(capture) => {
            let r = func(terminal);
            drop(capture);
            r
        }
        Err(e) => Err(e).context("failed to enable mouse capture"),
    };
    ratatui::restore();
    r
}

/// Keeps mouse capture enabled on `W` until dropped, including by a panic
/// unwinding past it.  The panic hook from `ratatui::init` does not disable
/// mouse capture.
#[derive(Debug)]
struct MouseCapture<W: Write> {
    out: W,
}

impl<W: Write> MouseCapture<W> {
    fn enable(mut out: W) -> io::Result<MouseCapture<W>> {
        execute!(out, EnableMouseCapture)?;
        Ok(MouseCapture { out })
    }
}

impl<W: Write> Drop for MouseCapture<W> {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, DisableMouseCapture) {
            log::warn!("Failed to disable mouse capture: {e}");
        }
    }
}
