//! The place where the command line and REPL argument parsers are defined.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, ValueEnum, arg, command};

use crate::cli::messages::highlight_argument;

#[derive(Parser)]
#[command(name = "ferrum")]
#[command(about = "Map records onto a key-value store and drive its tables", long_about = None)]
pub struct CliParser {
    // Either run the scripted demo or open a client session.
    #[arg(required = true)]
    pub mode: Option<CliMode>,
}

#[derive(Clone, ValueEnum)]
pub enum CliMode {
    // Recreate the job table, populate it, then scan and query it.
    Demo,

    // Start a REPL client instance against an in-process store.
    Client,
}

pub fn parse_date(text: &str) -> Result<DateTime<Utc>, String> {
    //! Parse a `YYYY-MM-DD` date as midnight UTC.

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| {
            format!(
                "'{}' is not a date, expected {}",
                text,
                highlight_argument("YYYY-MM-DD")
            )
        })
}
