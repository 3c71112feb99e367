//! General message formatting functions for prettifying the CLI.
//!
//! - Highlight Text (make the text ferrum red but not bold)
//! - System messages, tagged with the part of the client they come from
//! - Warnings, for outcomes that worked but only partially

use colored::Colorize;

use crate::cli::colors::{FERRUM_AMBER, FERRUM_RED};

pub fn highlight_argument(argument: &str) -> String {
    //! Highlight a piece of text in the ferrum red
    //! color to make it obvious.

    format!("{}", argument.color(FERRUM_RED))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Format a message for the command line according to the theme.
    //!
    //! Takes in a source name (like 'system') and the message as a
    //! formatted text; output of [`format!`].

    let source_formatted = format!("{:6}", source_name.color(FERRUM_RED).bold());
    format!("[{}] {}", source_formatted, message)
}

pub fn warning_message(source_name: &str, message: String) -> String {
    let source_formatted = format!("{:6}", source_name.color(FERRUM_AMBER).bold());
    format!("[{}] {}", source_formatted, message.color(FERRUM_AMBER))
}
