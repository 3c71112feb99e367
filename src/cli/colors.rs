//! Theme colors of the client, kept in one place.
//!
//! - FERRUM_RED: banner, prompts and highlighted arguments
//! - FERRUM_AMBER: warnings and partial results

use colored::Color;

pub(crate) const FERRUM_RED: Color = Color::TrueColor {
    r: 255,
    g: 87,
    b: 87,
};

pub(crate) const FERRUM_AMBER: Color = Color::TrueColor {
    r: 255,
    g: 176,
    b: 59,
};
