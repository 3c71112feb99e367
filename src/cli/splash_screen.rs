//! The splash screen shown when a client session opens: the banner, what the
//! package is, and which store the session is configured for.

use colored::*;

use crate::{cli::colors::FERRUM_RED, config::ClientConfig};

const BANNER: &str = r"
    ███████╗███████╗██████╗ ██████╗ ██╗   ██╗███╗   ███╗
    ██╔════╝██╔════╝██╔══██╗██╔══██╗██║   ██║████╗ ████║
    █████╗  █████╗  ██████╔╝██████╔╝██║   ██║██╔████╔██║
    ██╔══╝  ██╔══╝  ██╔══██╗██╔══██╗██║   ██║██║╚██╔╝██║
    ██║     ███████╗██║  ██║██║  ██║╚██████╔╝██║ ╚═╝ ██║
    ╚═╝     ╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝ ╚═╝     ╚═╝
                                           d y n a m o";

pub fn splash_screen(config: &ClientConfig) {
    println!("{}", BANNER.color(FERRUM_RED));
    println!(
        r"
    {}

    Version {}
    Region  {}
    Endpoint {}
        ",
        env!("CARGO_PKG_DESCRIPTION").color(FERRUM_RED),
        env!("CARGO_PKG_VERSION").color(FERRUM_RED).italic(),
        config.region.color(FERRUM_RED).italic(),
        config
            .endpoint
            .as_deref()
            .unwrap_or("in-process")
            .color(FERRUM_RED)
            .italic(),
    )
}
