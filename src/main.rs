use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use ferrum_dynamo::{
    cli::{
        self,
        messages::system_message,
        parsers::{CliMode, CliParser},
    },
    config::ClientConfig,
};
use log::error;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = CliParser::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", system_message("config", e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let result = match args.mode {
        Some(CliMode::Demo) => cli::run_demo(config).await,
        Some(CliMode::Client) => cli::run_client(config).await,
        None => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", system_message("error", e.to_string()));
            ExitCode::FAILURE
        }
    }
}
