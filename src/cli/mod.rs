use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use colored::Colorize;
use log::{error, info};

use crate::{
    cli::{
        colors::FERRUM_RED,
        commands::{ClientCommand, CommandExecutor},
        messages::{highlight_argument, system_message, warning_message},
    },
    config::ClientConfig,
    error::Result,
    jobs::{self, JobReport, JobStatus},
    lifecycle::TableLifecycle,
    mapping::mapper_for,
    sessions::Session,
    store::{EntityTable, MemoryStore},
};

mod colors;
pub mod commands;
pub mod messages;
pub mod parsers;
mod splash_screen;

const DEFAULT_LAST_COMMAND_DELIMITER: &str = "!";

// Describe samples a table spends in CREATING / DELETING on the demo store.
const DEMO_TRANSITION_SAMPLES: u32 = 2;

const FERRUM_CLIENT_COMMANDS_LIST: [(&str, &str); 11] = [
    ("create", "create the job table, waiting until it is active"),
    ("drop", "delete the job table, waiting until it is gone"),
    ("populate", "write the sample job reports concurrently"),
    ("scan", "list every job report; 'scan raw' shows the stored items"),
    ("query", "query user <id> [since <YYYY-MM-DD>]"),
    ("", "query status <status> [since <YYYY-MM-DD>]"),
    ("schema", "show the job table declaration and record mapping"),
    ("!", "execute the last command, add more to go further back"),
    ("help", "list all available commands"),
    ("history", "list command history for this session"),
    (
        "corrode",
        "iron corrodes and so does this session when you exit",
    ),
];

pub async fn run_demo(config: ClientConfig) -> Result<()> {
    //! Run the whole job-report scenario once: recreate the table, populate
    //! it, scan it, query it by user, let the status index settle, then
    //! query the index.

    let store = Arc::new(MemoryStore::with_phases(
        DEMO_TRANSITION_SAMPLES,
        DEMO_TRANSITION_SAMPLES,
    ));
    let lifecycle = TableLifecycle::with_options(Arc::clone(&store), config.wait_options());

    let schema = jobs::schema()?;
    schema.validate_against(mapper_for::<JobReport>()?.as_ref())?;

    println!(
        "{}",
        system_message("demo", format!("Using region '{}'.", highlight_argument(&config.region)))
    );

    let outcome = lifecycle.ensure_deleted(jobs::TABLE_NAME).await?;
    println!("{}", system_message("demo", format!("Old table {}.", outcome)));

    let outcome = lifecycle.ensure_created(&schema).await?;
    println!(
        "{}",
        system_message("demo", format!("Table {} {}.", highlight_argument(&schema.to_string()), outcome))
    );

    let table: EntityTable<JobReport, MemoryStore> = EntityTable::new(Arc::clone(&store), jobs::TABLE_NAME)?;

    println!("{}", system_message("demo", "Populating table data...".to_string()));
    let report = table.put_all(&jobs::sample_reports()).await;
    if report.is_complete() {
        println!("{}", system_message("demo", format!("{}.", report)));
    } else {
        println!("{}", warning_message("demo", format!("{}; the table is partially populated.", report)));
    }

    println!("{}", system_message("demo", "Scanning table...".to_string()));
    show_reports(&table.scan().await?);

    let since = jobs::default_since();
    println!(
        "{}",
        system_message(
            "demo",
            format!("Jobs of {} since {}:", highlight_argument("FirstUser"), since.date_naive())
        )
    );
    show_reports(&table.query(&jobs::by_user_since("FirstUser", since)?).await?);

    info!("waiting {:?} for the status index to settle", config.index_settle_delay);
    tokio::time::sleep(config.index_settle_delay).await;

    println!(
        "{}",
        system_message(
            "demo",
            format!("{} jobs since {}:", highlight_argument(JobStatus::Unprocessed.name()), since.date_naive())
        )
    );
    show_reports(
        &table
            .query_index(jobs::STATUS_INDEX, &jobs::by_status_since(JobStatus::Unprocessed, since)?)
            .await?,
    );

    Ok(())
}

pub async fn run_client(config: ClientConfig) -> Result<()> {
    splash_screen::splash_screen(&config);

    let store = Arc::new(MemoryStore::with_phases(
        DEMO_TRANSITION_SAMPLES,
        DEMO_TRANSITION_SAMPLES,
    ));
    let session = Session::client(config, &store)?;

    println!(
        "{}",
        system_message(
            "info",
            "An in-process store was created at the session level.".to_string()
        )
    );

    start_repl(session).await;
    Ok(())
}

pub fn show_help() {
    println!(
        "{}",
        system_message(
            "info",
            format!(
                "Every command works on the {} table.",
                highlight_argument(jobs::TABLE_NAME)
            )
        )
    );

    println!();
    println!("{:10} {}", "COMMAND".color(FERRUM_RED), "DETAILS");
    for (command, details) in FERRUM_CLIENT_COMMANDS_LIST {
        println!("{:10} {}", command.color(FERRUM_RED), details)
    }
}

fn show_reports(reports: &[JobReport]) {
    for report in reports {
        println!("    {}", report);
    }
}

async fn read_line() -> Option<String> {
    //! Prompt, then read one line of stdin on the blocking pool. [`None`] at
    //! end of input.

    print!("{:6} > ", "ferrum".color(FERRUM_RED).bold());
    io::stdout().flush().ok()?;

    match tokio::task::spawn_blocking(|| read_line_from(&mut io::stdin().lock())).await {
        Ok(line) => line,
        Err(error) => {
            error!("stdin reader stopped: {}", error);
            None
        }
    }
}

fn read_line_from(reader: &mut impl BufRead) -> Option<String> {
    let mut buffer = String::new();
    match reader.read_line(&mut buffer) {
        Ok(0) => None,
        Ok(_) => Some(buffer),
        Err(error) => {
            error!("could not read from stdin: {}", error);
            None
        }
    }
}

async fn start_repl(mut session: Session) {
    println!(
        "{}",
        system_message(
            "system",
            format!(
                "Use '{}' to quit and '{}' to know all commands available.",
                highlight_argument("corrode"),
                highlight_argument("help"),
            ),
        )
    );

    println!(
        "{}",
        system_message(
            "system",
            format!(
                "New session initiated at '{}' against region '{}'.",
                highlight_argument(&session.start_time_string()),
                highlight_argument(&session.config().region)
            ),
        )
    );

    loop {
        println!();
        let Some(mut buffer) = read_line().await else {
            break;
        };

        if buffer.starts_with(DEFAULT_LAST_COMMAND_DELIMITER) {
            let last = buffer.matches(DEFAULT_LAST_COMMAND_DELIMITER).count();

            match session.get_last_command(last) {
                Some(command) => buffer = command.to_string(),
                None => {
                    println!(
                        "{}",
                        system_message(
                            "system",
                            format!(
                                "No command {} steps back.",
                                highlight_argument(&last.to_string())
                            ),
                        )
                    );
                    continue;
                }
            }
        }

        let line = buffer.trim();
        if line.is_empty() {
            continue;
        }
        session.add_to_command_history(line);

        match line {
            "history" => session.show_command_history(None),
            "help" => show_help(),
            "exit" => println!("did you mean '{}'?", "corrode".color(FERRUM_RED)),
            "corrode" => break,
            command => match command.parse::<ClientCommand>() {
                Ok(command) => match CommandExecutor::new(command, &session).execute().await {
                    Ok(result) => {
                        if let Some(message) = &result.message {
                            println!("{}", system_message("ferrum", message.clone()));
                        }
                        print!("{}", result);
                    }
                    Err(error) => println!("{}", error),
                },
                Err(error) => println!("{}", system_message("parser", error)),
            },
        }
    }

    println!("Goodbye!")
}
