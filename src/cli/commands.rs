//! Client commands: parsed from a REPL line, executed against the session's
//! job table.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};

use crate::{
    cli::{
        messages::{highlight_argument, system_message},
        parsers::parse_date,
    },
    error::Error,
    jobs::{self, JobReport, JobStatus},
    sessions::Session,
    store::TableStore,
};

const QUERY_USAGE: &str =
    "query user <id> [since <YYYY-MM-DD>] | query status <status> [since <YYYY-MM-DD>]";

#[derive(Clone, Debug, PartialEq)]
pub enum ClientCommand {
    Create,
    Drop,
    Populate,
    Scan { raw: bool },
    QueryUser { user_id: String, since: DateTime<Utc> },
    QueryStatus { status: JobStatus, since: DateTime<Utc> },
    Schema,
}

/// What a command produced, for the REPL to print.
#[derive(Default)]
pub struct CommandResult {
    pub message: Option<String>,
    pub reports: Option<Vec<JobReport>>,
    pub raw: Option<String>,
}

pub struct CommandExecutor<'a> {
    command: ClientCommand,
    session: &'a Session,
}

impl FromStr for ClientCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();

        let command = match words.as_slice() {
            ["create"] => ClientCommand::Create,
            ["drop"] => ClientCommand::Drop,
            ["populate"] => ClientCommand::Populate,
            ["scan"] => ClientCommand::Scan { raw: false },
            ["scan", "raw"] => ClientCommand::Scan { raw: true },
            ["schema"] => ClientCommand::Schema,
            ["query", "user", user_id, rest @ ..] => ClientCommand::QueryUser {
                user_id: user_id.to_string(),
                since: parse_since(rest)?,
            },
            ["query", "status", status, rest @ ..] => ClientCommand::QueryStatus {
                status: status.parse::<JobStatus>().map_err(|e| e.to_string())?,
                since: parse_since(rest)?,
            },
            ["query", ..] => return Err(format!("usage: {}", highlight_argument(QUERY_USAGE))),
            [] => return Err("no command given".to_string()),
            [other, ..] => {
                return Err(format!(
                    "unknown command '{}', try {}",
                    other,
                    highlight_argument("help")
                ));
            }
        };

        Ok(command)
    }
}

fn parse_since(rest: &[&str]) -> Result<DateTime<Utc>, String> {
    match rest {
        [] => Ok(jobs::default_since()),
        ["since", date] => parse_date(date),
        _ => Err(format!("usage: {}", highlight_argument(QUERY_USAGE))),
    }
}

impl CommandResult {
    fn message(message: String) -> CommandResult {
        CommandResult {
            message: Some(message),
            ..CommandResult::default()
        }
    }

    fn reports(reports: Vec<JobReport>) -> CommandResult {
        CommandResult {
            message: Some(format!("{} report(s) found.", reports.len())),
            reports: Some(reports),
            raw: None,
        }
    }
}

impl Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(reports) = &self.reports {
            writeln!(
                f,
                "UserId | JobCreationTimestamp | JobStatus | ReportS3 | ReportCreationTimestamp | FilterParameters"
            )?;
            for report in reports {
                writeln!(f, "{}", report)?;
            }
        }

        if let Some(raw) = &self.raw {
            writeln!(f, "{}", raw)?;
        }

        Ok(())
    }
}

impl<'a> CommandExecutor<'a> {
    pub fn new(command: ClientCommand, session: &'a Session) -> CommandExecutor<'a> {
        CommandExecutor { command, session }
    }

    pub async fn execute(&self) -> Result<CommandResult, String> {
        //! Run the assigned command against the session's store.
        //!
        //! Every error comes back already formatted as a system message.

        let session = self.session;

        let result = match &self.command {
            ClientCommand::Create => {
                let outcome = session
                    .lifecycle()
                    .ensure_created(session.schema())
                    .await
                    .map_err(failure)?;
                CommandResult::message(format!(
                    "Table {} {}.",
                    highlight_argument(jobs::TABLE_NAME),
                    outcome
                ))
            }
            ClientCommand::Drop => {
                let outcome = session
                    .lifecycle()
                    .ensure_deleted(jobs::TABLE_NAME)
                    .await
                    .map_err(failure)?;
                CommandResult::message(format!(
                    "Table {} {}.",
                    highlight_argument(jobs::TABLE_NAME),
                    outcome
                ))
            }
            ClientCommand::Populate => {
                let report = session.jobs().put_all(&jobs::sample_reports()).await;
                let mut message = format!("{}.", report);
                for (position, error) in report.failures.iter() {
                    message.push_str(&format!("\n  record {}: {}", position, error));
                }
                CommandResult::message(message)
            }
            ClientCommand::Scan { raw: false } => {
                CommandResult::reports(session.jobs().scan().await.map_err(failure)?)
            }
            ClientCommand::Scan { raw: true } => {
                let items = session
                    .store()
                    .scan(jobs::TABLE_NAME)
                    .await
                    .map_err(|e| failure(e.into()))?;
                CommandResult {
                    message: Some(format!("{} item(s) found.", items.len())),
                    reports: None,
                    raw: Some(to_json(&items)?),
                }
            }
            ClientCommand::QueryUser { user_id, since } => {
                let condition = jobs::by_user_since(user_id, *since).map_err(failure)?;
                CommandResult::reports(session.jobs().query(&condition).await.map_err(failure)?)
            }
            ClientCommand::QueryStatus { status, since } => {
                let condition = jobs::by_status_since(*status, *since).map_err(failure)?;
                CommandResult::reports(
                    session
                        .jobs()
                        .query_index(jobs::STATUS_INDEX, &condition)
                        .await
                        .map_err(failure)?,
                )
            }
            ClientCommand::Schema => CommandResult {
                message: Some(format!(
                    "{}\n{}",
                    session.schema(),
                    session.jobs().mapper()
                )),
                reports: None,
                raw: Some(to_json(session.schema())?),
            },
        };

        Ok(result)
    }
}

fn failure(error: Error) -> String {
    system_message("error", error.to_string())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| system_message("error", e.to_string()))
}
