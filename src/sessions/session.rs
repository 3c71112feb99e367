//! The only point of truth for everything tied to the current command line
//! session: command history, the configuration it was started with, and the
//! handles to the store it works against.
//!
//! A session owns one store for its whole lifetime. The job table and its
//! lifecycle driver are both opened on that store, so every command sees the
//! effects of the ones before it.

use std::{fmt::Display, sync::Arc, time::SystemTime};

use chrono::{DateTime, Local};

use crate::{
    config::ClientConfig,
    error::Result,
    jobs::{self, JobReport},
    lifecycle::{TableLifecycle, TableSchema},
    store::{EntityTable, MemoryStore},
};

/// One REPL line, stamped with when it was entered.
struct HistoryEntry {
    line: String,
    entered_at: SystemTime,
}

impl Display for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", local_time(self.entered_at), self.line)
    }
}

pub struct Session {
    command_history: Vec<HistoryEntry>,
    start_time: SystemTime,
    config: ClientConfig,
    store: Arc<MemoryStore>,
    schema: TableSchema,
    lifecycle: TableLifecycle<MemoryStore>,
    jobs: EntityTable<JobReport, MemoryStore>,
}

impl Session {
    pub fn client(config: ClientConfig, store: &Arc<MemoryStore>) -> Result<Session> {
        //! Returns a new client session over `store`.
        //!
        //! Fails if the job table's declaration does not fit the job record.

        let jobs = EntityTable::new(Arc::clone(store), jobs::TABLE_NAME)?;
        let schema = jobs::schema()?;
        schema.validate_against(jobs.mapper())?;

        Ok(Session {
            command_history: vec![],
            start_time: SystemTime::now(),
            lifecycle: TableLifecycle::with_options(Arc::clone(store), config.wait_options()),
            config,
            store: Arc::clone(store),
            schema,
            jobs,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn lifecycle(&self) -> &TableLifecycle<MemoryStore> {
        &self.lifecycle
    }

    pub fn jobs(&self) -> &EntityTable<JobReport, MemoryStore> {
        &self.jobs
    }

    pub fn add_to_command_history(&mut self, command: &str) {
        self.command_history.push(HistoryEntry {
            line: command.to_string(),
            entered_at: SystemTime::now(),
        });
    }

    pub fn start_time_string(&self) -> String {
        local_time(self.start_time)
    }

    pub fn show_command_history(&self, n_prev: Option<usize>) {
        //! Show the list of previously invoked commands.
        //! Use `n_prev` to limit the number of commands you see.

        let limit = n_prev.unwrap_or(self.command_history.len());

        for (index, command) in self.command_history.iter().rev().enumerate().take(limit) {
            println!("{:3} | {}", index, command);
        }
    }

    pub fn get_last_command(&self, nth_back: usize) -> Option<&str> {
        //! Gets the `nth_back`th last command from the history.

        if nth_back == 0 {
            return None;
        }

        self.command_history
            .iter()
            .nth_back(nth_back - 1)
            .map(|entry| entry.line.as_str())
    }
}

fn local_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}
