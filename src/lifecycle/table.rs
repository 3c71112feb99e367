use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use log::{debug, info, warn};
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::lifecycle::{Deadline, TableSchema, WaitError, WaitOptions, wait_until_deadline};
use crate::store::{StoreError, TableDescription, TableStatus, TableStore};

/// What to do when `ensure_created` finds the table `ACTIVE` but empty.
///
/// The store cannot change a table's schema in place. An empty table might
/// carry an older declaration, so by default it is dropped and created again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyTablePolicy {
    /// Delete the table, wait for it to go, and create it from the schema.
    #[default]
    Recreate,
    /// Fail with [`Error::RecreateRefused`] and leave the table alone.
    Refuse,
}

/// Which path a lifecycle operation took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The table was already `ACTIVE` and populated; nothing was issued.
    AlreadyActive,
    /// The table is now `ACTIVE`, created by this call or by a concurrent
    /// creator it waited on.
    Created,
    /// An empty table was deleted and created again.
    Recreated,
    /// There was no table; nothing was issued.
    AlreadyAbsent,
    /// The table is gone.
    Deleted,
}

/// Drives a remote table to `ACTIVE` or to gone, and blocks until the store
/// reports it there.
///
/// The store pushes no status changes. Every wait samples `describe_table`
/// once per poll interval until the status is right, the deadline passes
/// ([`Error::LifecycleTimeout`]) or the cancellation signal is raised
/// ([`Error::Cancelled`]). The deadline covers the whole operation: a
/// recreate spends one timeout across both its delete and its create. A failing store call ends the operation; nothing is
/// retried. A timed-out operation can leave the table mid-transition.
pub struct TableLifecycle<S> {
    store: Arc<S>,
    options: WaitOptions,
    empty_table_policy: EmptyTablePolicy,
}

impl<S: TableStore> TableLifecycle<S> {
    pub fn new(store: Arc<S>) -> TableLifecycle<S> {
        TableLifecycle::with_options(store, WaitOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: WaitOptions) -> TableLifecycle<S> {
        TableLifecycle {
            store,
            options,
            empty_table_policy: EmptyTablePolicy::default(),
        }
    }

    pub fn empty_table_policy(mut self, policy: EmptyTablePolicy) -> TableLifecycle<S> {
        self.empty_table_policy = policy;
        self
    }

    pub fn cancel_on(mut self, cancel: watch::Receiver<bool>) -> TableLifecycle<S> {
        self.options.cancel = Some(cancel);
        self
    }

    pub fn options(&self) -> &WaitOptions {
        &self.options
    }

    pub async fn status(&self, table: &str) -> Result<TableStatus> {
        //! Sample the table's status once. A table the store does not know is
        //! [`TableStatus::Absent`].

        Ok(self
            .describe(table)
            .await?
            .map(|description| description.status)
            .unwrap_or(TableStatus::Absent))
    }

    pub async fn ensure_created(&self, schema: &TableSchema) -> Result<LifecycleOutcome> {
        //! Make sure the table declared by `schema` exists and is `ACTIVE`.
        //!
        //! - `ACTIVE` with items: nothing to do
        //! - `ACTIVE` and empty: handled by the [`EmptyTablePolicy`]
        //! - `CREATING`: wait for `ACTIVE` without issuing a create
        //! - `DELETING`: wait for it to go, then create
        //! - absent: create, then wait for `ACTIVE`

        let name = schema.name();
        let deadline = Deadline::after(self.options.timeout);

        let outcome = match self.describe(name).await? {
            Some(TableDescription {
                status: TableStatus::Active,
                item_count,
                ..
            }) if item_count > 0 => {
                info!("table '{}' is active with {} item(s)", name, item_count);
                LifecycleOutcome::AlreadyActive
            }
            Some(TableDescription {
                status: TableStatus::Active,
                ..
            }) => match self.empty_table_policy {
                EmptyTablePolicy::Refuse => {
                    return Err(Error::RecreateRefused {
                        table: name.to_string(),
                    });
                }
                EmptyTablePolicy::Recreate => {
                    warn!("table '{}' is active but empty; dropping it to apply the declared schema", name);
                    self.delete_and_wait(name, deadline).await?;
                    self.create_and_wait(schema, deadline).await?;
                    LifecycleOutcome::Recreated
                }
            },
            Some(TableDescription {
                status: TableStatus::Creating,
                ..
            }) => {
                info!("table '{}' is already being created", name);
                self.wait_within(name, TableStatus::Active, deadline).await?;
                LifecycleOutcome::Created
            }
            Some(TableDescription {
                status: TableStatus::Deleting,
                ..
            }) => {
                info!("table '{}' is being deleted; creating it once it is gone", name);
                self.wait_within(name, TableStatus::Absent, deadline).await?;
                self.create_and_wait(schema, deadline).await?;
                LifecycleOutcome::Created
            }
            Some(TableDescription {
                status: TableStatus::Absent,
                ..
            })
            | None => {
                self.create_and_wait(schema, deadline).await?;
                LifecycleOutcome::Created
            }
        };

        Ok(outcome)
    }

    pub async fn ensure_deleted(&self, table: &str) -> Result<LifecycleOutcome> {
        //! Make sure `table` does not exist.
        //!
        //! An absent table costs exactly one status sample and nothing else.
        //! The store reporting the table as not found during the delete is
        //! success.

        let deadline = Deadline::after(self.options.timeout);
        let status = self.status(table).await?;

        match status {
            TableStatus::Absent => {
                info!("table '{}' does not exist; nothing to delete", table);
                return Ok(LifecycleOutcome::AlreadyAbsent);
            }
            TableStatus::Deleting => {
                self.wait_within(table, TableStatus::Absent, deadline).await?
            }
            TableStatus::Creating => {
                // A table still being created cannot be deleted yet.
                self.wait_within(table, TableStatus::Active, deadline).await?;
                self.delete_and_wait(table, deadline).await?;
            }
            TableStatus::Active => self.delete_and_wait(table, deadline).await?,
        }

        Ok(LifecycleOutcome::Deleted)
    }

    pub async fn wait_for_status(&self, table: &str, desired: TableStatus) -> Result<()> {
        //! Poll until `table` reports `desired`, within one timeout from now.

        self.wait_within(table, desired, Deadline::after(self.options.timeout))
            .await
    }

    async fn wait_within(&self, table: &str, desired: TableStatus, deadline: Deadline) -> Result<()> {
        let last_seen = Mutex::new(TableStatus::Absent);
        let seen = &last_seen;
        let lifecycle = self;

        let waited = wait_until_deadline(&self.options, deadline, move || async move {
            let status = lifecycle.status(table).await?;
            debug!("table '{}' is {}, waiting for {}", table, status, desired);
            *seen.lock().unwrap_or_else(|e| e.into_inner()) = status;
            Ok::<bool, Error>(status == desired)
        })
        .await;

        match waited {
            Ok(()) => {
                info!("table '{}' is {}", table, desired);
                Ok(())
            }
            Err(WaitError::Check(error)) => Err(error),
            Err(WaitError::Cancelled) => Err(Error::Cancelled {
                table: table.to_string(),
            }),
            Err(WaitError::TimedOut { waited }) => Err(Error::LifecycleTimeout {
                table: table.to_string(),
                desired,
                last_seen: *last_seen.lock().unwrap_or_else(|e| e.into_inner()),
                waited,
            }),
        }
    }

    async fn describe(&self, table: &str) -> Result<Option<TableDescription>> {
        match self.store.describe_table(table).await {
            Ok(description) => Ok(Some(description)),
            Err(StoreError::ResourceNotFound { .. }) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn create_and_wait(&self, schema: &TableSchema, deadline: Deadline) -> Result<()> {
        match self.store.create_table(schema).await {
            Ok(()) => info!("creating table {}", schema),
            Err(StoreError::ResourceInUse { .. }) => {
                info!("table '{}' is being created elsewhere", schema.name());
            }
            Err(error) => return Err(error.into()),
        }

        self.wait_within(schema.name(), TableStatus::Active, deadline)
            .await
    }

    async fn delete_and_wait(&self, table: &str, deadline: Deadline) -> Result<()> {
        match self.store.delete_table(table).await {
            Ok(()) => info!("deleting table '{}'", table),
            Err(StoreError::ResourceNotFound { .. }) => {
                debug!("table '{}' was already gone", table);
            }
            Err(error) => return Err(error.into()),
        }

        self.wait_within(table, TableStatus::Absent, deadline).await
    }
}

impl Display for LifecycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let outcome = match self {
            LifecycleOutcome::AlreadyActive => "already active",
            LifecycleOutcome::Created => "created",
            LifecycleOutcome::Recreated => "recreated",
            LifecycleOutcome::AlreadyAbsent => "already absent",
            LifecycleOutcome::Deleted => "deleted",
        };
        write!(f, "{}", outcome)
    }
}
