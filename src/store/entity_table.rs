use std::{fmt::Display, sync::Arc};

use futures::future::join_all;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::mapping::{Entity, EntityMapper, Item, mapper_for};
use crate::store::{KeyCondition, TableStore};

/// One table read and written as records of type `R`.
///
/// Every write goes through [`EntityMapper::to_store_item`] and every read
/// through [`EntityMapper::decode_record`], so the store only ever sees wire
/// attributes.
pub struct EntityTable<R, S> {
    store: Arc<S>,
    table: String,
    mapper: Arc<EntityMapper<R>>,
}

/// The outcome of writing many records concurrently.
///
/// Writes are independent: a failure leaves the others in place, so a report
/// with failures means the table holds a partial population.
#[derive(Debug, Default)]
pub struct PopulateReport {
    pub written: usize,
    /// Position of each failed record in the input, and why it failed.
    pub failures: Vec<(usize, Error)>,
}

impl<R: Entity, S: TableStore> EntityTable<R, S> {
    pub fn new(store: Arc<S>, table: &str) -> Result<EntityTable<R, S>> {
        //! Open `table` with the shared mapper for `R`.

        Ok(EntityTable::with_mapper(store, table, mapper_for::<R>()?))
    }

    pub fn with_mapper(store: Arc<S>, table: &str, mapper: Arc<EntityMapper<R>>) -> EntityTable<R, S> {
        EntityTable {
            store,
            table: table.to_string(),
            mapper,
        }
    }

    pub fn name(&self) -> &str {
        &self.table
    }

    pub fn mapper(&self) -> &EntityMapper<R> {
        &self.mapper
    }

    pub async fn put(&self, record: &R) -> Result<()> {
        //! Write one record. Fields without a value are left off the item.

        let item = self.mapper.to_store_item(record)?;
        self.store.put_item(&self.table, item).await?;
        Ok(())
    }

    pub async fn put_all(&self, records: &[R]) -> PopulateReport {
        //! Write every record concurrently and wait for all of them.
        //!
        //! No ordering holds between the writes and nothing is rolled back.

        let results = join_all(records.iter().map(|record| self.put(record))).await;
        let mut report = PopulateReport::default();

        for (position, result) in results.into_iter().enumerate() {
            match result {
                Ok(()) => report.written += 1,
                Err(error) => {
                    warn!(
                        "{}: record {} was not written: {}",
                        self.table, position, error
                    );
                    report.failures.push((position, error));
                }
            }
        }

        debug!("{}: populated {}", self.table, report);
        report
    }

    pub async fn scan(&self) -> Result<Vec<R>> {
        let items = self.store.scan(&self.table).await?;
        self.decode_all(&items)
    }

    pub async fn query(&self, condition: &KeyCondition) -> Result<Vec<R>> {
        //! Query the base table's composite key.

        let items = self.store.query(&self.table, None, condition).await?;
        self.decode_all(&items)
    }

    pub async fn query_index(&self, index: &str, condition: &KeyCondition) -> Result<Vec<R>> {
        //! Query a secondary index.
        //!
        //! Indexes catch up with base-table writes asynchronously; right after
        //! a write, a query here may not see it yet. Wait out a settling delay
        //! first when that matters.

        let items = self.store.query(&self.table, Some(index), condition).await?;
        self.decode_all(&items)
    }

    fn decode_all(&self, items: &[Item]) -> Result<Vec<R>> {
        items
            .iter()
            .map(|item| self.mapper.decode_record(item))
            .collect()
    }
}

impl PopulateReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.written + self.failures.len()
    }
}

impl Display for PopulateReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} record(s) written",
            self.written,
            self.attempted()
        )
    }
}
