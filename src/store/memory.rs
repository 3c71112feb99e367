use std::{
    cmp::Ordering,
    sync::{
        RwLock, RwLockWriteGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
    },
};

use indexmap::IndexMap;
use log::debug;

use crate::lifecycle::{KeyAttribute, TableSchema};
use crate::mapping::{Item, WireValue};
use crate::store::{
    KeyCondition, StoreError, StoreResult, TableDescription, TableStatus, TableStore,
    compare_values,
};

type PrimaryKey = (WireValue, WireValue);

/// An in-process [`TableStore`].
///
/// Tables go through `CREATING` and `DELETING` the way a remote store's do:
/// each phase lasts a fixed number of `describe_table` samples (zero makes the
/// change immediate). Items are kept per table in insertion order and
/// replaced on a primary-key collision.
///
/// Every call is counted, see [`MemoryStore::calls`].
pub struct MemoryStore {
    tables: RwLock<IndexMap<String, MemoryTable>>,
    creating_samples: u32,
    deleting_samples: u32,
    unavailable: AtomicBool,
    counters: Counters,
}

/// Number of calls of each kind a [`MemoryStore`] has served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub describe: usize,
    pub create: usize,
    pub delete: usize,
    pub put: usize,
    pub scan: usize,
    pub query: usize,
}

struct MemoryTable {
    schema: TableSchema,
    status: TableStatus,
    samples_left: u32,
    items: IndexMap<PrimaryKey, Item>,
}

#[derive(Default)]
struct Counters {
    describe: AtomicUsize,
    create: AtomicUsize,
    delete: AtomicUsize,
    put: AtomicUsize,
    scan: AtomicUsize,
    query: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        //! A store whose tables change status immediately.

        MemoryStore::with_phases(0, 0)
    }

    pub fn with_phases(creating_samples: u32, deleting_samples: u32) -> MemoryStore {
        //! A store whose tables report `CREATING` for `creating_samples`
        //! describes after a create, and `DELETING` for `deleting_samples`
        //! describes after a delete.

        MemoryStore {
            tables: RwLock::new(IndexMap::new()),
            creating_samples,
            deleting_samples,
            unavailable: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    pub fn preload(&self, schema: TableSchema, items: Vec<Item>) -> StoreResult<()> {
        //! Put an already-`ACTIVE` table in place, bypassing the lifecycle and
        //! the call counters.

        let mut table = MemoryTable::new(schema, TableStatus::Active, 0);
        for item in items {
            table.put(item)?;
        }

        self.write_tables().insert(table.schema.name().to_string(), table);
        Ok(())
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        //! Make every call fail with [`StoreError::Unavailable`] until reset.

        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    pub fn calls(&self) -> CallCounts {
        let load = |counter: &AtomicUsize| counter.load(AtomicOrdering::SeqCst);

        CallCounts {
            describe: load(&self.counters.describe),
            create: load(&self.counters.create),
            delete: load(&self.counters.delete),
            put: load(&self.counters.put),
            scan: load(&self.counters.scan),
            query: load(&self.counters.query),
        }
    }

    pub fn table_names(&self) -> Vec<String> {
        self.write_tables().keys().cloned().collect()
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, IndexMap<String, MemoryTable>> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self, counter: &AtomicUsize) -> StoreResult<()> {
        counter.fetch_add(1, AtomicOrdering::SeqCst);

        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "the store is not accepting requests".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl TableStore for MemoryStore {
    async fn describe_table(&self, table: &str) -> StoreResult<TableDescription> {
        self.check_available(&self.counters.describe)?;

        let mut tables = self.write_tables();
        let entry = tables.get_mut(table).ok_or_else(|| not_found(table))?;

        let status = entry.status;

        if entry.samples_left > 0 {
            entry.samples_left -= 1;
        } else if status == TableStatus::Creating {
            entry.status = TableStatus::Active;
        } else if status == TableStatus::Deleting {
            tables.shift_remove(table);
            debug!("memory store: table '{}' is gone", table);
            return Err(not_found(table));
        }

        Ok(TableDescription {
            name: table.to_string(),
            status: entry.status,
            item_count: entry.items.len(),
            schema: entry.schema.clone(),
        })
    }

    async fn create_table(&self, schema: &TableSchema) -> StoreResult<()> {
        self.check_available(&self.counters.create)?;

        schema
            .attribute_definitions()
            .map_err(|e| StoreError::ValidationFailed {
                reason: e.to_string(),
            })?;

        let mut tables = self.write_tables();
        if let Some(existing) = tables.get(schema.name()) {
            return Err(StoreError::ResourceInUse {
                table: schema.name().to_string(),
                reason: format!("table already exists with status {}", existing.status),
            });
        }

        let table = if self.creating_samples == 0 {
            MemoryTable::new(schema.clone(), TableStatus::Active, 0)
        } else {
            MemoryTable::new(schema.clone(), TableStatus::Creating, self.creating_samples)
        };

        debug!("memory store: table '{}' is {}", schema.name(), table.status);
        tables.insert(schema.name().to_string(), table);
        Ok(())
    }

    async fn delete_table(&self, table: &str) -> StoreResult<()> {
        self.check_available(&self.counters.delete)?;

        let mut tables = self.write_tables();
        let entry = tables.get_mut(table).ok_or_else(|| not_found(table))?;

        if entry.status != TableStatus::Active {
            return Err(StoreError::ResourceInUse {
                table: table.to_string(),
                reason: format!("table is {}", entry.status),
            });
        }

        if self.deleting_samples == 0 {
            tables.shift_remove(table);
        } else {
            entry.status = TableStatus::Deleting;
            entry.samples_left = self.deleting_samples;
            entry.items.clear();
        }

        debug!("memory store: delete of table '{}' accepted", table);
        Ok(())
    }

    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        self.check_available(&self.counters.put)?;

        let mut tables = self.write_tables();
        let entry = active_table(&mut tables, table)?;
        entry.put(item)
    }

    async fn scan(&self, table: &str) -> StoreResult<Vec<Item>> {
        self.check_available(&self.counters.scan)?;

        let mut tables = self.write_tables();
        let entry = active_table(&mut tables, table)?;
        Ok(entry.items.values().cloned().collect())
    }

    async fn query(
        &self,
        table: &str,
        index: Option<&str>,
        condition: &KeyCondition,
    ) -> StoreResult<Vec<Item>> {
        self.check_available(&self.counters.query)?;

        let mut tables = self.write_tables();
        let entry = active_table(&mut tables, table)?;

        let (partition_key, sort_key) = match index {
            Some(name) => {
                let index = entry.schema.index(name).ok_or_else(|| StoreError::ValidationFailed {
                    reason: format!("table '{}' has no index '{}'", table, name),
                })?;
                (&index.partition_key, index.sort_key.as_ref())
            }
            None => (entry.schema.partition_key(), entry.schema.sort_key()),
        };

        if condition.partition_key != partition_key.name {
            return Err(StoreError::ValidationFailed {
                reason: format!(
                    "query must name the partition key '{}', not '{}'",
                    partition_key.name, condition.partition_key
                ),
            });
        }

        if let Some((name, _)) = &condition.sort {
            if sort_key.is_none_or(|key| key.name != *name) {
                return Err(StoreError::ValidationFailed {
                    reason: format!("'{}' is not the sort key", name),
                });
            }
        }

        let mut matched: Vec<Item> = entry
            .items
            .values()
            .filter(|item| condition.matches(item))
            .cloned()
            .collect();

        if let Some(sort_key) = sort_key {
            matched.sort_by(|left, right| {
                match (left.get(&sort_key.name), right.get(&sort_key.name)) {
                    (Some(left), Some(right)) => {
                        compare_values(left, right).unwrap_or(Ordering::Equal)
                    }
                    _ => Ordering::Equal,
                }
            });
        }

        Ok(matched)
    }
}

impl MemoryTable {
    fn new(schema: TableSchema, status: TableStatus, samples_left: u32) -> MemoryTable {
        MemoryTable {
            schema,
            status,
            samples_left,
            items: IndexMap::new(),
        }
    }

    fn put(&mut self, item: Item) -> StoreResult<()> {
        //! Check the item's key attributes and store it under its primary key.
        //!
        //! Base-table keys must be present. Index keys may be missing (the item
        //! just stays out of that index) but must have the right kind when
        //! present.

        let partition = key_value(&item, self.schema.partition_key())?;
        let sort = match self.schema.sort_key() {
            Some(sort_key) => key_value(&item, sort_key)?,
            None => WireValue::Absent,
        };

        for index in self.schema.indexes() {
            for key in index.key_attributes() {
                if item.contains_key(&key.name) {
                    key_value(&item, key)?;
                }
            }
        }

        self.items.insert((partition, sort), item);
        Ok(())
    }
}

fn key_value(item: &Item, key: &KeyAttribute) -> StoreResult<WireValue> {
    match item.get(&key.name) {
        Some(value) if value.kind() == Some(key.kind) => Ok(value.clone()),
        Some(value) => Err(StoreError::ValidationFailed {
            reason: format!(
                "key attribute '{}' must be {}, found {}",
                key.name, key.kind, value
            ),
        }),
        None => Err(StoreError::ValidationFailed {
            reason: format!("missing key attribute '{}'", key.name),
        }),
    }
}

fn active_table<'a>(
    tables: &'a mut IndexMap<String, MemoryTable>,
    table: &str,
) -> StoreResult<&'a mut MemoryTable> {
    match tables.get_mut(table) {
        Some(entry) if entry.status == TableStatus::Active => Ok(entry),
        _ => Err(not_found(table)),
    }
}

fn not_found(table: &str) -> StoreError {
    StoreError::ResourceNotFound {
        table: table.to_string(),
    }
}
