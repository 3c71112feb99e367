//! The boundary to the remote key-value store.
//!
//! Everything past [`TableStore`] belongs to the store: tables, their status,
//! the items in them. The crate only ever talks to it in
//! [`crate::mapping::Item`]s and [`TableSchema`]s. [`MemoryStore`] is an
//! in-process store with the same observable behaviour, used by the demo and
//! the tests.
//!

//  All modules of the store boundary
mod entity_table;
mod memory;

//  External API
pub use entity_table::{EntityTable, PopulateReport};
pub use memory::{CallCounts, MemoryStore};

use std::{cmp::Ordering, fmt::Display, future::Future};

use rust_decimal::Decimal;
use thiserror::Error as ThisError;

use crate::lifecycle::TableSchema;
use crate::mapping::{Item, WireValue, codec};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Remote table status, as far as the store reports it.
///
/// Only [`TableStatus::Absent`] and [`TableStatus::Active`] are rest points;
/// the other two are only ever seen in passing, if at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableStatus {
    Absent,
    Creating,
    Active,
    Deleting,
}

/// A failure reported by the store itself. Propagated unchanged.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
    #[error("table '{table}' was not found")]
    ResourceNotFound { table: String },

    #[error("table '{table}' is in use: {reason}")]
    ResourceInUse { table: String, reason: String },

    #[error("request rejected by the store: {reason}")]
    ValidationFailed { reason: String },

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// A status sample for one table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableDescription {
    pub name: String,
    pub status: TableStatus,
    pub item_count: usize,
    pub schema: TableSchema,
}

/// A condition on the sort key of a query.
///
/// Numbers compare numerically, strings lexicographically. A value of the
/// other kind never matches.
#[derive(Clone, Debug, PartialEq)]
pub enum SortCondition {
    Eq(WireValue),
    Lt(WireValue),
    Le(WireValue),
    Gt(WireValue),
    Ge(WireValue),
    Between(WireValue, WireValue),
    BeginsWith(String),
}

/// The key half of a query: an exact partition key and an optional
/// condition on the sort key.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition {
    pub partition_key: String,
    pub partition_value: WireValue,
    pub sort: Option<(String, SortCondition)>,
}

/// The calls the crate makes against a remote store.
///
/// Implementations report a missing table as
/// [`StoreError::ResourceNotFound`] from `describe_table` and
/// `delete_table`. Nothing here retries.
pub trait TableStore: Send + Sync {
    fn describe_table(
        &self,
        table: &str,
    ) -> impl Future<Output = StoreResult<TableDescription>> + Send;

    fn create_table(&self, schema: &TableSchema) -> impl Future<Output = StoreResult<()>> + Send;

    fn delete_table(&self, table: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Write one item, replacing any item with the same primary key.
    fn put_item(&self, table: &str, item: Item) -> impl Future<Output = StoreResult<()>> + Send;

    fn scan(&self, table: &str) -> impl Future<Output = StoreResult<Vec<Item>>> + Send;

    /// Query the base table, or the named secondary index, ordered by sort
    /// key.
    fn query(
        &self,
        table: &str,
        index: Option<&str>,
        condition: &KeyCondition,
    ) -> impl Future<Output = StoreResult<Vec<Item>>> + Send;
}

impl Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            TableStatus::Absent => "ABSENT",
            TableStatus::Creating => "CREATING",
            TableStatus::Active => "ACTIVE",
            TableStatus::Deleting => "DELETING",
        };
        write!(f, "{}", status)
    }
}

impl SortCondition {
    pub fn matches(&self, value: &WireValue) -> bool {
        let order = |bound: &WireValue| compare_values(value, bound);

        match self {
            SortCondition::Eq(bound) => order(bound) == Some(Ordering::Equal),
            SortCondition::Lt(bound) => order(bound) == Some(Ordering::Less),
            SortCondition::Le(bound) => matches!(order(bound), Some(Ordering::Less | Ordering::Equal)),
            SortCondition::Gt(bound) => order(bound) == Some(Ordering::Greater),
            SortCondition::Ge(bound) => {
                matches!(order(bound), Some(Ordering::Greater | Ordering::Equal))
            }
            SortCondition::Between(low, high) => {
                matches!(order(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(order(high), Some(Ordering::Less | Ordering::Equal))
            }
            SortCondition::BeginsWith(prefix) => match value {
                WireValue::String(text) => text.starts_with(prefix.as_str()),
                _ => false,
            },
        }
    }
}

impl KeyCondition {
    pub fn partition(name: &str, value: WireValue) -> KeyCondition {
        KeyCondition {
            partition_key: name.to_string(),
            partition_value: value,
            sort: None,
        }
    }

    pub fn sort(mut self, name: &str, condition: SortCondition) -> KeyCondition {
        self.sort = Some((name.to_string(), condition));
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        //! Whether `item` satisfies both halves of the condition. An item
        //! missing either key attribute never matches.

        let partition = item
            .get(&self.partition_key)
            .map(|value| compare_values(value, &self.partition_value) == Some(Ordering::Equal))
            .unwrap_or(false);

        match &self.sort {
            Some((name, condition)) => {
                partition && item.get(name).is_some_and(|value| condition.matches(value))
            }
            None => partition,
        }
    }
}

pub fn compare_values(left: &WireValue, right: &WireValue) -> Option<Ordering> {
    //! Order two wire values of the same kind. [`None`] when the kinds differ,
    //! either side is absent, or a number does not parse.

    match (left, right) {
        (WireValue::String(left), WireValue::String(right)) => Some(left.cmp(right)),
        (WireValue::Number(left), WireValue::Number(right)) => {
            let left = parse_decimal(left)?;
            let right = parse_decimal(right)?;
            Some(left.cmp(&right))
        }
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    codec::decimal_from_text(text).ok()
}
