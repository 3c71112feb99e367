//! Remote tables have to be declared, created and deleted before records can
//! go in, and the store only ever answers "what status is it in now":
//! - Schema (key attributes, secondary indexes, capacity hints)
//! - Wait (a deadline-bound, cancellable poll for a condition)
//! - Table lifecycle (drive a table to `ACTIVE` or gone, and block until it is)
//!

//  All modules of the lifecycle
mod schema;
mod table;
mod wait;

//  External API
pub use schema::{Capacity, KeyAttribute, Projection, SecondaryIndex, TableSchema, TableSchemaBuilder};
pub use table::{EmptyTablePolicy, LifecycleOutcome, TableLifecycle};
pub use wait::{Deadline, WaitError, WaitOptions, wait_until, wait_until_deadline};
