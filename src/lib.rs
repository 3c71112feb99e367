//! An entity mapper and table lifecycle driver for schemaless key-value
//! stores.
//!
//! - [`mapping`] binds record types to the two wire kinds a store keeps
//!   (string and decimal-text number) and converts whole records both ways
//! - [`lifecycle`] declares tables and drives them to `ACTIVE` or gone by
//!   polling the store
//! - [`store`] is the boundary to the store itself, with an in-process
//!   implementation
//!

pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod lifecycle;
pub mod mapping;
pub mod sessions;
pub mod store;

pub use error::{Error, ErrorKind, Result};
