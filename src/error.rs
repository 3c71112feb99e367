//! Every failure the mapper, the lifecycle driver and the configuration can
//! report, in one place.
//!
//! Construction-time errors (`UnsupportedType`, `FieldNot*`, `DuplicateField`,
//! `ModelConstruction`) are fatal to the mapper being built. Decode-time errors
//! (`WireTypeMismatch`, `WireFormat`, `RequiredFieldMissing`) are fatal to the
//! one decode call. Nothing in here is retried by the crate itself.

use std::time::Duration;

use thiserror::Error as ThisError;

use crate::mapping::WireKind;
use crate::store::{StoreError, TableStatus};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unsupported type {native}{}: no wire kind maps to it", field_suffix(.field))]
    UnsupportedType {
        native: String,
        field: Option<String>,
    },

    #[error("field '{field}' does not exist on {entity}")]
    FieldNotFound { entity: String, field: String },

    #[error("field '{field}' on {entity} is not readable")]
    FieldNotReadable { entity: String, field: String },

    #[error("field '{field}' on {entity} is not writable")]
    FieldNotWritable { entity: String, field: String },

    #[error("field '{field}' is registered more than once on {entity}")]
    DuplicateField { entity: String, field: String },

    #[error("wire type mismatch{}: expected {expected}, found {found}", field_suffix(.field))]
    WireTypeMismatch {
        field: Option<String>,
        expected: WireKind,
        found: &'static str,
    },

    #[error("invalid {native} payload '{payload}'{}: {reason}", field_suffix(.field))]
    WireFormat {
        field: Option<String>,
        native: String,
        payload: String,
        reason: String,
    },

    #[error("field '{field}' on {entity} is required but holds no value")]
    NullFieldValue { entity: String, field: String },

    #[error("required attribute '{field}' for {entity} is missing")]
    RequiredFieldMissing { entity: String, field: String },

    #[error("could not build a model for {entity}: {source}")]
    ModelConstruction {
        entity: String,
        #[source]
        source: Box<Error>,
    },

    #[error("conflicting declaration in table '{table}': {reason}")]
    SchemaConflict { table: String, reason: String },

    #[error(
        "table '{table}' did not reach {desired} within {waited:?} (last seen {last_seen})"
    )]
    LifecycleTimeout {
        table: String,
        desired: TableStatus,
        last_seen: TableStatus,
        waited: Duration,
    },

    #[error("waiting on table '{table}' was cancelled")]
    Cancelled { table: String },

    #[error("table '{table}' exists but is empty; refusing to drop and recreate it")]
    RecreateRefused { table: String },

    #[error("missing credential: environment variable {variable} is not set")]
    MissingCredential { variable: String },

    #[error("invalid configuration value for {variable}: '{value}'")]
    InvalidConfig { variable: String, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Flat classification of an [`Error`], for callers that only need to
/// branch on what went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedType,
    FieldNotFound,
    FieldNotReadable,
    FieldNotWritable,
    DuplicateField,
    WireTypeMismatch,
    WireFormatError,
    NullFieldValue,
    RequiredFieldMissing,
    ModelConstructionError,
    SchemaConflict,
    LifecycleTimeout,
    Cancelled,
    RecreateRefused,
    MissingCredential,
    InvalidConfig,
    Store,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Error::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            Error::FieldNotReadable { .. } => ErrorKind::FieldNotReadable,
            Error::FieldNotWritable { .. } => ErrorKind::FieldNotWritable,
            Error::DuplicateField { .. } => ErrorKind::DuplicateField,
            Error::WireTypeMismatch { .. } => ErrorKind::WireTypeMismatch,
            Error::WireFormat { .. } => ErrorKind::WireFormatError,
            Error::NullFieldValue { .. } => ErrorKind::NullFieldValue,
            Error::RequiredFieldMissing { .. } => ErrorKind::RequiredFieldMissing,
            Error::ModelConstruction { .. } => ErrorKind::ModelConstructionError,
            Error::SchemaConflict { .. } => ErrorKind::SchemaConflict,
            Error::LifecycleTimeout { .. } => ErrorKind::LifecycleTimeout,
            Error::Cancelled { .. } => ErrorKind::Cancelled,
            Error::RecreateRefused { .. } => ErrorKind::RecreateRefused,
            Error::MissingCredential { .. } => ErrorKind::MissingCredential,
            Error::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Error::Store(_) => ErrorKind::Store,
        }
    }

    pub(crate) fn on_field(self, name: &str) -> Error {
        //! Attach a field name to a codec error raised without one.
        //!
        //! Errors that already carry a field, or have no slot for one, are
        //! returned untouched.

        match self {
            Error::UnsupportedType { native, field: None } => Error::UnsupportedType {
                native,
                field: Some(name.to_string()),
            },
            Error::WireTypeMismatch {
                field: None,
                expected,
                found,
            } => Error::WireTypeMismatch {
                field: Some(name.to_string()),
                expected,
                found,
            },
            Error::WireFormat {
                field: None,
                native,
                payload,
                reason,
            } => Error::WireFormat {
                field: Some(name.to_string()),
                native,
                payload,
                reason,
            },
            other => other,
        }
    }

    pub fn root_cause(&self) -> &Error {
        //! Unwrap [`Error::ModelConstruction`] down to the field failure that
        //! triggered it.

        match self {
            Error::ModelConstruction { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(" on field '{}'", name),
        None => String::new(),
    }
}
