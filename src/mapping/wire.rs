use std::fmt::Display;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The only two kinds of populated attribute the mapper ever emits.
///
/// Every supported native type resolves to exactly one of these, see
/// [`super::scalar::NativeType::wire_kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireKind {
    #[serde(rename = "S")]
    String,
    #[serde(rename = "N")]
    Number,
}

/// A single attribute as it crosses the store boundary.
///
/// Numbers are carried as decimal text so nothing is lost on the way; the
/// mapper only ever parses and formats them. [`WireValue::Absent`] is the
/// attribute not being there at all, which is not the same as an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[default]
    Absent,
}

/// A whole record on the wire: attribute name to value, in field declaration
/// order when produced by an [`super::EntityMapper`].
pub type Item = IndexMap<String, WireValue>;

impl WireKind {
    pub fn code(&self) -> &'static str {
        //! The short code the store uses for the kind in attribute
        //! definitions (`S` or `N`).

        match self {
            WireKind::String => "S",
            WireKind::Number => "N",
        }
    }
}

impl Display for WireKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            WireKind::String => "STRING",
            WireKind::Number => "NUMBER",
        };
        write!(f, "{}", kind)
    }
}

impl FromStr for WireKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        //! Parse a key kind as written in a table declaration.
        //!
        //! Binary (`B`) and every other store kind is refused with
        //! [`Error::UnsupportedType`].

        match s.trim() {
            "S" | "s" | "str" | "string" => Ok(WireKind::String),
            "N" | "n" | "num" | "number" => Ok(WireKind::Number),
            other => Err(Error::UnsupportedType {
                native: other.to_string(),
                field: None,
            }),
        }
    }
}

impl WireValue {
    pub fn string(value: impl Into<String>) -> WireValue {
        WireValue::String(value.into())
    }

    pub fn number(value: impl Into<String>) -> WireValue {
        WireValue::Number(value.into())
    }

    pub fn kind(&self) -> Option<WireKind> {
        //! Kind of the populated variant, [`None`] when absent.

        match self {
            WireValue::String(_) => Some(WireKind::String),
            WireValue::Number(_) => Some(WireKind::Number),
            WireValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, WireValue::Absent)
    }

    pub fn payload(&self) -> Option<&str> {
        //! The raw text carried by either populated variant.

        match self {
            WireValue::String(text) | WireValue::Number(text) => Some(text.as_str()),
            WireValue::Absent => None,
        }
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            WireValue::String(_) => "S",
            WireValue::Number(_) => "N",
            WireValue::Absent => "absent",
        }
    }
}

impl Display for WireValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireValue::String(text) => write!(f, "S({:?})", text),
            WireValue::Number(text) => write!(f, "N({})", text),
            WireValue::Absent => write!(f, "NIL"),
        }
    }
}
