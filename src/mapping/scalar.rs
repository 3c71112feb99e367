use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::mapping::WireKind;

/// The closed set of native kinds a record field can have.
///
/// The first block is what the mapper supports. The second block exists only
/// so that [`NativeType::wire_kind`] has something to refuse: the wire carries
/// none of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeType {
    String,
    Char,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Timestamp,
    /// An enumeration and its declared case names, in declaration order.
    Enumeration(&'static [&'static str]),

    Boolean,
    Binary,
    List,
    Map,
    Record,
}

/// A native value already lifted out of a record field.
///
/// One variant per supported [`NativeType`]; the codec matches on both
/// exhaustively.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    String(String),
    Char(char),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
    Enumeration(&'static str),
}

/// Anything that can sit in a mapped record field.
///
/// Implemented for the supported scalars, for [`Option`] of any of them
/// (nullable fields), and for enums declared through
/// [`wire_enum!`](crate::wire_enum). `bool` and `Vec<u8>` implement it too but
/// report an unsupported [`NativeType`], so a model holding one never builds.
pub trait FieldValue: Sized + Send + Sync + 'static {
    const NATIVE: NativeType;

    /// Lift the value out of the field. [`None`] means the field holds no
    /// value.
    fn to_scalar(&self) -> Option<ScalarValue>;

    /// Put a decoded scalar back into native form. [`None`] when the scalar
    /// is not of this type's kind.
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

impl NativeType {
    pub fn wire_kind(&self) -> Result<WireKind> {
        //! The total, fixed mapping from native kind to wire kind.

        match self {
            NativeType::String | NativeType::Char | NativeType::Enumeration(_) => {
                Ok(WireKind::String)
            }
            NativeType::Int16
            | NativeType::Int32
            | NativeType::Int64
            | NativeType::Float32
            | NativeType::Float64
            | NativeType::Decimal
            | NativeType::Timestamp => Ok(WireKind::Number),
            NativeType::Boolean
            | NativeType::Binary
            | NativeType::List
            | NativeType::Map
            | NativeType::Record => Err(Error::UnsupportedType {
                native: self.to_string(),
                field: None,
            }),
        }
    }
}

impl Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NativeType::String => "string",
            NativeType::Char => "char",
            NativeType::Int16 => "i16",
            NativeType::Int32 => "i32",
            NativeType::Int64 => "i64",
            NativeType::Float32 => "f32",
            NativeType::Float64 => "f64",
            NativeType::Decimal => "decimal",
            NativeType::Timestamp => "timestamp",
            NativeType::Enumeration(_) => "enum",
            NativeType::Boolean => "bool",
            NativeType::Binary => "binary",
            NativeType::List => "list",
            NativeType::Map => "map",
            NativeType::Record => "record",
        };
        write!(f, "{}", name)
    }
}

macro_rules! scalar_field_value {
    ($native:ty, $kind:ident) => {
        impl FieldValue for $native {
            const NATIVE: NativeType = NativeType::$kind;

            fn to_scalar(&self) -> Option<ScalarValue> {
                Some(ScalarValue::$kind(self.clone()))
            }

            fn from_scalar(value: ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::$kind(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

scalar_field_value!(String, String);
scalar_field_value!(char, Char);
scalar_field_value!(i16, Int16);
scalar_field_value!(i32, Int32);
scalar_field_value!(i64, Int64);
scalar_field_value!(f32, Float32);
scalar_field_value!(f64, Float64);
scalar_field_value!(Decimal, Decimal);
scalar_field_value!(DateTime<Utc>, Timestamp);

impl<T: FieldValue> FieldValue for Option<T> {
    const NATIVE: NativeType = T::NATIVE;

    fn to_scalar(&self) -> Option<ScalarValue> {
        self.as_ref().and_then(T::to_scalar)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        T::from_scalar(value).map(Some)
    }
}

// The wire has no boolean or binary kind. These exist so that a record holding
// one is rejected when its model is built, not when it is first written.

impl FieldValue for bool {
    const NATIVE: NativeType = NativeType::Boolean;

    fn to_scalar(&self) -> Option<ScalarValue> {
        None
    }

    fn from_scalar(_value: ScalarValue) -> Option<Self> {
        None
    }
}

impl FieldValue for Vec<u8> {
    const NATIVE: NativeType = NativeType::Binary;

    fn to_scalar(&self) -> Option<ScalarValue> {
        None
    }

    fn from_scalar(_value: ScalarValue) -> Option<Self> {
        None
    }
}
