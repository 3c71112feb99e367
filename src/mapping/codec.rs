//! Encode and decode single scalars to and from [`WireValue`]s.
//!
//! Strings and chars travel as `S`, every numeric kind as `N` in plain
//! decimal text (no grouping, `.` as the point, never exponent form), and
//! timestamps as `N` tick counts:
//!
//! - one tick is 100 nanoseconds,
//! - tick zero is 0001-01-01T00:00:00Z,
//! - so 2024-01-01T00:00:00Z is `638396640000000000`.
//!
//! Enumerations travel as `S` holding the case name, never the ordinal.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::mapping::{NativeType, ScalarValue, WireKind, WireValue};

pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 0001-01-01 and 1970-01-01.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

const NANOS_PER_TICK: u32 = 100;
const MAX_SUBSEC_NANOS: u32 = 999_999_999;

pub fn kind_of(native: NativeType) -> Result<WireKind> {
    native.wire_kind()
}

pub fn encode(native: NativeType, value: &ScalarValue) -> Result<WireValue> {
    //! Encode one native value for the wire.
    //!
    //! Fails with [`Error::UnsupportedType`] for kinds the wire cannot carry
    //! and [`Error::WireFormat`] for numbers it cannot represent (NaN,
    //! infinities, timestamps outside the tick range).

    native.wire_kind()?;

    let wire = match (native, value) {
        (NativeType::String, ScalarValue::String(text)) => WireValue::String(text.clone()),
        (NativeType::Char, ScalarValue::Char(c)) => WireValue::String(c.to_string()),
        (NativeType::Int16, ScalarValue::Int16(n)) => WireValue::Number(n.to_string()),
        (NativeType::Int32, ScalarValue::Int32(n)) => WireValue::Number(n.to_string()),
        (NativeType::Int64, ScalarValue::Int64(n)) => WireValue::Number(n.to_string()),
        (NativeType::Float32, ScalarValue::Float32(n)) => {
            if !n.is_finite() {
                return Err(format_error(native, n, "not a finite number"));
            }
            WireValue::Number(n.to_string())
        }
        (NativeType::Float64, ScalarValue::Float64(n)) => {
            if !n.is_finite() {
                return Err(format_error(native, n, "not a finite number"));
            }
            WireValue::Number(n.to_string())
        }
        (NativeType::Decimal, ScalarValue::Decimal(n)) => WireValue::Number(n.to_string()),
        (NativeType::Timestamp, ScalarValue::Timestamp(ts)) => {
            WireValue::Number(to_ticks(ts)?.to_string())
        }
        (NativeType::Enumeration(cases), ScalarValue::Enumeration(name)) => {
            if !cases.contains(name) {
                return Err(format_error(native, name, "not a declared case"));
            }
            WireValue::String(name.to_string())
        }
        (native, value) => {
            return Err(format_error(
                native,
                format!("{:?}", value),
                "value does not match the declared type",
            ));
        }
    };

    Ok(wire)
}

pub fn decode(native: NativeType, wire: &WireValue) -> Result<ScalarValue> {
    //! Decode one wire value into the native kind.
    //!
    //! Fails with [`Error::WireTypeMismatch`] when the populated variant is
    //! not the one the kind maps to (absence included), and with
    //! [`Error::WireFormat`] when the payload does not parse.

    let payload = expect_kind(native, wire)?;

    let scalar = match native {
        NativeType::String => ScalarValue::String(payload.to_string()),
        NativeType::Char => {
            let mut chars = payload.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ScalarValue::Char(c),
                _ => return Err(format_error(native, payload, "expected exactly one character")),
            }
        }
        NativeType::Int16 => ScalarValue::Int16(parse_number(native, payload)?),
        NativeType::Int32 => ScalarValue::Int32(parse_number(native, payload)?),
        NativeType::Int64 => ScalarValue::Int64(parse_number(native, payload)?),
        NativeType::Float32 => {
            let n: f32 = parse_number(native, payload)?;
            if !n.is_finite() {
                return Err(format_error(native, payload, "not a finite number"));
            }
            ScalarValue::Float32(n)
        }
        NativeType::Float64 => {
            let n: f64 = parse_number(native, payload)?;
            if !n.is_finite() {
                return Err(format_error(native, payload, "not a finite number"));
            }
            ScalarValue::Float64(n)
        }
        NativeType::Decimal => {
            let n = decimal_from_text(payload).map_err(|e| format_error(native, payload, e))?;
            ScalarValue::Decimal(n)
        }
        NativeType::Timestamp => {
            let ticks: i64 = parse_number(native, payload)?;
            ScalarValue::Timestamp(from_ticks(ticks)?)
        }
        NativeType::Enumeration(cases) => match cases.iter().find(|case| **case == payload) {
            Some(case) => ScalarValue::Enumeration(*case),
            None => {
                return Err(format_error(
                    native,
                    payload,
                    format!("expected one of [{}]", cases.join(", ")),
                ));
            }
        },
        NativeType::Boolean
        | NativeType::Binary
        | NativeType::List
        | NativeType::Map
        | NativeType::Record => {
            return Err(Error::UnsupportedType {
                native: native.to_string(),
                field: None,
            });
        }
    };

    Ok(scalar)
}

pub fn to_ticks(timestamp: &DateTime<Utc>) -> Result<i64> {
    //! Convert a timestamp to its tick count.
    //!
    //! A leap second has no tick of its own: it encodes as the last tick of
    //! the second before.

    let nanos = timestamp.timestamp_subsec_nanos().min(MAX_SUBSEC_NANOS);
    let sub_ticks = i64::from(nanos / NANOS_PER_TICK);

    timestamp
        .timestamp()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|ticks| ticks.checked_add(sub_ticks))
        .and_then(|ticks| ticks.checked_add(UNIX_EPOCH_TICKS))
        .filter(|ticks| *ticks >= 0)
        .ok_or_else(|| {
            format_error(
                NativeType::Timestamp,
                timestamp.to_rfc3339(),
                "outside the representable tick range",
            )
        })
}

pub fn from_ticks(ticks: i64) -> Result<DateTime<Utc>> {
    //! Convert a tick count back to a timestamp.

    if ticks < 0 {
        return Err(format_error(
            NativeType::Timestamp,
            ticks,
            "tick counts start at zero",
        ));
    }

    let since_unix = ticks - UNIX_EPOCH_TICKS;
    let seconds = since_unix.div_euclid(TICKS_PER_SECOND);
    let nanos = since_unix.rem_euclid(TICKS_PER_SECOND) as u32 * NANOS_PER_TICK;

    DateTime::from_timestamp(seconds, nanos).ok_or_else(|| {
        format_error(
            NativeType::Timestamp,
            ticks,
            "outside the representable date range",
        )
    })
}

pub(crate) fn decimal_from_text(text: &str) -> std::result::Result<Decimal, String> {
    //! Parse plain or scientific decimal text. Digit separators (`1_000`)
    //! are not decimal text and are refused.

    if text.contains('_') {
        return Err("digit separators are not allowed".to_string());
    }

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| e.to_string())
}

fn expect_kind(native: NativeType, wire: &WireValue) -> Result<&str> {
    let expected = native.wire_kind()?;

    match (expected, wire) {
        (WireKind::String, WireValue::String(text)) => Ok(text),
        (WireKind::Number, WireValue::Number(text)) => Ok(text),
        _ => Err(Error::WireTypeMismatch {
            field: None,
            expected,
            found: wire.variant_name(),
        }),
    }
}

fn parse_number<N>(native: NativeType, payload: &str) -> Result<N>
where
    N: FromStr,
    N::Err: Display,
{
    payload
        .parse::<N>()
        .map_err(|e| format_error(native, payload, e))
}

fn format_error(native: NativeType, payload: impl Display, reason: impl Display) -> Error {
    Error::WireFormat {
        field: None,
        native: native.to_string(),
        payload: payload.to_string(),
        reason: reason.to_string(),
    }
}
