//! Entity mapping turns a record into the attributes a key-value store keeps,
//! and back again, using
//! - Wire values (the two populated kinds, string and number, plus absence)
//! - Scalar codec (one native value to one wire value, and back)
//! - Field accessors (one record field bound to its kind and get/set pair)
//! - Entity mappers (every field of a record type, built once per type)
//!

//  All modules of the mapper
mod entity;
mod field;
mod macros;
mod registry;
mod scalar;
mod wire;

pub mod codec;

//  External API
pub use entity::{Entity, EntityMapper, ModelBuilder};
pub use field::{FieldAccessor, FieldDecl, FieldSpec};
pub use registry::{MapperRegistry, mapper_for};
pub use scalar::{FieldValue, NativeType, ScalarValue};
pub use wire::{Item, WireKind, WireValue};
