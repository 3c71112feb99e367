use std::fmt::Display;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::mapping::{EntityMapper, WireKind};

/// A key attribute: a name plus the wire kind the store indexes it as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyAttribute {
    pub name: String,
    pub kind: WireKind,
}

/// Throughput hints, attached to the base table and separately to each index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Capacity {
    pub read_units: u64,
    pub write_units: u64,
}

/// Which attributes an index carries. Only whole-item projection exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Projection {
    #[default]
    All,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SecondaryIndex {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub projection: Projection,
    pub capacity: Capacity,
}

/// The declared shape of a table. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableSchema {
    name: String,
    partition_key: KeyAttribute,
    sort_key: Option<KeyAttribute>,
    indexes: Vec<SecondaryIndex>,
    capacity: Capacity,
}

pub struct TableSchemaBuilder {
    schema: TableSchema,
}

impl KeyAttribute {
    pub fn new(name: &str, kind: WireKind) -> KeyAttribute {
        KeyAttribute {
            name: name.to_string(),
            kind,
        }
    }

    pub fn string(name: &str) -> KeyAttribute {
        KeyAttribute::new(name, WireKind::String)
    }

    pub fn number(name: &str) -> KeyAttribute {
        KeyAttribute::new(name, WireKind::Number)
    }

    pub fn parse(name: &str, kind: &str) -> Result<KeyAttribute> {
        //! Build a key attribute from a textual kind (`S` or `N`).
        //!
        //! Every other store kind, binary included, is refused with
        //! [`Error::UnsupportedType`].

        let kind = kind.parse::<WireKind>().map_err(|e| e.on_field(name))?;
        Ok(KeyAttribute::new(name, kind))
    }
}

impl Display for KeyAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.code())
    }
}

impl Capacity {
    pub fn new(read_units: u64, write_units: u64) -> Capacity {
        Capacity {
            read_units,
            write_units,
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::new(5, 5)
    }
}

impl SecondaryIndex {
    pub fn new(name: &str, partition_key: KeyAttribute) -> SecondaryIndex {
        SecondaryIndex {
            name: name.to_string(),
            partition_key,
            sort_key: None,
            projection: Projection::All,
            capacity: Capacity::default(),
        }
    }

    pub fn sort_key(mut self, sort_key: KeyAttribute) -> SecondaryIndex {
        self.sort_key = Some(sort_key);
        self
    }

    pub fn capacity(mut self, read_units: u64, write_units: u64) -> SecondaryIndex {
        self.capacity = Capacity::new(read_units, write_units);
        self
    }

    pub fn key_attributes(&self) -> impl Iterator<Item = &KeyAttribute> {
        std::iter::once(&self.partition_key).chain(self.sort_key.iter())
    }
}

impl TableSchema {
    pub fn builder(name: &str, partition_key: KeyAttribute) -> TableSchemaBuilder {
        TableSchemaBuilder {
            schema: TableSchema {
                name: name.to_string(),
                partition_key,
                sort_key: None,
                indexes: Vec::new(),
                capacity: Capacity::default(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partition_key(&self) -> &KeyAttribute {
        &self.partition_key
    }

    pub fn sort_key(&self) -> Option<&KeyAttribute> {
        self.sort_key.as_ref()
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn indexes(&self) -> &[SecondaryIndex] {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&SecondaryIndex> {
        self.indexes.iter().find(|index| index.name == name)
    }

    pub fn key_attributes(&self) -> impl Iterator<Item = &KeyAttribute> {
        //! The base table's own key attributes, partition key first.

        std::iter::once(&self.partition_key).chain(self.sort_key.iter())
    }

    pub fn attribute_definitions(&self) -> Result<Vec<KeyAttribute>> {
        //! Every attribute named by the base key or by any index key, once
        //! each, in first-seen order.
        //!
        //! The same attribute declared with two different kinds fails with
        //! [`Error::SchemaConflict`].

        let mut definitions: IndexMap<&str, &KeyAttribute> = IndexMap::new();
        let all = self
            .key_attributes()
            .chain(self.indexes.iter().flat_map(SecondaryIndex::key_attributes));

        for attribute in all {
            match definitions.get(attribute.name.as_str()) {
                Some(existing) if existing.kind != attribute.kind => {
                    return Err(Error::SchemaConflict {
                        table: self.name.clone(),
                        reason: format!(
                            "attribute '{}' is declared as both {} and {}",
                            attribute.name, existing.kind, attribute.kind
                        ),
                    });
                }
                Some(_) => {}
                None => {
                    definitions.insert(attribute.name.as_str(), attribute);
                }
            }
        }

        Ok(definitions.into_values().cloned().collect())
    }

    pub fn validate_against<R: Default + 'static>(&self, mapper: &EntityMapper<R>) -> Result<()> {
        //! Check that every declared key attribute is a mapped field of the
        //! record type and that its wire kind agrees with the declaration.
        //!
        //! - an attribute with no field fails with [`Error::FieldNotFound`]
        //! - a field mapping to the other wire kind fails with
        //!   [`Error::WireTypeMismatch`]

        for attribute in self.attribute_definitions()? {
            let field = mapper.field(&attribute.name)?;

            if field.wire_kind() != attribute.kind {
                return Err(Error::WireTypeMismatch {
                    field: Some(attribute.name.clone()),
                    expected: attribute.kind,
                    found: field.wire_kind().code(),
                });
            }
        }

        Ok(())
    }
}

impl Display for TableSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}", self.name, self.partition_key)?;
        if let Some(sort_key) = &self.sort_key {
            write!(f, " | {}", sort_key)?;
        }
        write!(
            f,
            "] r{}/w{}",
            self.capacity.read_units, self.capacity.write_units
        )?;

        for index in self.indexes.iter() {
            let keys: Vec<String> = index.key_attributes().map(|key| key.to_string()).collect();
            write!(f, "; {} [{}]", index.name, keys.join(" | "))?;
        }

        Ok(())
    }
}

impl TableSchemaBuilder {
    pub fn sort_key(mut self, sort_key: KeyAttribute) -> TableSchemaBuilder {
        self.schema.sort_key = Some(sort_key);
        self
    }

    pub fn capacity(mut self, read_units: u64, write_units: u64) -> TableSchemaBuilder {
        self.schema.capacity = Capacity::new(read_units, write_units);
        self
    }

    pub fn index(mut self, index: SecondaryIndex) -> TableSchemaBuilder {
        self.schema.indexes.push(index);
        self
    }

    pub fn build(self) -> Result<TableSchema> {
        //! Finish the declaration.
        //!
        //! Fails with [`Error::SchemaConflict`] if two indexes share a name or
        //! an attribute is declared with two kinds.

        let schema = self.schema;

        for (position, index) in schema.indexes.iter().enumerate() {
            if schema.indexes[..position].iter().any(|other| other.name == index.name) {
                return Err(Error::SchemaConflict {
                    table: schema.name.clone(),
                    reason: format!("index '{}' is declared more than once", index.name),
                });
            }
        }

        schema.attribute_definitions()?;

        Ok(schema)
    }
}
