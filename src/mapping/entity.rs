use std::fmt::{Debug, Display};

use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};
use crate::mapping::field::{FieldAccessor, FieldDecl, FieldSpec};
use crate::mapping::{FieldValue, Item};

/// A record type the mapper knows how to take apart and put back together.
///
/// There is no runtime reflection to lean on, so a record lists its fields
/// once in [`Entity::describe`]. The mapper calls it exactly once per type and
/// keeps the result, see [`super::mapper_for`].
///
/// ```ignore
/// impl Entity for Job {
///     const NAME: &'static str = "Job";
///
///     fn describe(model: &mut ModelBuilder<Self>) {
///         model
///             .field::<String>("Id")
///             .get(|job| &job.id)
///             .set(|job, id| job.id = id)
///             .required();
///     }
/// }
/// ```
pub trait Entity: Default + Send + Sync + 'static {
    const NAME: &'static str;

    fn describe(model: &mut ModelBuilder<Self>);
}

/// Collects the field declarations of one record type, in declaration order.
pub struct ModelBuilder<R> {
    entity: &'static str,
    specs: Vec<FieldSpec<R>>,
}

/// The per-record-type aggregate of [`FieldAccessor`]s.
///
/// Immutable once built. Encode and decode only ever read from it, so a
/// single mapper is shared freely across concurrent calls.
pub struct EntityMapper<R> {
    entity: &'static str,
    fields: IndexMap<String, FieldAccessor<R>>,
}

impl<R: 'static> ModelBuilder<R> {
    pub fn new(entity: &'static str) -> ModelBuilder<R> {
        ModelBuilder {
            entity,
            specs: Vec::new(),
        }
    }

    pub fn field<T: FieldValue>(&mut self, name: &str) -> FieldDecl<'_, R, T> {
        //! Declare a field of native type `T`, then attach its getter and
        //! setter on the returned handle.

        self.specs.push(FieldSpec::new(name.to_string(), T::NATIVE));
        let last = self.specs.len() - 1;
        FieldDecl::new(&mut self.specs[last])
    }

    pub fn build(self) -> Result<EntityMapper<R>> {
        //! Bind every declared field, failing on the first that cannot be
        //! mapped.

        let entity = self.entity;
        let mut fields = IndexMap::with_capacity(self.specs.len());

        for spec in self.specs {
            if fields.contains_key(&spec.name) {
                return Err(model_error(
                    entity,
                    Error::DuplicateField {
                        entity: entity.to_string(),
                        field: spec.name,
                    },
                ));
            }

            let accessor = FieldAccessor::construct(entity, spec).map_err(|e| model_error(entity, e))?;
            fields.insert(accessor.name().to_string(), accessor);
        }

        debug!("built mapper for {} with {} field(s)", entity, fields.len());

        Ok(EntityMapper { entity, fields })
    }
}

impl<R: Entity> EntityMapper<R> {
    pub fn new() -> Result<EntityMapper<R>> {
        //! Build a fresh mapper for `R`.
        //!
        //! Prefer [`super::mapper_for`], which builds once per process and
        //! hands out the shared copy.

        let mut model = ModelBuilder::new(R::NAME);
        R::describe(&mut model);
        model.build()
    }
}

impl<R: Default + 'static> EntityMapper<R> {
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldAccessor<R>> {
        self.fields.values()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn field(&self, name: &str) -> Result<&FieldAccessor<R>> {
        self.fields.get(name).ok_or_else(|| Error::FieldNotFound {
            entity: self.entity.to_string(),
            field: name.to_string(),
        })
    }

    pub fn encode_record(&self, record: &R) -> Result<Item> {
        //! Encode every field of `record`.
        //!
        //! The result always holds every declared field name; fields without
        //! a value come out as [`crate::mapping::WireValue::Absent`].

        let mut item = Item::with_capacity(self.fields.len());

        for (name, field) in self.fields.iter() {
            item.insert(name.clone(), field.read(record)?);
        }

        Ok(item)
    }

    pub fn to_store_item(&self, record: &R) -> Result<Item> {
        //! Encode `record` for sending to the store: as
        //! [`EntityMapper::encode_record`] with absent attributes left out.

        let mut item = self.encode_record(record)?;
        item.retain(|_, value| !value.is_absent());
        Ok(item)
    }

    pub fn decode_record(&self, item: &Item) -> Result<R> {
        //! Build a record from its wire attributes.
        //!
        //! Starts from `R::default()` and writes every known attribute.
        //! Unknown attributes are skipped. An absent attribute leaves the
        //! field at its default, unless the field is required, which fails
        //! with [`Error::RequiredFieldMissing`].

        let mut record = R::default();

        for (name, field) in self.fields.iter() {
            match item.get(name) {
                Some(value) if !value.is_absent() => field.write(&mut record, value)?,
                _ if field.is_required() => {
                    return Err(Error::RequiredFieldMissing {
                        entity: self.entity.to_string(),
                        field: name.clone(),
                    });
                }
                _ => {}
            }
        }

        let unknown = item.keys().filter(|key| !self.fields.contains_key(*key)).count();
        if unknown > 0 {
            debug!("{}: ignored {} unknown attribute(s)", self.entity, unknown);
        }

        Ok(record)
    }
}

impl<R> Display for EntityMapper<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<String> = self
            .fields
            .values()
            .map(|field| {
                let marker = if field.is_required() { " required" } else { "" };
                format!(
                    "{} ({} -> {}{})",
                    field.name(),
                    field.native_type(),
                    field.wire_kind().code(),
                    marker
                )
            })
            .collect();
        write!(f, "{}: {}", self.entity, fields.join(" | "))
    }
}

impl<R> Debug for EntityMapper<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMapper")
            .field("entity", &self.entity)
            .field("fields", &self.fields.values().collect::<Vec<_>>())
            .finish()
    }
}

fn model_error(entity: &str, source: Error) -> Error {
    Error::ModelConstruction {
        entity: entity.to_string(),
        source: Box::new(source),
    }
}
