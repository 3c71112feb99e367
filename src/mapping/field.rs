use std::fmt::Debug;
use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::mapping::{FieldValue, NativeType, ScalarValue, WireKind, WireValue, codec};

type Getter<R> = Box<dyn Fn(&R) -> Option<ScalarValue> + Send + Sync>;
type Setter<R> = Box<dyn Fn(&mut R, ScalarValue) -> bool + Send + Sync>;

/// A field declaration as registered, before it is checked.
///
/// Either half of the accessor pair may still be missing here; the check
/// happens in [`FieldAccessor::construct`].
pub struct FieldSpec<R> {
    pub(super) name: String,
    native: NativeType,
    required: bool,
    getter: Option<Getter<R>>,
    setter: Option<Setter<R>>,
}

/// Typed handle returned while registering a field of native type `T`.
pub struct FieldDecl<'a, R, T> {
    spec: &'a mut FieldSpec<R>,
    _native: PhantomData<fn() -> T>,
}

/// One record field bound to its name, native type, wire kind and its
/// get/set pair.
///
/// Built once per field when the owning [`super::EntityMapper`] is built and
/// reused, read-only, for every record afterwards.
pub struct FieldAccessor<R> {
    entity: &'static str,
    name: String,
    native: NativeType,
    wire_kind: WireKind,
    required: bool,
    getter: Getter<R>,
    setter: Setter<R>,
}

impl<R> FieldSpec<R> {
    pub(super) fn new(name: String, native: NativeType) -> FieldSpec<R> {
        FieldSpec {
            name,
            native,
            required: false,
            getter: None,
            setter: None,
        }
    }
}

impl<'a, R: 'static, T: FieldValue> FieldDecl<'a, R, T> {
    pub(super) fn new(spec: &'a mut FieldSpec<R>) -> FieldDecl<'a, R, T> {
        FieldDecl {
            spec,
            _native: PhantomData,
        }
    }

    pub fn get<F>(self, getter: F) -> Self
    where
        F: Fn(&R) -> &T + Send + Sync + 'static,
    {
        self.spec.getter = Some(Box::new(move |record: &R| getter(record).to_scalar()));
        self
    }

    pub fn set<F>(self, setter: F) -> Self
    where
        F: Fn(&mut R, T) + Send + Sync + 'static,
    {
        self.spec.setter = Some(Box::new(move |record: &mut R, scalar: ScalarValue| {
            match T::from_scalar(scalar) {
                Some(value) => {
                    setter(record, value);
                    true
                }
                None => false,
            }
        }));
        self
    }

    pub fn required(self) -> Self {
        //! The field must be present when decoding, and must hold a value
        //! when encoding.

        self.spec.required = true;
        self
    }
}

impl<R> FieldAccessor<R> {
    pub fn construct(entity: &'static str, spec: FieldSpec<R>) -> Result<FieldAccessor<R>> {
        //! Check a registered field and bind it.
        //!
        //! Both halves of the accessor pair must exist: the mapper has to
        //! round-trip every field. The wire kind is resolved here so that an
        //! unsupported type surfaces now rather than on first use.

        let FieldSpec {
            name,
            native,
            required,
            getter,
            setter,
        } = spec;

        let getter = getter.ok_or_else(|| Error::FieldNotReadable {
            entity: entity.to_string(),
            field: name.clone(),
        })?;
        let setter = setter.ok_or_else(|| Error::FieldNotWritable {
            entity: entity.to_string(),
            field: name.clone(),
        })?;
        let wire_kind = native.wire_kind().map_err(|e| e.on_field(&name))?;

        Ok(FieldAccessor {
            entity,
            name,
            native,
            wire_kind,
            required,
            getter,
            setter,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native_type(&self) -> NativeType {
        self.native
    }

    pub fn wire_kind(&self) -> WireKind {
        self.wire_kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn read(&self, record: &R) -> Result<WireValue> {
        //! Read the field off `record` and encode it.
        //!
        //! A field with no value reads as [`WireValue::Absent`], unless it is
        //! required, which fails with [`Error::NullFieldValue`].

        match (self.getter)(record) {
            Some(scalar) => codec::encode(self.native, &scalar).map_err(|e| e.on_field(&self.name)),
            None if self.required => Err(Error::NullFieldValue {
                entity: self.entity.to_string(),
                field: self.name.clone(),
            }),
            None => Ok(WireValue::Absent),
        }
    }

    pub fn write(&self, record: &mut R, value: &WireValue) -> Result<()> {
        //! Decode `value` and store it into the field of `record`.

        let scalar = codec::decode(self.native, value).map_err(|e| e.on_field(&self.name))?;

        if !(self.setter)(record, scalar) {
            return Err(Error::WireFormat {
                field: Some(self.name.clone()),
                native: self.native.to_string(),
                payload: value.payload().unwrap_or_default().to_string(),
                reason: "decoded value does not fit the field".to_string(),
            });
        }

        Ok(())
    }
}

impl<R> Debug for FieldAccessor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("entity", &self.entity)
            .field("name", &self.name)
            .field("native", &self.native)
            .field("wire_kind", &self.wire_kind)
            .field("required", &self.required)
            .finish()
    }
}
