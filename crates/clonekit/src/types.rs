//! Type descriptors and type-erased values
//!
//! `TypeDescriptor` is the runtime identity used for cache keys and
//! assignability checks. `Value` carries a property value between a getter
//! on one type and a setter on another without either side knowing the
//! other's concrete type.
//!
//! A value read from an `Option`-typed property remembers that it is
//! optional. Destinations use that to map `None` to `None` and to unwrap a
//! `Some` before erasing it into an untyped slot.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// TypeDescriptor
// ============================================================================

/// Runtime type information for a declared field or property type
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Descriptor for `T`
    pub fn of<T: ?Sized + Any>() -> Self {
        TypeDescriptor {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the described type
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name as reported by `std::any::type_name`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this describes `T`
    pub fn is<T: ?Sized + Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Value
// ============================================================================

type UnwrapSome = fn(Box<dyn Any + Send + Sync>) -> Result<Value, Box<dyn Any + Send + Sync>>;

#[derive(Clone, Copy)]
struct Optional {
    is_none: bool,
    unwrap_some: UnwrapSome,
}

fn unwrap_some<U: Any + Send + Sync>(
    inner: Box<dyn Any + Send + Sync>,
) -> Result<Value, Box<dyn Any + Send + Sync>> {
    match inner.downcast::<Option<U>>() {
        Ok(option) => match *option {
            Some(payload) => Ok(Value::new(payload)),
            None => Err(Box::new(None::<U>)),
        },
        Err(inner) => Err(inner),
    }
}

/// An owned, type-erased property value.
///
/// The descriptor records the *declared* type of the property the value was
/// read from, which is what assignability is checked against.
pub struct Value {
    inner: Box<dyn Any + Send + Sync>,
    ty: TypeDescriptor,
    optional: Option<Optional>,
}

impl Value {
    /// Wrap a value of a known type
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Value {
            inner: Box::new(value),
            ty: TypeDescriptor::of::<T>(),
            optional: None,
        }
    }

    /// Wrap a value read from an `Option<U>` property.
    ///
    /// The declared type is `Option<U>`, same as [`Value::new`], but the
    /// value also records whether it is `None` and how to reach the payload.
    pub fn from_option<U: Any + Send + Sync>(value: Option<U>) -> Self {
        let optional = Optional {
            is_none: value.is_none(),
            unwrap_some: unwrap_some::<U>,
        };
        Value {
            optional: Some(optional),
            ..Value::new(value)
        }
    }

    /// Check if this is a `None` read from an optional property
    pub fn is_none(&self) -> bool {
        self.optional.is_some_and(|optional| optional.is_none)
    }

    /// Strip the `Some` from a value read from an optional property.
    ///
    /// Values that are not optional, or are `None`, come back unchanged.
    pub fn into_payload(self) -> Self {
        let Value { inner, ty, optional } = self;
        match optional {
            Some(shape) if !shape.is_none => match (shape.unwrap_some)(inner) {
                Ok(payload) => payload,
                Err(inner) => Value { inner, ty, optional },
            },
            _ => Value { inner, ty, optional },
        }
    }

    /// Declared type of the wrapped value
    pub fn type_descriptor(&self) -> TypeDescriptor {
        self.ty
    }

    /// Check if the wrapped value is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the wrapped value as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Take the wrapped value as `T`, handing the value back on mismatch
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Value { inner, ty, optional } = self;
        match inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Value { inner, ty, optional }),
        }
    }

    /// Unwrap into the underlying box
    pub fn into_any(self) -> Box<dyn Any + Send + Sync> {
        self.inner
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.ty.name)
    }
}
