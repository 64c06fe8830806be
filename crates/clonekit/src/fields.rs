//! Declared-field metadata and the field cloner
//!
//! `DeclaredFields` is the introspection side: it lists the fields declared
//! directly on a struct, each with a monomorphic assignment step. The free
//! functions here are the cloning side; they go through the process-wide
//! [`CopierCache`] so each type's copier is compiled once.

use std::any::Any;
use std::fmt;

use crate::copier::CopierCache;
use crate::error::{CloneError, CloneResult};
use crate::types::TypeDescriptor;

/// Copies one field from a source instance to a destination instance
pub type FieldStep<T> = fn(&T, &mut T);

/// Metadata for one declared instance field
pub struct FieldInfo<T> {
    name: &'static str,
    ty: TypeDescriptor,
    step: FieldStep<T>,
}

impl<T> FieldInfo<T> {
    /// Describe a field of type `F` named `name`
    pub fn new<F: ?Sized + Any>(name: &'static str, step: FieldStep<T>) -> Self {
        FieldInfo {
            name,
            ty: TypeDescriptor::of::<F>(),
            step,
        }
    }

    /// Field name (tuple fields are named by index)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the field
    pub fn type_descriptor(&self) -> TypeDescriptor {
        self.ty
    }

    /// Assignment step for this field
    pub fn step(&self) -> FieldStep<T> {
        self.step
    }

    /// Assign this field of `destination` from `source`
    pub fn copy(&self, source: &T, destination: &mut T) {
        (self.step)(source, destination)
    }
}

impl<T> Clone for FieldInfo<T> {
    fn clone(&self) -> Self {
        FieldInfo {
            name: self.name,
            ty: self.ty,
            step: self.step,
        }
    }
}

impl<T> fmt::Debug for FieldInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("type", &self.ty)
            .finish()
    }
}

/// Types that can enumerate their declared instance fields.
///
/// Usually derived with `#[derive(Fields)]`. Only fields written in the
/// type's own definition are listed; fields marked `#[clonekit(skip)]` are
/// left out.
pub trait DeclaredFields: Sized + 'static {
    /// Declared fields in declaration order
    fn declared_fields() -> Vec<FieldInfo<Self>>;
}

// ============================================================================
// Field Cloner
// ============================================================================

/// Copy every declared field of `source` into `destination`.
///
/// Returns the destination for chaining.
pub fn clone_fields_into<'d, T: DeclaredFields>(
    source: &T,
    destination: &'d mut T,
) -> CloneResult<&'d mut T> {
    CopierCache::global().clone_fields_into(source, destination)
}

/// Copy every declared field of `source` into a fresh `T::default()`
pub fn clone_fields<T: DeclaredFields + Default>(source: &T) -> CloneResult<T> {
    CopierCache::global().clone_fields(source)
}

/// [`clone_fields_into`] for callers holding optional handles.
///
/// A missing source or destination fails with
/// [`CloneError::InvalidArgument`] before anything is copied.
pub fn try_clone_fields_into<'d, T: DeclaredFields>(
    source: Option<&T>,
    destination: Option<&'d mut T>,
) -> CloneResult<&'d mut T> {
    let source = source.ok_or_else(CloneError::null_source)?;
    let destination = destination.ok_or_else(CloneError::null_destination)?;
    clone_fields_into(source, destination)
}

/// Method-call form of the field cloner
pub trait CloneFields: DeclaredFields {
    /// See [`clone_fields`]
    fn clone_fields(&self) -> CloneResult<Self>
    where
        Self: Default,
    {
        clone_fields(self)
    }

    /// See [`clone_fields_into`]
    fn clone_fields_into<'d>(&self, destination: &'d mut Self) -> CloneResult<&'d mut Self> {
        clone_fields_into(self, destination)
    }
}

impl<T: DeclaredFields> CloneFields for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        left: i32,
        right: String,
    }

    impl DeclaredFields for Pair {
        fn declared_fields() -> Vec<FieldInfo<Self>> {
            vec![
                FieldInfo::new::<i32>("left", |from: &Self, to: &mut Self| to.left = from.left),
                FieldInfo::new::<String>("right", |from: &Self, to: &mut Self| {
                    to.right = from.right.clone()
                }),
            ]
        }
    }

    #[test]
    fn test_field_info_metadata() {
        let fields = Pair::declared_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name(), "left");
        assert!(fields[0].type_descriptor().is::<i32>());
        assert_eq!(fields[1].name(), "right");
        assert!(fields[1].type_descriptor().is::<String>());
    }

    #[test]
    fn test_field_copy_single() {
        let source = Pair { left: 3, right: "r".into() };
        let mut destination = Pair::default();

        Pair::declared_fields()[1].copy(&source, &mut destination);

        assert_eq!(destination.left, 0);
        assert_eq!(destination.right, "r");
    }

    #[test]
    fn test_clone_fields_manual_impl() {
        let source = Pair { left: 9, right: "nine".into() };
        let copy = source.clone_fields().unwrap();
        assert_eq!(copy, source);
    }

    #[test]
    fn test_try_clone_fields_rejects_missing() {
        let source = Pair { left: 1, right: "one".into() };
        let mut destination = Pair::default();

        let err = try_clone_fields_into(None, Some(&mut destination)).unwrap_err();
        assert_eq!(err, CloneError::InvalidArgument { parameter: "source" });

        let err = try_clone_fields_into::<Pair>(Some(&source), None).unwrap_err();
        assert_eq!(err, CloneError::InvalidArgument { parameter: "destination" });

        assert_eq!(destination, Pair::default());
    }
}
