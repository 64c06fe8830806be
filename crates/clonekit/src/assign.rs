//! Assignability between declared property types
//!
//! A destination property of type `D` accepts a source property of type `S`
//! when `D::is_assignable_from(S)` holds:
//!
//! - exact match: `S == D` (the default for every implementor)
//! - universal slot: `Box<dyn Any + Send + Sync>` and
//!   `Arc<dyn Any + Send + Sync>` accept any type
//! - widening: `Option<T>` accepts `Option<T>` and anything `T` accepts
//!
//! Everything else is rejected and the property is skipped.
//!
//! A `None` read from an optional source property lands as `None` in an
//! `Option` destination. Universal slots store the payload of a `Some`, not
//! the `Option` around it. An `Arc<dyn Any>` slot takes over the contents of
//! an incoming `Box<dyn Any>`; a `Box<dyn Any>` slot cannot take ownership
//! out of a shared `Arc<dyn Any>`, so it stores the `Arc` handle itself.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::types::{TypeDescriptor, Value};

/// A type that can be stored into by the property cloner.
///
/// The provided methods implement exact-type assignability, so for most
/// types an empty impl (or `#[derive(Assign)]`) is enough.
pub trait Assign: Sized + 'static {
    /// Whether a value declared as `source` can be stored in a `Self` slot
    fn is_assignable_from(source: &TypeDescriptor) -> bool {
        source.is::<Self>()
    }

    /// Convert a value into `Self`, handing it back if it is not assignable
    fn assign_from(value: Value) -> Result<Self, Value> {
        value.downcast::<Self>()
    }
}

/// Implement exact-type [`Assign`] for a list of types.
///
/// ```ignore
/// clonekit::impl_exact_assign!(Email, UserId);
/// ```
#[macro_export]
macro_rules! impl_exact_assign {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Assign for $ty {}
        )*
    };
}

impl_exact_assign!(
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64, bool, char, (),
    String, &'static str,
    std::path::PathBuf,
    std::time::Duration,
    std::time::SystemTime,
);

impl<T: 'static> Assign for Vec<T> {}
impl<T: 'static> Assign for VecDeque<T> {}
impl<T: 'static> Assign for BTreeSet<T> {}
impl<T: 'static, S: 'static> Assign for HashSet<T, S> {}
impl<K: 'static, V: 'static> Assign for BTreeMap<K, V> {}
impl<K: 'static, V: 'static, S: 'static> Assign for HashMap<K, V, S> {}
impl<T: 'static> Assign for Box<T> {}
impl<T: 'static> Assign for Arc<T> {}

impl<T: Assign> Assign for Option<T> {
    fn is_assignable_from(source: &TypeDescriptor) -> bool {
        source.is::<Self>() || T::is_assignable_from(source)
    }

    fn assign_from(value: Value) -> Result<Self, Value> {
        match value.downcast::<Self>() {
            Ok(value) => Ok(value),
            Err(value) if value.is_none() => Ok(None),
            Err(value) => T::assign_from(value).map(Some),
        }
    }
}

impl Assign for Box<dyn Any + Send + Sync> {
    fn is_assignable_from(_source: &TypeDescriptor) -> bool {
        true
    }

    fn assign_from(value: Value) -> Result<Self, Value> {
        // An already-erased box is moved, not boxed again
        match value.into_payload().downcast::<Self>() {
            Ok(boxed) => Ok(boxed),
            Err(value) => Ok(value.into_any()),
        }
    }
}

impl Assign for Arc<dyn Any + Send + Sync> {
    fn is_assignable_from(_source: &TypeDescriptor) -> bool {
        true
    }

    fn assign_from(value: Value) -> Result<Self, Value> {
        let value = match value.into_payload().downcast::<Self>() {
            Ok(shared) => return Ok(shared),
            Err(value) => value,
        };
        match value.downcast::<Box<dyn Any + Send + Sync>>() {
            Ok(boxed) => Ok(Arc::from(boxed)),
            Err(value) => Ok(Arc::from(value.into_any())),
        }
    }
}
