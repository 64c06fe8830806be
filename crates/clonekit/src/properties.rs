//! Property metadata and the property cloner
//!
//! A property is a named accessor pair on a type. The cloner copies every
//! readable source property into the writable destination property of the
//! same name, provided the destination type accepts the source type.
//! Anything that does not match is skipped, never reported as an error.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::assign::Assign;
use crate::error::{CloneError, CloneResult};
use crate::types::{TypeDescriptor, Value};

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), Value> + Send + Sync>;

struct WriteAccess<T> {
    accepts: fn(&TypeDescriptor) -> bool,
    assign: Setter<T>,
}

// ============================================================================
// PropertyInfo
// ============================================================================

/// Metadata and accessors for one property of `T`
pub struct PropertyInfo<T> {
    name: &'static str,
    ty: TypeDescriptor,
    getter: Option<Getter<T>>,
    setter: Option<WriteAccess<T>>,
}

impl<T: 'static> PropertyInfo<T> {
    /// A property with a public getter and setter
    pub fn read_write<P, G, S>(name: &'static str, get: G, set: S) -> Self
    where
        P: Assign + Send + Sync,
        G: Fn(&T) -> P + Send + Sync + 'static,
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        PropertyInfo {
            name,
            ty: TypeDescriptor::of::<P>(),
            getter: Some(Self::wrap_getter(get)),
            setter: Some(Self::wrap_setter(set)),
        }
    }

    /// A property with only a public getter
    pub fn read_only<P, G>(name: &'static str, get: G) -> Self
    where
        P: Any + Send + Sync,
        G: Fn(&T) -> P + Send + Sync + 'static,
    {
        PropertyInfo {
            name,
            ty: TypeDescriptor::of::<P>(),
            getter: Some(Self::wrap_getter(get)),
            setter: None,
        }
    }

    /// A property with only a public setter
    pub fn write_only<P, S>(name: &'static str, set: S) -> Self
    where
        P: Assign,
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        PropertyInfo {
            name,
            ty: TypeDescriptor::of::<P>(),
            getter: None,
            setter: Some(Self::wrap_setter(set)),
        }
    }

    /// A read-write property declared as `Option<U>`.
    ///
    /// Behaves like [`PropertyInfo::read_write`] with `P = Option<U>`, but the
    /// values it reads remember their optionality, so a `None` stays `None`
    /// even when the destination wraps an untyped slot.
    pub fn read_write_optional<U, G, S>(name: &'static str, get: G, set: S) -> Self
    where
        U: Any + Send + Sync,
        Option<U>: Assign,
        G: Fn(&T) -> Option<U> + Send + Sync + 'static,
        S: Fn(&mut T, Option<U>) + Send + Sync + 'static,
    {
        PropertyInfo {
            name,
            ty: TypeDescriptor::of::<Option<U>>(),
            getter: Some(Self::wrap_optional_getter(get)),
            setter: Some(Self::wrap_setter(set)),
        }
    }

    /// A read-only property declared as `Option<U>`
    pub fn read_only_optional<U, G>(name: &'static str, get: G) -> Self
    where
        U: Any + Send + Sync,
        G: Fn(&T) -> Option<U> + Send + Sync + 'static,
    {
        PropertyInfo {
            name,
            ty: TypeDescriptor::of::<Option<U>>(),
            getter: Some(Self::wrap_optional_getter(get)),
            setter: None,
        }
    }

    fn wrap_getter<P, G>(get: G) -> Getter<T>
    where
        P: Any + Send + Sync,
        G: Fn(&T) -> P + Send + Sync + 'static,
    {
        Box::new(move |owner: &T| Value::new(get(owner)))
    }

    fn wrap_optional_getter<U, G>(get: G) -> Getter<T>
    where
        U: Any + Send + Sync,
        G: Fn(&T) -> Option<U> + Send + Sync + 'static,
    {
        Box::new(move |owner: &T| Value::from_option(get(owner)))
    }

    fn wrap_setter<P, S>(set: S) -> WriteAccess<T>
    where
        P: Assign,
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        WriteAccess {
            accepts: P::is_assignable_from,
            assign: Box::new(move |owner: &mut T, value: Value| {
                let value = P::assign_from(value)?;
                set(owner, value);
                Ok(())
            }),
        }
    }
}

impl<T> PropertyInfo<T> {
    /// Property name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared property type
    pub fn type_descriptor(&self) -> TypeDescriptor {
        self.ty
    }

    /// Check if the property has a public getter
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// Check if the property has a public setter
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Check if the setter accepts values declared as `source`
    pub fn accepts(&self, source: &TypeDescriptor) -> bool {
        self.setter
            .as_ref()
            .is_some_and(|setter| (setter.accepts)(source))
    }

    /// Read the property, if it is readable
    pub fn get(&self, owner: &T) -> Option<Value> {
        self.getter.as_ref().map(|get| get(owner))
    }

    /// Write the property, handing the value back if it was not stored
    pub fn set(&self, owner: &mut T, value: Value) -> Result<(), Value> {
        match &self.setter {
            Some(setter) => (setter.assign)(owner, value),
            None => Err(value),
        }
    }
}

impl<T> fmt::Debug for PropertyInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("type", &self.ty)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Types that expose named properties.
///
/// Usually derived with `#[derive(Properties)]`; implement by hand to
/// expose computed properties.
pub trait Properties: Sized + 'static {
    /// All properties of the type in declaration order
    fn properties() -> Vec<PropertyInfo<Self>>;
}

/// Properties of `T` with a public getter
pub fn readable_properties<T: Properties>() -> Vec<PropertyInfo<T>> {
    T::properties()
        .into_iter()
        .filter(PropertyInfo::is_readable)
        .collect()
}

/// Properties of `T` with a public setter
pub fn writable_properties<T: Properties>() -> Vec<PropertyInfo<T>> {
    T::properties()
        .into_iter()
        .filter(PropertyInfo::is_writable)
        .collect()
}

// ============================================================================
// PropertyPlan
// ============================================================================

/// Why a readable source property was not copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination has no writable property with this name
    NoCounterpart,
    /// The destination property type does not accept the source type
    NotAssignable {
        /// Declared source property type
        source: TypeDescriptor,
        /// Declared destination property type
        destination: TypeDescriptor,
    },
}

/// A source property left out of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProperty {
    /// Property name
    pub name: &'static str,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Matched property pairs between a source type and a destination type.
///
/// Building a plan does the name and type matching; applying it only moves
/// values. The free cloning functions build a fresh plan per call.
pub struct PropertyPlan<S, D> {
    sources: Vec<PropertyInfo<S>>,
    destinations: Vec<PropertyInfo<D>>,
    pairs: Vec<(usize, usize)>,
    skipped: Vec<SkippedProperty>,
    _types: PhantomData<fn(&S, &mut D)>,
}

impl<S: Properties, D: Properties> PropertyPlan<S, D> {
    /// Match readable properties of `S` against writable properties of `D`
    pub fn build() -> Self {
        let sources = readable_properties::<S>();
        let destinations = writable_properties::<D>();

        // Duplicate names keep the first declaration
        let mut by_name: FxHashMap<&'static str, usize> = FxHashMap::default();
        for (index, property) in destinations.iter().enumerate() {
            by_name.entry(property.name()).or_insert(index);
        }

        let mut pairs = Vec::new();
        let mut skipped = Vec::new();

        for (source_index, source) in sources.iter().enumerate() {
            let Some(&destination_index) = by_name.get(source.name()) else {
                skipped.push(SkippedProperty {
                    name: source.name(),
                    reason: SkipReason::NoCounterpart,
                });
                continue;
            };

            let destination = &destinations[destination_index];
            if !destination.accepts(&source.type_descriptor()) {
                skipped.push(SkippedProperty {
                    name: source.name(),
                    reason: SkipReason::NotAssignable {
                        source: source.type_descriptor(),
                        destination: destination.type_descriptor(),
                    },
                });
                continue;
            }

            pairs.push((source_index, destination_index));
        }

        for skip in &skipped {
            trace!(property = skip.name, reason = ?skip.reason, "property skipped");
        }

        PropertyPlan {
            sources,
            destinations,
            pairs,
            skipped,
            _types: PhantomData,
        }
    }

    /// Copy every matched property from `source` into `destination`
    pub fn apply<'d>(&self, source: &S, destination: &'d mut D) -> &'d mut D {
        for &(source_index, destination_index) in &self.pairs {
            let property = &self.sources[source_index];
            let Some(value) = property.get(source) else {
                continue;
            };
            if let Err(value) = self.destinations[destination_index].set(destination, value) {
                trace!(
                    property = property.name(),
                    value = ?value,
                    "destination rejected value"
                );
            }
        }
        destination
    }

    /// Names of the properties this plan copies, in source order
    pub fn copied(&self) -> Vec<&'static str> {
        self.pairs
            .iter()
            .map(|&(source_index, _)| self.sources[source_index].name())
            .collect()
    }

    /// Readable source properties this plan does not copy
    pub fn skipped(&self) -> &[SkippedProperty] {
        &self.skipped
    }
}

impl<S, D> fmt::Debug for PropertyPlan<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let copied: Vec<_> = self
            .pairs
            .iter()
            .map(|&(source_index, _)| self.sources[source_index].name())
            .collect();
        f.debug_struct("PropertyPlan")
            .field("copied", &copied)
            .field("skipped", &self.skipped)
            .finish()
    }
}

// ============================================================================
// Property Cloner
// ============================================================================

/// Copy matching properties of `source` into `destination`.
///
/// Properties without a same-named writable counterpart, or whose types are
/// not assignable, are left untouched.
pub fn clone_properties_into<'d, S: Properties, D: Properties>(
    source: &S,
    destination: &'d mut D,
) -> &'d mut D {
    PropertyPlan::<S, D>::build().apply(source, destination)
}

/// Copy matching properties of `source` into a fresh `D::default()`
pub fn clone_properties<S: Properties, D: Properties + Default>(source: &S) -> D {
    let mut destination = D::default();
    clone_properties_into(source, &mut destination);
    destination
}

/// [`clone_properties_into`] for callers holding optional handles.
///
/// A missing source or destination fails with
/// [`CloneError::InvalidArgument`] before anything is copied.
pub fn try_clone_properties_into<'d, S: Properties, D: Properties>(
    source: Option<&S>,
    destination: Option<&'d mut D>,
) -> CloneResult<&'d mut D> {
    let source = source.ok_or_else(CloneError::null_source)?;
    let destination = destination.ok_or_else(CloneError::null_destination)?;
    Ok(clone_properties_into(source, destination))
}

/// Method-call form of the property cloner
pub trait CloneProperties: Properties {
    /// See [`clone_properties`]
    fn clone_properties<D: Properties + Default>(&self) -> D {
        clone_properties(self)
    }

    /// See [`clone_properties_into`]
    fn clone_properties_into<'d, D: Properties>(&self, destination: &'d mut D) -> &'d mut D {
        clone_properties_into(self, destination)
    }
}

impl<T: Properties> CloneProperties for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Celsius {
        degrees: f64,
        label: String,
    }

    impl Properties for Celsius {
        fn properties() -> Vec<PropertyInfo<Self>> {
            vec![
                PropertyInfo::read_write(
                    "degrees",
                    |c: &Self| c.degrees,
                    |c: &mut Self, v: f64| c.degrees = v,
                ),
                PropertyInfo::read_only("label", |c: &Self| c.label.clone()),
                PropertyInfo::read_only("kelvin", |c: &Self| c.degrees + 273.15),
            ]
        }
    }

    #[derive(Debug, Default)]
    struct Reading {
        degrees: f64,
        kelvin: Option<f64>,
        label: u32,
        written: Vec<f64>,
    }

    impl Properties for Reading {
        fn properties() -> Vec<PropertyInfo<Self>> {
            vec![
                PropertyInfo::read_write(
                    "degrees",
                    |r: &Self| r.degrees,
                    |r: &mut Self, v: f64| r.degrees = v,
                ),
                PropertyInfo::write_only("kelvin", |r: &mut Self, v: Option<f64>| r.kelvin = v),
                PropertyInfo::read_write(
                    "label",
                    |r: &Self| r.label,
                    |r: &mut Self, v: u32| r.label = v,
                ),
                PropertyInfo::write_only("degrees", |r: &mut Self, v: f64| r.written.push(v)),
            ]
        }
    }

    #[test]
    fn test_property_access_flags() {
        let props = Celsius::properties();
        assert!(props[0].is_readable() && props[0].is_writable());
        assert!(props[1].is_readable() && !props[1].is_writable());
        assert_eq!(readable_properties::<Celsius>().len(), 3);
        assert_eq!(writable_properties::<Celsius>().len(), 1);
        assert_eq!(readable_properties::<Reading>().len(), 2);
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let props = Reading::properties();
        let mut reading = Reading::default();

        let value = props[0].set(&mut reading, Value::new(String::from("hot"))).unwrap_err();
        assert!(value.is::<String>());
        assert_eq!(reading.degrees, 0.0);

        assert!(!props[0].accepts(&TypeDescriptor::of::<String>()));
        assert!(props[0].accepts(&TypeDescriptor::of::<f64>()));
    }

    #[test]
    fn test_read_only_rejects_set() {
        let props = Celsius::properties();
        let mut celsius = Celsius::default();
        assert!(props[1].set(&mut celsius, Value::new(String::from("x"))).is_err());
        assert!(!props[1].accepts(&TypeDescriptor::of::<String>()));
    }

    #[test]
    fn test_plan_matches_and_skips() {
        let plan = PropertyPlan::<Celsius, Reading>::build();

        assert_eq!(plan.copied(), vec!["degrees", "kelvin"]);
        assert_eq!(
            plan.skipped(),
            &[SkippedProperty {
                name: "label",
                reason: SkipReason::NotAssignable {
                    source: TypeDescriptor::of::<String>(),
                    destination: TypeDescriptor::of::<u32>(),
                },
            }]
        );
    }

    #[test]
    fn test_plan_apply_copies_computed_getter() {
        let source = Celsius {
            degrees: 20.0,
            label: "room".into(),
        };
        let mut destination = Reading {
            label: 7,
            ..Reading::default()
        };

        PropertyPlan::<Celsius, Reading>::build().apply(&source, &mut destination);

        assert_eq!(destination.degrees, 20.0);
        assert_eq!(destination.kelvin, Some(293.15));
        assert_eq!(destination.label, 7);
        assert!(destination.written.is_empty());
    }

    #[test]
    fn test_clone_properties_default_destination() {
        let source = Celsius {
            degrees: -5.0,
            label: "ice".into(),
        };
        let reading: Reading = source.clone_properties();
        assert_eq!(reading.degrees, -5.0);
        assert_eq!(reading.label, 0);
    }

    #[test]
    fn test_try_clone_properties_rejects_missing() {
        let source = Celsius::default();
        let mut destination = Reading::default();

        let err = try_clone_properties_into::<Celsius, Reading>(None, Some(&mut destination))
            .unwrap_err();
        assert_eq!(err, CloneError::InvalidArgument { parameter: "source" });

        let err = try_clone_properties_into::<Celsius, Reading>(Some(&source), None).unwrap_err();
        assert_eq!(err, CloneError::InvalidArgument { parameter: "destination" });
    }

    struct Forecast {
        high: Option<f64>,
    }

    struct Slot {
        high: Option<Box<dyn Any + Send + Sync>>,
    }

    impl Properties for Forecast {
        fn properties() -> Vec<PropertyInfo<Self>> {
            vec![PropertyInfo::read_only_optional("high", |f: &Self| f.high)]
        }
    }

    impl Properties for Slot {
        fn properties() -> Vec<PropertyInfo<Self>> {
            vec![PropertyInfo::read_write_optional(
                "high",
                |_: &Self| None::<Box<dyn Any + Send + Sync>>,
                |s: &mut Self, v: Option<Box<dyn Any + Send + Sync>>| s.high = v,
            )]
        }
    }

    #[test]
    fn test_optional_getter_keeps_none() {
        let props = Forecast::properties();
        let value = props[0].get(&Forecast { high: None }).unwrap();
        assert!(value.is_none());
        assert!(value.type_descriptor().is::<Option<f64>>());

        let mut slot = Slot {
            high: Some(Box::new(1.0f64)),
        };
        clone_properties_into(&Forecast { high: None }, &mut slot);
        assert!(slot.high.is_none());

        clone_properties_into(&Forecast { high: Some(30.5) }, &mut slot);
        let high = slot.high.as_ref().and_then(|h| h.downcast_ref::<f64>());
        assert_eq!(high, Some(&30.5));
    }
}
