//! clonekit - field and property cloning without per-type copy code
//!
//! Two independent tools:
//!
//! - **Field cloning** copies every declared field of a value into another
//!   value of the same type. The copy procedure for each type is compiled on
//!   first use and cached for the life of the process.
//! - **Property cloning** copies like-named properties between two possibly
//!   different types, skipping any property whose name has no writable
//!   counterpart or whose type is not assignable.
//!
//! Both are shallow: field and property values are `Clone`d, so `Arc`
//! handles end up sharing their referent.
//!
//! # Example
//!
//! ```ignore
//! use clonekit::{CloneFields, CloneProperties, Fields, Properties};
//!
//! #[derive(Default, Fields, Properties)]
//! struct UserDto {
//!     pub name: String,
//!     pub email: String,
//! }
//!
//! #[derive(Default, Properties)]
//! struct User {
//!     pub name: String,
//!     pub email: String,
//!     pub age: u32,
//! }
//!
//! let dto = UserDto { name: "ada".into(), email: "ada@example.com".into() };
//! let copy = dto.clone_fields()?;
//! let user: User = dto.clone_properties();
//! assert_eq!(user.age, 0);
//! ```
//!
//! # Features
//!
//! - `derive` (default): re-exports `#[derive(Fields)]`,
//!   `#[derive(Properties)]` and `#[derive(Assign)]`.

#![warn(missing_docs)]

extern crate self as clonekit;

mod assign;
mod copier;
mod error;
mod fields;
mod properties;
mod types;

pub use assign::Assign;
pub use copier::{CacheStatsSnapshot, Copier, CopierCache};
pub use error::{CloneError, CloneResult};
pub use fields::{
    clone_fields, clone_fields_into, try_clone_fields_into, CloneFields, DeclaredFields,
    FieldInfo, FieldStep,
};
pub use properties::{
    clone_properties, clone_properties_into, readable_properties, try_clone_properties_into,
    writable_properties, CloneProperties, Properties, PropertyInfo, PropertyPlan, SkipReason,
    SkippedProperty,
};
pub use types::{TypeDescriptor, Value};

#[cfg(feature = "derive")]
pub use clonekit_derive::{Assign, Fields, Properties};
