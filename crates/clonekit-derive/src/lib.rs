// clonekit-derive: derive macros for clonekit
//
// Generates the introspection tables clonekit works from:
// - #[derive(Fields)] - declared field list with one assignment step per field
// - #[derive(Properties)] - property accessors derived from field visibility
// - #[derive(Assign)] - exact-type assignability for use as a property type
//
// Example:
// ```
// use clonekit::{Fields, Properties};
//
// #[derive(Default, Fields, Properties)]
// struct Account {
//     pub owner: String,
//     #[clonekit(readonly)]
//     balance: i64,
//     #[clonekit(skip)]
//     session: Option<u64>,
// }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod assign;
mod attrs;
mod fields;
mod properties;

/// Derives `clonekit::DeclaredFields`.
///
/// Every field written in the struct definition is listed in declaration
/// order, except those marked `#[clonekit(skip)]`. Each field is copied with
/// `Clone::clone_from`, so field types must implement `Clone`.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Fields)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// let copy = clonekit::clone_fields(&Point { x: 1.0, y: 2.0 })?;
/// ```
#[proc_macro_derive(Fields, attributes(clonekit))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    fields::expand_fields(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `clonekit::Properties`.
///
/// `pub` fields become read-write properties; other fields are hidden.
/// Field attributes adjust this:
///
/// - `#[clonekit(readonly)]` - getter only
/// - `#[clonekit(writeonly)]` - setter only
/// - `#[clonekit(readwrite)]` - getter and setter, even for private fields
/// - `#[clonekit(skip)]` - not a property
///
/// Readable property types must be `Clone + Send + Sync`; writable ones must
/// implement `clonekit::Assign`.
#[proc_macro_derive(Properties, attributes(clonekit))]
pub fn derive_properties(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    properties::expand_properties(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `clonekit::Assign` with exact-type assignability.
///
/// Needed for a struct or enum to be the type of a writable property.
#[proc_macro_derive(Assign)]
pub fn derive_assign(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    assign::expand_assign(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
