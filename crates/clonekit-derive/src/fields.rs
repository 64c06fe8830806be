// #[derive(Fields)] implementation
//
// Generates a `DeclaredFields` impl listing one `FieldInfo` per field.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, DeriveInput, Result};

use crate::attrs::{static_generics, struct_fields};

/// Expands #[derive(Fields)].
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(Fields)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// // Output:
/// impl ::clonekit::DeclaredFields for Point {
///     fn declared_fields() -> Vec<::clonekit::FieldInfo<Self>> {
///         vec![
///             ::clonekit::FieldInfo::new::<f64>("x", |from: &Self, to: &mut Self| {
///                 ::core::clone::Clone::clone_from(&mut to.x, &from.x);
///             }),
///             ::clonekit::FieldInfo::new::<f64>("y", |from: &Self, to: &mut Self| {
///                 ::core::clone::Clone::clone_from(&mut to.y, &from.y);
///             }),
///         ]
///     }
/// }
/// ```
pub fn expand_fields(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let slots = struct_fields(&input, "Fields")?;
    let mut generics = static_generics(&input)?;
    let has_type_params = generics.type_params().next().is_some();

    // Accessor attributes belong to #[derive(Properties)]; only `skip` matters here
    let mut entries = Vec::new();
    for slot in slots.iter().filter(|slot| !slot.attrs.skip) {
        let ty = &slot.field.ty;
        let member = &slot.member;
        let name = &slot.name;

        if has_type_params {
            generics
                .make_where_clause()
                .predicates
                .push(parse_quote!(#ty: ::core::clone::Clone + 'static));
        }

        entries.push(quote! {
            ::clonekit::FieldInfo::new::<#ty>(#name, |from: &Self, to: &mut Self| {
                ::core::clone::Clone::clone_from(&mut to.#member, &from.#member);
            })
        });
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::clonekit::DeclaredFields for #struct_name #ty_generics #where_clause {
            fn declared_fields() -> ::std::vec::Vec<::clonekit::FieldInfo<Self>> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}
