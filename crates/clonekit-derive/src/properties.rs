// #[derive(Properties)] implementation
//
// Generates a `Properties` impl from field visibility and
// #[clonekit(...)] accessor attributes.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, DeriveInput, GenericArgument, PathArguments, Result, Type, Visibility};

use crate::attrs::{static_generics, struct_fields, Access};

/// Expands #[derive(Properties)].
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(Properties)]
/// struct User {
///     pub name: String,
///     #[clonekit(readonly)]
///     id: u64,
///     cache: Vec<u8>,
/// }
///
/// // Output:
/// impl ::clonekit::Properties for User {
///     fn properties() -> Vec<::clonekit::PropertyInfo<Self>> {
///         vec![
///             ::clonekit::PropertyInfo::read_write::<String, _, _>(
///                 "name",
///                 |owner: &Self| ::core::clone::Clone::clone(&owner.name),
///                 |owner: &mut Self, value: String| owner.name = value,
///             ),
///             ::clonekit::PropertyInfo::read_only::<u64, _>(
///                 "id",
///                 |owner: &Self| ::core::clone::Clone::clone(&owner.id),
///             ),
///         ]
///     }
/// }
/// ```
///
/// Fields declared as `Option<U>` use the `*_optional` constructors so that
/// a `None` read from them stays `None`.
pub fn expand_properties(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let slots = struct_fields(&input, "Properties")?;
    let mut generics = static_generics(&input)?;
    let has_type_params = generics.type_params().next().is_some();

    let mut entries = Vec::new();
    for slot in &slots {
        if slot.attrs.skip {
            continue;
        }

        let access = match (slot.attrs.access, &slot.field.vis) {
            (Some(access), _) => access,
            (None, Visibility::Public(_)) => Access::ReadWrite,
            (None, _) => continue,
        };

        let ty = &slot.field.ty;
        let member = &slot.member;
        let name = &slot.name;
        let optional = option_payload(ty);

        if has_type_params {
            let bounds: Vec<syn::WherePredicate> = match access {
                Access::ReadOnly => vec![parse_quote!(
                    #ty: ::core::clone::Clone + ::core::marker::Send + ::core::marker::Sync + 'static
                )],
                Access::WriteOnly => vec![parse_quote!(#ty: ::clonekit::Assign)],
                Access::ReadWrite => vec![parse_quote!(
                    #ty: ::clonekit::Assign
                        + ::core::clone::Clone
                        + ::core::marker::Send
                        + ::core::marker::Sync
                )],
            };
            generics.make_where_clause().predicates.extend(bounds);
            if let (Some(payload), Access::ReadOnly | Access::ReadWrite) = (optional, access) {
                generics.make_where_clause().predicates.push(parse_quote!(
                    #payload: ::core::marker::Send + ::core::marker::Sync + 'static
                ));
            }
        }

        let getter = quote! {
            |owner: &Self| ::core::clone::Clone::clone(&owner.#member)
        };
        let setter = quote! {
            |owner: &mut Self, value: #ty| owner.#member = value
        };

        entries.push(match (access, optional) {
            (Access::ReadWrite, Some(payload)) => quote! {
                ::clonekit::PropertyInfo::read_write_optional::<#payload, _, _>(#name, #getter, #setter)
            },
            (Access::ReadOnly, Some(payload)) => quote! {
                ::clonekit::PropertyInfo::read_only_optional::<#payload, _>(#name, #getter)
            },
            (Access::ReadWrite, None) => quote! {
                ::clonekit::PropertyInfo::read_write::<#ty, _, _>(#name, #getter, #setter)
            },
            (Access::ReadOnly, None) => quote! {
                ::clonekit::PropertyInfo::read_only::<#ty, _>(#name, #getter)
            },
            (Access::WriteOnly, _) => quote! {
                ::clonekit::PropertyInfo::write_only::<#ty, _>(#name, #setter)
            },
        });
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::clonekit::Properties for #struct_name #ty_generics #where_clause {
            fn properties() -> ::std::vec::Vec<::clonekit::PropertyInfo<Self>> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

/// The `U` of a field written as `Option<U>` (any path ending in `Option`)
fn option_payload(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let mut args = args.args.iter();
    match (args.next(), args.next()) {
        (Some(GenericArgument::Type(payload)), None) => Some(payload),
        _ => None,
    }
}
