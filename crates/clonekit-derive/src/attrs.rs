// #[clonekit(...)] field attribute parsing and shared derive helpers

use quote::ToTokens;
use syn::ext::IdentExt;
use syn::{parse_quote, Data, DeriveInput, Field, Generics, Index, Member, Result};

/// Accessor shape requested for a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Parsed `#[clonekit(...)]` options for one field
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub skip: bool,
    pub access: Option<Access>,
}

impl FieldAttrs {
    pub fn parse(field: &Field) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("clonekit") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                let access = if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    return Ok(());
                } else if meta.path.is_ident("readonly") {
                    Access::ReadOnly
                } else if meta.path.is_ident("writeonly") {
                    Access::WriteOnly
                } else if meta.path.is_ident("readwrite") {
                    Access::ReadWrite
                } else {
                    return Err(meta.error(format!(
                        "unknown clonekit attribute `{}`",
                        meta.path.to_token_stream()
                    )));
                };

                if attrs.access.is_some_and(|existing| existing != access) {
                    return Err(meta.error("conflicting clonekit access attributes"));
                }
                attrs.access = Some(access);
                Ok(())
            })?;
        }

        Ok(attrs)
    }
}

/// A struct field with its access path and reported name
pub struct FieldSlot<'a> {
    pub field: &'a Field,
    pub member: Member,
    pub name: String,
    pub attrs: FieldAttrs,
}

/// Collect the fields of a struct, rejecting enums and unions
pub fn struct_fields<'a>(input: &'a DeriveInput, derive: &str) -> Result<Vec<FieldSlot<'a>>> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                format!("#[derive({})] only works on structs", derive),
            ))
        }
    };

    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let (member, name) = match &field.ident {
                Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
                None => (Member::Unnamed(Index::from(index)), index.to_string()),
            };
            Ok(FieldSlot {
                field,
                member,
                name,
                attrs: FieldAttrs::parse(field)?,
            })
        })
        .collect()
}

/// Reject lifetime parameters and require `'static` type parameters
pub fn static_generics(input: &DeriveInput) -> Result<Generics> {
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "clonekit derives require 'static types; lifetime parameters are not supported",
        ));
    }

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    Ok(generics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots_error(input: DeriveInput) -> String {
        match struct_fields(&input, "Properties") {
            Ok(_) => panic!("expected an error"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn test_parse_access_and_skip() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[clonekit(readonly)]
                id: u64,
                #[clonekit(skip)]
                cache: u8,
                #[clonekit(writeonly, writeonly)]
                pub r#type: String,
                plain: bool,
            }
        };
        let slots = struct_fields(&input, "Properties").unwrap();

        assert_eq!(slots[0].attrs.access, Some(Access::ReadOnly));
        assert!(slots[1].attrs.skip);
        assert_eq!(slots[2].name, "type");
        assert_eq!(slots[2].attrs.access, Some(Access::WriteOnly));
        assert!(!slots[3].attrs.skip && slots[3].attrs.access.is_none());
    }

    #[test]
    fn test_tuple_fields_named_by_index() {
        let input: DeriveInput = parse_quote! {
            struct Pair(u8, #[clonekit(skip)] u16);
        };
        let slots = struct_fields(&input, "Fields").unwrap();
        assert_eq!(slots[0].name, "0");
        assert_eq!(slots[1].name, "1");
        assert!(slots[1].attrs.skip);
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[clonekit(hidden)]
                id: u64,
            }
        };
        assert_eq!(slots_error(input), "unknown clonekit attribute `hidden`");
    }

    #[test]
    fn test_conflicting_access_rejected() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[clonekit(readonly)]
                #[clonekit(readwrite)]
                id: u64,
            }
        };
        assert_eq!(slots_error(input), "conflicting clonekit access attributes");
    }

    #[test]
    fn test_enum_and_union_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Shape { Circle, Square }
        };
        assert_eq!(slots_error(input), "#[derive(Properties)] only works on structs");

        let input: DeriveInput = parse_quote! {
            union Bits { a: u32, b: f32 }
        };
        assert_eq!(slots_error(input), "#[derive(Properties)] only works on structs");
    }

    #[test]
    fn test_lifetimes_rejected() {
        let input: DeriveInput = parse_quote! {
            struct View<'a> { name: &'a str }
        };
        assert!(static_generics(&input).is_err());
    }

    #[test]
    fn test_type_params_made_static() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T: Clone> { inner: T }
        };
        let generics = static_generics(&input).unwrap();
        let param = generics.type_params().next().unwrap();
        assert_eq!(param.bounds.len(), 2);
        assert_eq!(param.bounds.last().unwrap().to_token_stream().to_string(), "'static");
    }
}
