// #[derive(Assign)] implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::static_generics;

/// Expands #[derive(Assign)] into an empty impl, which picks up the
/// trait's exact-type defaults.
pub fn expand_assign(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = static_generics(&input)?;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::clonekit::Assign for #name #ty_generics #where_clause {}
    })
}
