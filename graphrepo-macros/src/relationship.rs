//! Implementation of #[derive(GraphRelationship)] proc-macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput};

use crate::node::parse_str_attr;

pub fn derive_graph_relationship_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    if !matches!(&input.data, Data::Struct(_)) {
        return syn::Error::new_spanned(
            &input,
            "GraphRelationship can only be derived for structs",
        )
        .to_compile_error()
        .into();
    }

    // Parse #[graph(rel_type = "...")], defaulting to the struct name
    let rel_type = parse_str_attr(&input, "rel_type").unwrap_or_else(|| name.to_string());

    let expanded = quote! {
        impl #impl_generics ::graphrepo::GraphRelationship for #name #ty_generics #where_clause {
            const TYPE: &'static str = #rel_type;
        }
    };

    TokenStream::from(expanded)
}
