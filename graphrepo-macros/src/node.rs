//! Implementation of #[derive(GraphNode)] proc-macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

pub fn derive_graph_node_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Parse #[graph(label = "...")], defaulting to the struct name
    let label = parse_str_attr(&input, "label").unwrap_or_else(|| name.to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "GraphNode can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "GraphNode can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    // Overlay rules: Option fields copy only when the incoming value is
    // Some; everything else copies unconditionally.
    let overlay_stmts = fields.iter().map(|field| {
        let field_name = field.ident.as_ref().unwrap();

        if is_option(&field.ty) {
            quote! {
                if incoming.#field_name.is_some() {
                    self.#field_name = incoming.#field_name.clone();
                }
            }
        } else {
            quote! {
                self.#field_name = incoming.#field_name.clone();
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::graphrepo::GraphNode for #name #ty_generics #where_clause {
            const LABEL: &'static str = #label;

            fn overlay(&mut self, incoming: &Self) {
                #(#overlay_stmts)*
            }
        }
    };

    TokenStream::from(expanded)
}

/// Returns true when a type is spelled as `Option<...>`.
fn is_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}

/// Parses a `#[graph(key = "value")]` string attribute from the input.
pub(crate) fn parse_str_attr(input: &DeriveInput, key: &str) -> Option<String> {
    for attr in &input.attrs {
        if attr.path().is_ident("graph") {
            let mut value: Option<String> = None;

            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(key) {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    value = Some(lit.value());
                }
                Ok(())
            });

            if value.is_some() {
                return value;
            }
        }
    }
    None
}
