//! Implementation of `#[derive(Component)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parse;
use syn::{parse_macro_input, DeriveInput};

pub fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let interfaces = match parse_interfaces(&input) {
        Ok(interfaces) => interfaces,
        Err(err) => return err.to_compile_error().into(),
    };

    let upcasts = interfaces.iter().map(|interface| {
        quote! {
            impl #impl_generics ::injector::Implements<#interface> for #name #ty_generics #where_clause {
                fn upcast(
                    this: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<#interface> {
                    this
                }
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::injector::Component for #name #ty_generics #where_clause {}

        #(#upcasts)*
    };

    TokenStream::from(expanded)
}

/// Parses `#[component(implements(dyn Store, dyn Flush))]`.
fn parse_interfaces(input: &DeriveInput) -> syn::Result<Vec<syn::Type>> {
    let mut interfaces = Vec::new();
    for attr in &input.attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("implements") {
                let content;
                syn::parenthesized!(content in meta.input);
                let types = content.parse_terminated(syn::Type::parse, syn::Token![,])?;
                interfaces.extend(types);
                Ok(())
            } else {
                Err(meta.error("expected `implements(...)`"))
            }
        })?;
    }
    Ok(interfaces)
}
