//! Implementation of `#[derive(Inject)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

pub fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "Inject can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Inject can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let field_deps = fields.iter().map(|field| {
        let field_type = &field.ty;
        quote! {
            <#field_type as ::injector::Resolve>::dependency()
        }
    });

    let field_inits = fields.iter().map(|field| {
        let field_name = field.ident.as_ref().unwrap();
        let field_type = &field.ty;
        quote! {
            #field_name: <#field_type as ::injector::Resolve>::resolve(container, ctx)?
        }
    });

    let expanded = quote! {
        impl #impl_generics ::injector::Inject for #name #ty_generics #where_clause {
            fn dependencies() -> ::std::vec::Vec<::injector::Dependency> {
                ::std::vec![#(#field_deps),*]
            }

            fn inject(
                container: &::injector::Container,
                ctx: &mut ::injector::ResolutionContext,
            ) -> ::injector::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#field_inits),*
                })
            }
        }
    };

    TokenStream::from(expanded)
}
