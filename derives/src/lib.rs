//! Derive macros for rcontainer
//!
//! This crate provides procedural macros for the rcontainer object container.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, GenericParam, LitStr, TypeParam};

/// Generates `rcontainer::Component` for a struct.
///
/// Fields marked `#[inject]` are resolved from the container through
/// `rcontainer::Inject`; `#[inject(name = "...")]` resolves a named
/// registration. Every other field is built with `Default::default()`.
#[proc_macro_derive(Component, attributes(inject))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = input.ident;

    let generics = input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut where_predicates: Vec<syn::WherePredicate> = where_clause
        .map(|w| w.predicates.iter().cloned().collect())
        .unwrap_or_default();

    // Components are shared across threads
    for param in generics.params.iter() {
        if let GenericParam::Type(TypeParam { ident, .. }) = param {
            where_predicates.push(syn::parse_quote!(#ident: ::core::marker::Send + ::core::marker::Sync + 'static));
        }
    }

    let body = match input.data {
        Data::Struct(data_struct) => match data_struct.fields {
            Fields::Named(fields) => {
                let inits = fields
                    .named
                    .iter()
                    .map(|field| -> syn::Result<TokenStream2> {
                        let ident = &field.ident;
                        let value = field_value(field)?;
                        Ok(quote! { #ident: #value })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;
                quote! { Self { #(#inits,)* } }
            }
            Fields::Unnamed(fields) => {
                let inits = fields
                    .unnamed
                    .iter()
                    .map(field_value)
                    .collect::<syn::Result<Vec<_>>>()?;
                quote! { Self( #(#inits,)* ) }
            }
            Fields::Unit => quote! { Self },
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Component can only be derived for structs",
            ))
        }
    };

    let where_clause = if !where_predicates.is_empty() {
        quote! { where #(#where_predicates),* }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl #impl_generics ::rcontainer::Component for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn construct(
                container: &::rcontainer::ObjectContainer,
            ) -> ::rcontainer::anyhow::Result<Self> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}

fn field_value(field: &Field) -> syn::Result<TokenStream2> {
    let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("inject")) else {
        return Ok(quote! { ::core::default::Default::default() });
    };

    let mut name: Option<LitStr> = None;
    if !matches!(attr.meta, syn::Meta::Path(_)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        })?;
    }

    let ty = &field.ty;
    let name = match name {
        Some(lit) => quote! { ::core::option::Option::Some(#lit) },
        None => quote! { ::core::option::Option::None },
    };
    Ok(quote! {
        <#ty as ::rcontainer::Inject>::inject(container, #name)?
    })
}
