//! Procedural macros for the session-signal taxonomy enums.
//!
//! - `#[derive(Label)]`: implements `session_signal::Label`, returning the variant name.
//! - `#[derive(Coded)]`: implements `session_signal::Coded` from `#[code = "..."]`
//!   attributes. Exactly one variant must be marked `#[unknown]`; it is used when a
//!   peer sends a code this build doesn't know.
//!
//! Usage:
//! ```rust,ignore
//! use session_signal::{Coded, Label};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Label, Coded)]
//! enum Presence {
//!     #[code = "ON"]
//!     Online,
//!     #[code = "?"]
//!     #[unknown]
//!     Unknown,
//! }
//! ```
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DataEnum, DeriveInput, Expr, ExprLit, Fields, Lit, LitStr, Meta, parse_macro_input,
    spanned::Spanned,
};

#[proc_macro_derive(Label)]
pub fn derive_label(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ident = input.ident.clone();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data_enum) => {
            let match_arms = data_enum.variants.iter().map(|variant| {
                let variant_ident = &variant.ident;
                let variant_name = variant_ident.to_string();
                let pattern = match &variant.fields {
                    Fields::Unit => quote! { Self::#variant_ident },
                    Fields::Unnamed(_) => quote! { Self::#variant_ident(..) },
                    Fields::Named(_) => quote! { Self::#variant_ident { .. } },
                };
                quote! {
                    #pattern => ::std::borrow::Cow::Borrowed(#variant_name)
                }
            });
            quote! {
                match self {
                    #(#match_arms),*
                }
            }
        }
        _ => {
            let name = ident.to_string();
            quote! { ::std::borrow::Cow::Borrowed(#name) }
        }
    };

    let expanded = quote! {
        impl #impl_generics session_signal::Label for #ident #ty_generics #where_clause {
            fn label(&self) -> ::std::borrow::Cow<'static, str> {
                #body
            }
        }
    };
    TokenStream::from(expanded)
}

/// Derives `session_signal::Coded` for a fieldless enum.
///
/// Every variant needs a `#[code = "..."]` attribute carrying its wire code,
/// codes must be unique, and exactly one variant must be marked `#[unknown]`.
#[proc_macro_derive(Coded, attributes(code, unknown))]
pub fn derive_coded(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_coded(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand_coded(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let Data::Enum(DataEnum { variants, .. }) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "Coded can only be derived for enums",
        ));
    };

    let mut idents = Vec::with_capacity(variants.len());
    let mut codes: Vec<LitStr> = Vec::with_capacity(variants.len());
    let mut unknown = None;

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "Coded variants must not carry fields",
            ));
        }

        let mut code = None;
        for attr in &variant.attrs {
            if attr.path().is_ident("unknown") {
                if unknown.is_some() {
                    return Err(syn::Error::new(
                        attr.span(),
                        "only one variant can be marked #[unknown]",
                    ));
                }
                unknown = Some(variant.ident.clone());
            } else if attr.path().is_ident("code") {
                code = Some(code_literal(&attr.meta)?);
            }
        }

        let code = code.ok_or_else(|| {
            syn::Error::new(variant.span(), "missing #[code = \"...\"] attribute")
        })?;
        if let Some(dup) = codes.iter().find(|c| c.value() == code.value()) {
            return Err(syn::Error::new(
                code.span(),
                format!("duplicate wire code \"{}\"", dup.value()),
            ));
        }
        idents.push(variant.ident.clone());
        codes.push(code);
    }

    let unknown = unknown.ok_or_else(|| {
        syn::Error::new(input.span(), "one variant must be marked #[unknown]")
    })?;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics session_signal::Coded for #ident #ty_generics #where_clause {
            const ALL: &'static [Self] = &[#(Self::#idents),*];
            const UNKNOWN: Self = Self::#unknown;

            fn code(&self) -> &'static str {
                match self {
                    #(Self::#idents => #codes),*
                }
            }

            fn from_code(code: &str) -> ::std::option::Option<Self> {
                match code {
                    #(#codes => ::std::option::Option::Some(Self::#idents),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}

fn code_literal(meta: &Meta) -> syn::Result<LitStr> {
    if let Meta::NameValue(nv) = meta {
        if let Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) = &nv.value
        {
            return Ok(lit.clone());
        }
    }
    Err(syn::Error::new(
        meta.span(),
        "expected #[code = \"...\"] with a string literal",
    ))
}
