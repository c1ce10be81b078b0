//! Procedural macros for `sigcli`.
//!
//! `#[derive(Parameters)]` turns a struct with named fields into a parameter
//! signature: each field becomes a parameter whose annotation is derived from
//! the field's Rust type, doc comments become help text and
//! `#[sigcli(default = ...)]` supplies defaults. The derive also implements
//! `FromValue` so the struct can be registered as a composite type.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive macro for `sigcli::Parameters`.
///
/// Struct attributes: `name = "..."` overrides the callable name (the struct
/// name in `snake_case` otherwise) and `crate = "..."` points the generated
/// code at a renamed dependency. Field attributes: `default = <expr>`,
/// `var_args` and `var_kwargs`.
#[proc_macro_derive(Parameters, attributes(sigcli))]
pub fn derive_parameters(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
