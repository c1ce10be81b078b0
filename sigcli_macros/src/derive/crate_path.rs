//! Crate path resolution for renamed dependencies.
//!
//! Converts the optional `#[sigcli(crate = "...")]` attribute value into the
//! tokens that prefix every `sigcli` path in generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Resolve the crate path from the parsed struct attribute.
///
/// Defaults to `::sigcli`. An override is emitted verbatim so callers can use
/// either a bare alias or a path through another crate's re-export.
pub(crate) fn resolve(crate_path: Option<&syn::Path>) -> TokenStream {
    crate_path.map_or_else(|| quote! { ::sigcli }, |path| quote! { #path })
}
