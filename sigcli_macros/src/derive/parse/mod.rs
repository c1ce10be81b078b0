//! Attribute parsing for the `Parameters` derive macro.

use syn::{Attribute, Expr, Token};

mod docs;
mod input;
mod literals;
pub(crate) mod type_utils;

pub(crate) use docs::doc_text;
pub(crate) use input::{ParsedField, ParsedInput, parse_input};
use literals::{lit_path, lit_str};

#[derive(Default)]
pub(crate) struct StructAttrs {
    pub name: Option<syn::LitStr>,
    pub crate_path: Option<syn::Path>,
}

/// How a field participates in the generated signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FieldRole {
    #[default]
    Regular,
    VarArgs,
    VarKwargs,
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub default: Option<Expr>,
    pub role: FieldRole,
}

/// Iterate all `#[sigcli(...)]` attributes once and apply a callback.
fn parse_sigcli<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&syn::meta::ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|a| a.path().is_ident("sigcli")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

fn unknown_key(meta: &syn::meta::ParseNestedMeta, place: &str) -> syn::Error {
    let key = meta
        .path
        .get_ident()
        .map_or_else(|| "attribute".to_owned(), ToString::to_string);
    meta.error(format!("unknown {place} key `{key}`"))
}

/// Accepts both `flag` and `flag = true`.
fn parse_switch(meta: &syn::meta::ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        Ok(meta.value()?.parse::<syn::LitBool>()?.value)
    } else {
        Ok(true)
    }
}

/// Extracts `#[sigcli(...)]` metadata applied to a struct.
///
/// Recognised keys are `name` and `crate`; anything else is rejected.
pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    parse_sigcli(attrs, |meta| {
        match meta.path.get_ident().map(ToString::to_string).as_deref() {
            Some("name") => {
                let name = lit_str(meta, "name")?;
                if name.value().trim().is_empty() {
                    return Err(syn::Error::new(name.span(), "name must not be empty"));
                }
                out.name = Some(name);
            }
            Some("crate") => out.crate_path = Some(lit_path(meta, "crate")?),
            _ => return Err(unknown_key(meta, "struct")),
        }
        Ok(())
    })?;
    Ok(out)
}

fn set_role(
    out: &mut FieldAttrs,
    role: FieldRole,
    meta: &syn::meta::ParseNestedMeta,
) -> syn::Result<()> {
    if !parse_switch(meta)? {
        return Ok(());
    }
    if out.role != FieldRole::Regular && out.role != role {
        return Err(meta.error("var_args and var_kwargs are mutually exclusive"));
    }
    out.role = role;
    Ok(())
}

/// Parses field-level `#[sigcli(...)]` attributes.
///
/// Recognised keys are `default = <expr>`, `var_args` and `var_kwargs`.
pub(crate) fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_sigcli(&field.attrs, |meta| {
        match meta.path.get_ident().map(ToString::to_string).as_deref() {
            Some("default") => out.default = Some(meta.value()?.parse()?),
            Some("var_args") => set_role(&mut out, FieldRole::VarArgs, meta)?,
            Some("var_kwargs") => set_role(&mut out, FieldRole::VarKwargs, meta)?,
            _ => return Err(unknown_key(meta, "field")),
        }
        Ok(())
    })?;
    if out.role != FieldRole::Regular && out.default.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "catch-all fields cannot declare a default",
        ));
    }
    Ok(out)
}
