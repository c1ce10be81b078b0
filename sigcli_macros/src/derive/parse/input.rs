//! Input parsing for the `Parameters` derive macro.
//!
//! Gathers the struct identifier, fields and attribute metadata in one pass
//! so expansion can fail fast with spanned errors.

use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields};

use super::{FieldAttrs, FieldRole, StructAttrs, doc_text, parse_field_attrs, parse_struct_attrs};

pub(crate) struct ParsedField {
    pub ident: syn::Ident,
    /// Parameter name: the field name without any `r#` prefix.
    pub name: String,
    pub ty: syn::Type,
    pub attrs: FieldAttrs,
    pub doc: Option<String>,
}

pub(crate) struct ParsedInput {
    pub ident: syn::Ident,
    pub attrs: StructAttrs,
    pub doc: Option<String>,
    pub fields: Vec<ParsedField>,
}

fn reject_duplicate_role(fields: &[ParsedField], role: FieldRole, key: &str) -> syn::Result<()> {
    let mut seen = fields.iter().filter(|f| f.attrs.role == role).skip(1);
    match seen.next() {
        Some(extra) => Err(syn::Error::new_spanned(
            &extra.ident,
            format!("only one field may be marked {key}"),
        )),
        None => Ok(()),
    }
}

/// Parses a derive input into its struct and field metadata.
pub(crate) fn parse_input(input: &DeriveInput) -> syn::Result<ParsedInput> {
    let ident = input.ident.clone();
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Parameters cannot be derived for generic structs",
        ));
    }
    let attrs = parse_struct_attrs(&input.attrs)?;
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    data.struct_token,
                    "Parameters requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Parameters can only be derived for structs",
            ));
        }
    };

    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let Some(field_ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "field must be named"));
        };
        fields.push(ParsedField {
            name: field_ident.unraw().to_string(),
            ident: field_ident,
            ty: field.ty.clone(),
            attrs: parse_field_attrs(field)?,
            doc: doc_text(&field.attrs),
        });
    }
    reject_duplicate_role(&fields, FieldRole::VarArgs, "var_args")?;
    reject_duplicate_role(&fields, FieldRole::VarKwargs, "var_kwargs")?;

    Ok(ParsedInput {
        doc: doc_text(&input.attrs),
        ident,
        attrs,
        fields,
    })
}
