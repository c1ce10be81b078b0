//! Token generation for the `Parameters` derive.

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Expr, Type};

use super::parse::type_utils::{last_ident, option_inner, peel, set_inner, vec_inner};
use super::parse::{FieldRole, ParsedField, ParsedInput};

/// What a Rust type maps to once references and paths are stripped.
#[derive(Debug, PartialEq, Eq)]
enum Shape {
    Scalar(&'static str),
    Untyped,
    Named(String),
}

fn scalar_shape(ty: &Type) -> Option<Shape> {
    let ident = last_ident(peel(ty))?.to_string();
    let shape = match ident.as_str() {
        "String" | "str" => Shape::Scalar("Str"),
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            Shape::Scalar("Int")
        }
        "f32" | "f64" => Shape::Scalar("Float"),
        "bool" => Shape::Scalar("Bool"),
        "PathBuf" | "Path" => Shape::Scalar("Path"),
        "Value" => Shape::Untyped,
        _ => Shape::Named(ident),
    };
    Some(shape)
}

/// Builds the `Annotation` expression describing `ty`.
pub(crate) fn annotation(krate: &TokenStream, declared: &Type) -> syn::Result<TokenStream> {
    let ty = peel(declared);
    if let Type::Tuple(tuple) = ty {
        if tuple.elems.is_empty() {
            return Err(syn::Error::new_spanned(ty, "unit is not a parameter type"));
        }
        let elems = tuple
            .elems
            .iter()
            .map(|elem| annotation(krate, elem))
            .collect::<syn::Result<Vec<_>>>()?;
        return Ok(quote! { #krate::Annotation::Tuple(::std::vec![#(#elems),*]) });
    }
    if let Some(inner) = option_inner(ty) {
        let element = annotation(krate, inner)?;
        return Ok(quote! { #krate::Annotation::optional(#element) });
    }
    if let Some(inner) = vec_inner(ty) {
        let element = annotation(krate, inner)?;
        return Ok(quote! { #krate::Annotation::list(#element) });
    }
    if let Some(inner) = set_inner(ty) {
        let element = annotation(krate, inner)?;
        return Ok(quote! { #krate::Annotation::set(#element) });
    }
    match scalar_shape(ty) {
        Some(Shape::Scalar(tag)) => {
            let variant = syn::Ident::new(tag, proc_macro2::Span::call_site());
            Ok(quote! { #krate::Annotation::of(#krate::TypeTag::#variant) })
        }
        Some(Shape::Untyped) => Ok(quote! { #krate::Annotation::Missing }),
        Some(Shape::Named(name)) => Ok(quote! { #krate::Annotation::named(#name) }),
        None => Err(syn::Error::new_spanned(
            ty,
            "unsupported parameter type; use a path, tuple, Option, Vec or set type",
        )),
    }
}

fn is_named(ty: &Type) -> bool {
    matches!(scalar_shape(ty), Some(Shape::Named(_)))
}

fn is_int(ty: &Type) -> bool {
    matches!(scalar_shape(ty), Some(Shape::Scalar("Int")))
}

fn is_float(ty: &Type) -> bool {
    matches!(scalar_shape(ty), Some(Shape::Scalar("Float")))
}

/// Builds the builder call that attaches a declared default.
///
/// Numeric and tuple defaults are bound to the field type so literals take
/// its width. Integers go through the range-checked `Value::int`; values of
/// registered custom types are wrapped as objects; everything else goes
/// through the `From` conversions on `Value`.
fn default_setter(krate: &TokenStream, ty: &Type, expr: &Expr) -> TokenStream {
    let inner = option_inner(ty);
    let base = peel(inner.unwrap_or(ty));
    let typed = if is_int(base) || is_float(base) || matches!(base, Type::Tuple(_)) {
        quote! { { let typed: #ty = #expr; typed } }
    } else {
        quote! { ::core::convert::Into::<#ty>::into(#expr) }
    };
    let none = quote! { ::core::option::Option::None };
    let some = quote! { ::core::option::Option::Some };
    match inner {
        Some(_) if is_int(base) => quote! {
            .try_default(match #typed {
                #some(value) => #krate::Value::int(value),
                #none => ::core::result::Result::Ok(#krate::Value::None),
            })
        },
        None if is_int(base) => quote! { .try_default(#krate::Value::int(#typed)) },
        Some(_) if is_named(base) => quote! {
            .default(match #typed {
                #some(value) => #krate::Value::object(value),
                #none => #krate::Value::None,
            })
        },
        None if is_named(base) => quote! { .default(#krate::Value::object(#typed)) },
        _ => quote! { .default(#krate::Value::from(#typed)) },
    }
}

fn parameter(krate: &TokenStream, field: &ParsedField) -> syn::Result<TokenStream> {
    let name = &field.name;
    let tokens = match field.attrs.role {
        FieldRole::VarArgs => quote! { #krate::Parameter::var_args(#name) },
        FieldRole::VarKwargs => quote! { #krate::Parameter::var_kwargs(#name) },
        FieldRole::Regular => {
            let annotation = annotation(krate, &field.ty)?;
            let default = field
                .attrs
                .default
                .as_ref()
                .map(|expr| default_setter(krate, &field.ty, expr));
            quote! { #krate::Parameter::new(#name).annotated(#annotation) #default }
        }
    };
    Ok(tokens)
}

fn extraction(field: &ParsedField) -> TokenStream {
    let ident = &field.ident;
    let name = &field.name;
    match field.attrs.role {
        FieldRole::VarArgs => quote! { #ident: invocation.take_extra_args() },
        FieldRole::VarKwargs => quote! { #ident: invocation.take_extra_kwargs() },
        FieldRole::Regular => quote! { #ident: invocation.take(#name)? },
    }
}

fn docs(krate: &TokenStream, input: &ParsedInput) -> TokenStream {
    let description = input
        .doc
        .as_ref()
        .map(|text| quote! { .description(#text) });
    let params = input.fields.iter().filter_map(|field| {
        let text = field.doc.as_ref()?;
        let name = &field.name;
        Some(quote! { .param(#name, #text) })
    });
    quote! { #krate::Docs::new() #description #(#params)* }
}

/// Generates the `Parameters` and `FromValue` impls.
pub(crate) fn impls(krate: &TokenStream, input: &ParsedInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let name = input
        .attrs
        .name
        .as_ref()
        .map_or_else(|| ident.to_string().to_snake_case(), syn::LitStr::value);
    let params = input
        .fields
        .iter()
        .map(|field| parameter(krate, field))
        .collect::<syn::Result<Vec<_>>>()?;
    let extractions = input.fields.iter().map(extraction);
    let unused = input.fields.is_empty().then(|| quote! { let _ = invocation; });
    let docs = docs(krate, input);

    Ok(quote! {
        #[automatically_derived]
        impl #krate::Parameters for #ident {
            fn signature() -> #krate::Signature {
                #krate::Signature::new(#name)
                    #( .param(#params) )*
                    .docs(#docs)
            }

            fn from_invocation(
                invocation: &mut #krate::Invocation,
            ) -> #krate::SigResult<Self> {
                #unused
                ::core::result::Result::Ok(Self {
                    #( #extractions, )*
                })
            }
        }

        #[automatically_derived]
        impl #krate::FromValue for #ident {
            fn from_value(
                value: #krate::Value,
            ) -> ::core::result::Result<Self, #krate::ValueError> {
                value.into_object()
            }
        }
    })
}
