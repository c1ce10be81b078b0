//! Type introspection helpers.
//!
//! These utilities perform shallow inspection of `syn::Type` values to
//! recognise wrappers such as `Option<T>` and collections such as `Vec<T>`.

use syn::{GenericArgument, PathArguments, Type};

/// Extract the first type argument from a `PathArguments` container.
fn first_type_argument(args: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(angle_args) = args else {
        return None;
    };
    angle_args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

/// Returns the final path segment's identifier, ignoring any prefix such as
/// `std::collections::`.
pub(crate) fn last_ident(ty: &Type) -> Option<&syn::Ident> {
    let Type::Path(p) = ty else {
        return None;
    };
    if p.qself.is_some() {
        return None;
    }
    p.path.segments.last().map(|seg| &seg.ident)
}

/// Returns the generic parameter if `ty` is the named wrapper.
///
/// Only the outermost layer is inspected.
fn type_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(p) = ty else {
        return None;
    };
    let last = p.path.segments.last()?;
    if last.ident != wrapper {
        return None;
    }
    first_type_argument(&last.arguments)
}

/// Returns the inner type if `ty` is `Option<T>`.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    type_inner(ty, "Option")
}

/// Extracts the element type `T` if `ty` is `Vec<T>`.
pub(crate) fn vec_inner(ty: &Type) -> Option<&Type> {
    type_inner(ty, "Vec")
}

/// Extracts the element type `T` if `ty` is `BTreeSet<T>` or `HashSet<T>`.
pub(crate) fn set_inner(ty: &Type) -> Option<&Type> {
    type_inner(ty, "BTreeSet").or_else(|| type_inner(ty, "HashSet"))
}

/// Strips references and parentheses, so `&str` inspects as `str`.
pub(crate) fn peel(ty: &Type) -> &Type {
    match ty {
        Type::Reference(r) => peel(&r.elem),
        Type::Paren(p) => peel(&p.elem),
        Type::Group(g) => peel(&g.elem),
        other => other,
    }
}
