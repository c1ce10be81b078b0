//! Maps a parameter's declared annotation to a canonical resolved type.
//!
//! Resolution walks named references, optionals and new types until a
//! concrete shape remains, then decides arity, multiplicity, flag-ness and
//! the converter applied to raw tokens.

use tracing::debug;

use crate::error::{SigError, SigResult};
use crate::registry::{Converter, Registry};
use crate::signature::{Annotation, Parameter, TypeTag};
use crate::value::Value;

/// Named references deeper than this are treated as cyclic.
const MAX_NAME_DEPTH: usize = 32;

/// Outcome of resolving one parameter's annotation.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// Concrete semantic type after unwrapping.
    pub tag: TypeTag,
    /// Outermost new-type identity, if the annotation declared one.
    pub alias: Option<TypeTag>,
    /// Tokens consumed by one occurrence.
    pub arity: usize,
    /// Whether repeated occurrences accumulate.
    pub multiple: bool,
    /// Whether the type admits no value.
    pub optional: bool,
    /// Whether the parameter is a boolean flag.
    pub flag: bool,
    pub(crate) converters: Vec<Converter>,
}

impl ResolvedType {
    /// Key used for composite lookups, and tried first for validations.
    #[must_use]
    pub const fn match_key(&self) -> &TypeTag {
        match &self.alias {
            Some(alias) => alias,
            None => &self.tag,
        }
    }
}

/// Resolves annotations against a registry on behalf of one callable.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'r> {
    registry: &'r Registry,
    callable: &'r str,
}

/// A concrete annotation together with the new type that wrapped it.
struct Unwrapped {
    annotation: Annotation,
    alias: Option<TypeTag>,
    optional: bool,
}

impl<'r> TypeResolver<'r> {
    /// Resolver for parameters of `callable`.
    #[must_use]
    pub const fn new(registry: &'r Registry, callable: &'r str) -> Self {
        Self { registry, callable }
    }

    /// Resolves `param`, using `override_with` in place of its declared
    /// annotation when given.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Signature`] when a name cannot be found, a union
    /// has more than one non-null alternative, or a container element is not
    /// a plain scalar type.
    pub fn resolve(
        &self,
        param: &Parameter,
        override_with: Option<&Annotation>,
    ) -> SigResult<ResolvedType> {
        let name = param.name();
        let declared = override_with.unwrap_or_else(|| param.annotation());
        let annotation = if *declared == Annotation::Missing {
            let inferred = param
                .default_value()
                .filter(|v| !v.is_none())
                .map_or_else(|| Annotation::of(TypeTag::Str), inferred_annotation);
            debug!(
                callable = self.callable,
                parameter = name,
                annotation = ?inferred,
                "no annotation, inferred type"
            );
            inferred
        } else {
            declared.clone()
        };

        let Unwrapped {
            annotation,
            alias,
            optional,
        } = self.unwrap(name, annotation)?;

        let resolved = match annotation {
            Annotation::Type(TypeTag::None) => {
                return Err(self.error(name, "the null type cannot be a parameter type"));
            }
            Annotation::Type(TypeTag::Tuple) => {
                return Err(self.error(name, "tuple parameters must list their element types"));
            }
            Annotation::Type(tag @ (TypeTag::List | TypeTag::Set)) => ResolvedType {
                converters: vec![self.converter(None, &TypeTag::Str)],
                tag,
                alias,
                arity: 1,
                multiple: true,
                optional,
                flag: false,
            },
            Annotation::Type(tag) => ResolvedType {
                converters: vec![self.converter(alias.as_ref(), &tag)],
                flag: tag == TypeTag::Bool,
                tag,
                alias,
                arity: 1,
                multiple: false,
                optional,
            },
            Annotation::Tuple(elements) if elements.is_empty() => {
                return Err(self.error(name, "tuple parameters must list their element types"));
            }
            Annotation::Tuple(elements) => {
                let converters = elements
                    .into_iter()
                    .map(|element| self.element(name, element))
                    .collect::<SigResult<Vec<_>>>()?;
                ResolvedType {
                    tag: TypeTag::Tuple,
                    alias,
                    arity: converters.len(),
                    multiple: false,
                    optional,
                    flag: false,
                    converters,
                }
            }
            Annotation::List(element) => {
                self.container(name, TypeTag::List, *element, alias, optional)?
            }
            Annotation::Set(element) => {
                self.container(name, TypeTag::Set, *element, alias, optional)?
            }
            other => {
                return Err(self.error(name, format!("unsupported annotation {other:?}")));
            }
        };
        Ok(resolved)
    }

    fn container(
        &self,
        name: &str,
        tag: TypeTag,
        element: Annotation,
        alias: Option<TypeTag>,
        optional: bool,
    ) -> SigResult<ResolvedType> {
        Ok(ResolvedType {
            converters: vec![self.element(name, element)?],
            tag,
            alias,
            arity: 1,
            multiple: true,
            optional,
            flag: false,
        })
    }

    /// Converter for one element of a tuple or collection.
    fn element(&self, name: &str, element: Annotation) -> SigResult<Converter> {
        let Unwrapped {
            annotation,
            alias,
            optional,
        } = self.unwrap(name, element)?;
        if optional {
            return Err(self.error(name, "container elements cannot be optional"));
        }
        match annotation {
            Annotation::Type(tag) if !tag.is_container() && tag != TypeTag::None => {
                let key = alias.as_ref().unwrap_or(&tag);
                if self.registry.composite(key).is_some() {
                    return Err(self.error(
                        name,
                        format!("composite type {key} cannot be a container element"),
                    ));
                }
                Ok(self.converter(alias.as_ref(), &tag))
            }
            other => Err(self.error(
                name,
                format!("container elements must be scalar types, found {other:?}"),
            )),
        }
    }

    /// Follows names, optionals, unions and new types to a concrete shape.
    fn unwrap(&self, name: &str, mut annotation: Annotation) -> SigResult<Unwrapped> {
        let mut alias = None;
        let mut optional = false;
        let mut depth = 0;
        loop {
            depth += 1;
            if depth > MAX_NAME_DEPTH {
                return Err(self.error(name, "type names form a cycle"));
            }
            annotation = match annotation {
                Annotation::Named(type_name) => self.lookup(name, &type_name)?,
                Annotation::Optional(inner) => {
                    optional = true;
                    *inner
                }
                Annotation::Union(alternatives) => {
                    let mut non_null = Vec::new();
                    for alternative in alternatives {
                        match self.deref_names(name, alternative)? {
                            Annotation::Type(TypeTag::None) => optional = true,
                            other => non_null.push(other),
                        }
                    }
                    let mut rest = non_null.into_iter();
                    match (rest.next(), rest.next()) {
                        (Some(single), None) => single,
                        (None, _) => {
                            return Err(self.error(name, "a union needs a non-null alternative"));
                        }
                        (Some(_), Some(_)) => {
                            return Err(self.error(
                                name,
                                "unions of more than one non-null type are not supported",
                            ));
                        }
                    }
                }
                Annotation::NewType {
                    name: type_name,
                    base,
                } => {
                    alias.get_or_insert_with(|| TypeTag::custom(type_name));
                    *base
                }
                concrete => {
                    return Ok(Unwrapped {
                        annotation: concrete,
                        alias,
                        optional,
                    });
                }
            };
        }
    }

    fn deref_names(&self, name: &str, mut annotation: Annotation) -> SigResult<Annotation> {
        for _ in 0..MAX_NAME_DEPTH {
            match annotation {
                Annotation::Named(type_name) => annotation = self.lookup(name, &type_name)?,
                other => return Ok(other),
            }
        }
        Err(self.error(name, "type names form a cycle"))
    }

    fn lookup(&self, name: &str, type_name: &str) -> SigResult<Annotation> {
        self.registry
            .lookup(type_name)
            .cloned()
            .ok_or_else(|| self.error(name, format!("unknown type name '{type_name}'")))
    }

    fn converter(&self, alias: Option<&TypeTag>, tag: &TypeTag) -> Converter {
        alias
            .and_then(|a| self.registry.conversion(a))
            .or_else(|| self.registry.conversion(tag))
            .cloned()
            .unwrap_or_else(|| Converter::passthrough(alias.unwrap_or(tag)))
    }

    fn error(&self, parameter: &str, message: impl Into<String>) -> SigError {
        SigError::signature(self.callable, parameter, message)
    }
}

/// Annotation matching the runtime shape of a default value.
fn inferred_annotation(default: &Value) -> Annotation {
    match default {
        Value::Tuple(items) => {
            Annotation::Tuple(items.iter().map(|item| Annotation::of(item.type_tag())).collect())
        }
        Value::List(items) => {
            let element = items.first().map_or(TypeTag::Str, Value::type_tag);
            Annotation::list(Annotation::of(element))
        }
        other => Annotation::of(other.type_tag()),
    }
}
