//! Explicit description of a callable's parameters.
//!
//! A [`Signature`] replaces run-time reflection: it lists each parameter's
//! name, kind, declared [`Annotation`] and default, together with the
//! [`Docs`] that supply help text. Signatures are usually generated by
//! `#[derive(Parameters)]`, but can be written by hand:
//!
//! ```
//! use sigcli::{Annotation, Docs, Parameter, Signature, TypeTag, Value};
//!
//! let sig = Signature::new("greet")
//!     .param(Parameter::new("name").annotated(Annotation::of(TypeTag::Str)))
//!     .param(Parameter::new("count").default(Value::Int(1)))
//!     .docs(Docs::new().description("Say hello.").param("name", "Who to greet"));
//! assert_eq!(sig.params().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SigResult;
use crate::invocation::Invocation;
use crate::value::{Value, ValueError};

/// Closed set of semantic types a parameter can resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// Text.
    Str,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean; parameters of this type become flags.
    Bool,
    /// Filesystem path.
    Path,
    /// Ordered collection accepting repeated values.
    List,
    /// Unordered collection accepting repeated values.
    Set,
    /// Fixed-size group of values.
    Tuple,
    /// The null type, only meaningful inside unions.
    None,
    /// Extension point keyed by a stable type name.
    Custom(String),
}

impl TypeTag {
    /// Custom tag for the given type name.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Returns `true` for non-string collection types.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Tuple)
    }

    /// Display name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Path => "path",
            Self::List => "list",
            Self::Set => "set",
            Self::Tuple => "tuple",
            Self::None => "none",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parameter's declared type, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    /// No type was declared.
    Missing,
    /// A concrete semantic type.
    Type(TypeTag),
    /// A type referenced by name, resolved against the registry.
    Named(String),
    /// The type or nothing.
    Optional(Box<Self>),
    /// One of several types; only `T | None` is supported.
    Union(Vec<Self>),
    /// A distinct type backed by `base`.
    NewType {
        /// Identity used for conversion and validation lookups.
        name: String,
        /// Underlying type driving arity and flag decisions.
        base: Box<Self>,
    },
    /// Fixed-length tuple with explicit element types.
    Tuple(Vec<Self>),
    /// Ordered collection of the element type.
    List(Box<Self>),
    /// Unordered collection of the element type.
    Set(Box<Self>),
}

impl Annotation {
    /// Annotation for a concrete type.
    #[must_use]
    pub const fn of(tag: TypeTag) -> Self {
        Self::Type(tag)
    }

    /// Forward reference by type name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// `Optional[inner]`.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// `List[inner]`.
    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// `Set[inner]`.
    #[must_use]
    pub fn set(inner: Self) -> Self {
        Self::Set(Box::new(inner))
    }

    /// New type `name` over `base`.
    #[must_use]
    pub fn new_type(name: impl Into<String>, base: Self) -> Self {
        Self::NewType {
            name: name.into(),
            base: Box::new(base),
        }
    }
}

impl From<TypeTag> for Annotation {
    fn from(tag: TypeTag) -> Self {
        Self::Type(tag)
    }
}

/// How a parameter participates in the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Implicit receiver of a method; never exposed on the command line.
    Receiver,
    /// Ordinary named parameter.
    Regular,
    /// Catch-all for extra positional arguments.
    VarPositional,
    /// Catch-all for extra named options.
    VarKeyword,
}

/// One declared parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    annotation: Annotation,
    default: Option<Value>,
    invalid_default: Option<ValueError>,
}

impl Parameter {
    /// Regular parameter without annotation or default.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Regular,
            annotation: Annotation::Missing,
            default: None,
            invalid_default: None,
        }
    }

    /// Method receiver, skipped when building the command.
    #[must_use]
    pub fn receiver() -> Self {
        Self {
            kind: ParamKind::Receiver,
            ..Self::new("self")
        }
    }

    /// Catch-all for extra positional arguments.
    #[must_use]
    pub fn var_args(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::VarPositional,
            ..Self::new(name)
        }
    }

    /// Catch-all for unrecognised options.
    #[must_use]
    pub fn var_kwargs(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::VarKeyword,
            ..Self::new(name)
        }
    }

    /// Sets the declared annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotation = annotation.into();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets a default produced by a fallible conversion.
    ///
    /// A failed conversion is kept and reported when the command is built.
    #[must_use]
    pub fn try_default(mut self, converted: Result<Value, ValueError>) -> Self {
        match converted {
            Ok(value) => {
                self.default = Some(value);
                self.invalid_default = None;
            }
            Err(err) => {
                self.default = None;
                self.invalid_default = Some(err);
            }
        }
        self
    }

    /// Parameter name as declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Declared annotation.
    #[must_use]
    pub const fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Declared default, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Conversion failure recorded by [`Parameter::try_default`].
    #[must_use]
    pub const fn invalid_default(&self) -> Option<&ValueError> {
        self.invalid_default.as_ref()
    }

    /// Returns `true` when the parameter has a usable default.
    ///
    /// A default of [`Value::None`] does not count.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.as_ref().is_some_and(|v| !v.is_none())
    }
}

/// Documentation extracted for a callable.
///
/// Missing documentation is not an error; every field degrades to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Docs {
    description: Option<String>,
    params: BTreeMap<String, String>,
}

impl Docs {
    /// Empty documentation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overall description; blank text is ignored.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        let description: String = text.into();
        if !description.trim().is_empty() {
            self.description = Some(description);
        }
        self
    }

    /// Adds help text for one parameter; blank text is ignored.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let help: String = text.into();
        if !help.trim().is_empty() {
            self.params.insert(name.into(), help);
        }
        self
    }

    /// Overall description.
    #[must_use]
    pub fn about(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Help text for `name`.
    #[must_use]
    pub fn help_for(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered parameter list and documentation of one callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    params: Vec<Parameter>,
    docs: Docs,
}

impl Signature {
    /// Empty signature for the callable `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            docs: Docs::default(),
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Replaces the documentation.
    #[must_use]
    pub fn docs(mut self, docs: Docs) -> Self {
        self.docs = docs;
        self
    }

    /// Callable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Documentation for the callable.
    #[must_use]
    pub const fn documentation(&self) -> &Docs {
        &self.docs
    }
}

/// Types whose fields form a callable's parameter list.
///
/// Implemented by `#[derive(Parameters)]`; the struct's fields become the
/// parameters and its doc comments the help text.
pub trait Parameters: Sized {
    /// Describes the parameters.
    fn signature() -> Signature;

    /// Rebuilds the struct from a finished invocation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SigError::Value`] when a value cannot be converted to
    /// the field's type.
    fn from_invocation(invocation: &mut Invocation) -> SigResult<Self>;
}
