//! Engine-independent description of one generated option or positional.

use std::fmt;

use serde::Serialize;

use crate::registry::Converter;
use crate::signature::TypeTag;
use crate::value::Value;

/// How a descriptor appears on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DescriptorKind {
    /// `--long VALUE`, optionally with `-s`.
    Option {
        /// Long name without the leading dashes.
        long: String,
        /// Single-character alias.
        short: Option<char>,
    },
    /// `--long/--negation` pair; `long` sets the parameter to `true`.
    Flag {
        /// Switch that sets the value to `true`.
        long: String,
        /// Single-character alias of `long`.
        short: Option<char>,
        /// Switch that sets the value to `false`.
        negation: String,
    },
    /// Positional argument.
    Positional,
}

/// Metadata of one CLI parameter.
#[derive(Clone, Serialize)]
pub struct Descriptor {
    /// Key of the parsed value, prefixed for composite sub-parameters.
    pub name: String,
    /// Parameter name as declared by its callable.
    pub param: String,
    /// Command-line form.
    #[serde(flatten)]
    pub kind: DescriptorKind,
    /// Resolved semantic type.
    pub type_tag: TypeTag,
    /// Tokens consumed by one occurrence.
    pub arity: usize,
    /// Whether repeated occurrences accumulate.
    pub multiple: bool,
    /// Whether a positional accepts any number of tokens.
    pub variadic: bool,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Whether the value is sensitive.
    pub hidden_input: bool,
    /// Default as typed on the command line; absent for sensitive values.
    pub default_display: Option<String>,
    /// Help text.
    pub help: Option<String>,
    #[serde(skip)]
    pub(crate) converters: Vec<Converter>,
    #[serde(skip)]
    pub(crate) default: Option<Value>,
}

impl Descriptor {
    /// Returns `true` for boolean flags.
    #[must_use]
    pub const fn is_flag(&self) -> bool {
        matches!(self.kind, DescriptorKind::Flag { .. })
    }

    /// Returns `true` when each occurrence yields a tuple, even of one value.
    #[must_use]
    pub const fn is_tuple(&self) -> bool {
        matches!(self.type_tag, TypeTag::Tuple)
    }

    /// Returns `true` for options and flags.
    #[must_use]
    pub const fn is_option(&self) -> bool {
        !matches!(self.kind, DescriptorKind::Positional)
    }

    /// Long name of an option or flag.
    #[must_use]
    pub fn long(&self) -> Option<&str> {
        match &self.kind {
            DescriptorKind::Option { long, .. } | DescriptorKind::Flag { long, .. } => Some(long),
            DescriptorKind::Positional => None,
        }
    }

    /// Short alias of an option or flag.
    #[must_use]
    pub const fn short(&self) -> Option<char> {
        match &self.kind {
            DescriptorKind::Option { short, .. } | DescriptorKind::Flag { short, .. } => *short,
            DescriptorKind::Positional => None,
        }
    }

    /// Renders `value` for diagnostics, redacting sensitive parameters.
    pub(crate) const fn redact<'v>(&self, value: &'v Value) -> Redacted<'v> {
        Redacted {
            value,
            hidden: self.hidden_input,
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type_tag", &self.type_tag)
            .field("arity", &self.arity)
            .field("multiple", &self.multiple)
            .field("required", &self.required)
            .field("default", &self.default_display)
            .finish_non_exhaustive()
    }
}

pub(crate) struct Redacted<'v> {
    value: &'v Value,
    hidden: bool,
}

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hidden {
            f.write_str("<hidden>")
        } else {
            write!(f, "{:?}", self.value)
        }
    }
}
