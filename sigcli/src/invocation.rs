//! The finished name→value mapping handed to a command's callback.

use std::collections::BTreeMap;

use crate::error::{SigError, SigResult};
use crate::value::{FromValue, Value};

/// Parsed values keyed by parameter name.
pub type ValueMap = BTreeMap<String, Value>;

/// Values produced by one parse, after conditionals, validations and
/// composite collapse have run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    values: ValueMap,
    extra_args: Vec<String>,
    extra_kwargs: ValueMap,
}

impl Invocation {
    /// Invocation holding `values` and no extras.
    #[must_use]
    pub fn new(values: ValueMap) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub(crate) fn with_extras(mut self, args: Vec<String>, kwargs: ValueMap) -> Self {
        self.extra_args = args;
        self.extra_kwargs = kwargs;
        self
    }

    /// Borrows the value stored for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// All named values.
    #[must_use]
    pub const fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Consumes the invocation, returning the named values.
    #[must_use]
    pub fn into_values(self) -> ValueMap {
        self.values
    }

    /// Removes the value for `name` and converts it to `T`.
    ///
    /// A missing entry is treated as [`Value::None`], so `Option<T>` fields
    /// extract as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Value`] when the value cannot be converted.
    pub fn take<T: FromValue>(&mut self, name: &str) -> SigResult<T> {
        let value = self.values.remove(name).unwrap_or_default();
        T::from_value(value).map_err(|source| SigError::Value {
            parameter: name.to_owned(),
            source,
        })
    }

    /// Extra positional tokens accepted by a var-positional parameter.
    #[must_use]
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    /// Moves the extra positional tokens out.
    pub fn take_extra_args(&mut self) -> Vec<String> {
        std::mem::take(&mut self.extra_args)
    }

    /// Unrecognised options accepted by a var-keyword parameter.
    #[must_use]
    pub const fn extra_kwargs(&self) -> &ValueMap {
        &self.extra_kwargs
    }

    /// Moves the unrecognised options out.
    pub fn take_extra_kwargs(&mut self) -> ValueMap {
        std::mem::take(&mut self.extra_kwargs)
    }
}
