//! Primary error enum for command building and invocation flows.

use thiserror::Error;

use crate::value::ValueError;

/// Errors that can occur while building or invoking a command.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigError {
    /// A parameter's declared type cannot be turned into a CLI parameter.
    #[error("unsupported signature for parameter '{parameter}' of '{callable}': {message}")]
    Signature {
        /// Callable (command or composite) that owns the parameter.
        callable: String,
        /// Parameter whose annotation or configuration was rejected.
        parameter: String,
        /// Human-readable explanation.
        message: String,
    },

    /// Two parameters claim the same option name or short alias.
    #[error("option name '{name}' of parameter '{parameter}' is already claimed")]
    ParameterCollision {
        /// Parameter that attempted to claim the name.
        parameter: String,
        /// Rendered option name, e.g. `-a` or `--foo-a`.
        name: String,
    },

    /// Every ASCII letter is already claimed as a short alias.
    #[error("could not infer a short name for parameter '{parameter}'")]
    ShortNameExhausted {
        /// Parameter left without an alias.
        parameter: String,
    },

    /// A registered validation rejected parsed values.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Error parsing command-line arguments.
    #[error("Failed to parse command-line arguments: {0}")]
    CliParsing(#[from] Box<clap::Error>),

    /// A parsed value could not be turned into the requested Rust type.
    #[error("invalid value for '{parameter}': {source}")]
    Value {
        /// Parameter the value belongs to.
        parameter: String,
        /// Underlying conversion failure.
        #[source]
        source: ValueError,
    },

    /// Command options could not be extracted from configuration providers.
    #[error("Failed to load command options: {0}")]
    Options(#[from] Box<figment::Error>),
}

/// Raised by a validation function when an input violates a constraint.
///
/// ```
/// use sigcli::ValidationError;
///
/// let err = ValidationError::new("must not be negative").for_parameter("count");
/// assert_eq!(err.to_string(), "invalid value for 'count': must not be negative");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_validation(.parameter.as_deref(), .message))]
pub struct ValidationError {
    parameter: Option<String>,
    message: String,
}

fn render_validation(parameter: Option<&str>, message: &str) -> String {
    parameter.map_or_else(
        || message.to_owned(),
        |name| format!("invalid value for '{name}': {message}"),
    )
}

impl ValidationError {
    /// Creates a validation error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            parameter: None,
            message: message.into(),
        }
    }

    /// Attributes the failure to a parameter unless one is already recorded.
    #[must_use]
    pub fn for_parameter(mut self, parameter: impl Into<String>) -> Self {
        if self.parameter.is_none() {
            self.parameter = Some(parameter.into());
        }
        self
    }

    /// Parameter the failure was attributed to, if any.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// The validation message without parameter context.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
