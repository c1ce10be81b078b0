//! Error types produced while building and invoking commands.

mod constructors;
mod helpers;
mod types;

pub use types::{SigError, ValidationError};

/// Convenience alias for results returned by `sigcli`.
pub type SigResult<T> = Result<T, SigError>;
