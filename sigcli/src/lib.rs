//! Derive command-line interfaces from parameter signatures.
//!
//! A callable's parameters are described by a [`Signature`], usually
//! generated with `#[derive(Parameters)]`. Building a command resolves each
//! parameter's annotation, default and docs into an option, flag or
//! positional, expands registered composite types into several prefixed
//! parameters and wires everything into a [`clap::Command`]. Invoking the
//! command parses arguments, runs conditionals and validations, rebuilds
//! composite values and hands the result to the callback.
//!
//! ```
//! use sigcli::{Parameters, ValidationError, Value};
//!
//! /// Adds two numbers.
//! #[derive(Parameters)]
//! struct Add {
//!     /// Left operand.
//!     left: i64,
//!     /// Right operand.
//!     #[sigcli(default = 1)]
//!     right: i64,
//! }
//!
//! let options = sigcli::CommandOptions::new().validation(["left"], |values| {
//!     match values.get("left") {
//!         Some(Value::Int(n)) if *n < 0 => Err(ValidationError::new("must not be negative")),
//!         _ => Ok(()),
//!     }
//! });
//! let cmd = sigcli::command(|add: Add| add.left + add.right)
//!     .options(options)
//!     .build()
//!     .expect("valid signature");
//!
//! assert_eq!(cmd.run_from(["add", "2", "--right", "3"]).ok(), Some(5));
//! assert!(cmd.run_from(["add", "-4"]).is_err());
//! ```

pub use sigcli_macros::Parameters;

mod build;
mod command;
mod error;
mod invocation;
mod options;
pub mod registry;
mod resolve;
mod signature;
mod value;

pub use build::{Descriptor, DescriptorKind};
pub use command::{Command, CommandBuilder, CommandDescriptor, CompositeSummary, command};
pub use error::{SigError, SigResult, ValidationError};
pub use invocation::{Invocation, ValueMap};
pub use options::{CommandOptions, CompositeOptions, Conditional, Group, ParamOptions, Validation};
pub use registry::{CompositeDescriptor, Registry, RegistryBuilder};
pub use resolve::{ResolvedType, TypeResolver};
pub use signature::{Annotation, Docs, ParamKind, Parameter, Parameters, Signature, TypeTag};
pub use value::{FromValue, Object, Value, ValueError, short_type_name};

pub use clap;
pub use figment;
