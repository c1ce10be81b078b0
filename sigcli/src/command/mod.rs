//! Command assembly and the built, reusable command.
//!
//! A [`CommandBuilder`] collects the signature, callback, options and
//! registry. [`CommandBuilder::build`] consumes it and returns an immutable
//! [`Command`] that can be invoked any number of times.
//!
//! ```
//! use sigcli::{Annotation, CommandBuilder, Parameter, Signature, TypeTag, Value};
//!
//! let sig = Signature::new("add")
//!     .param(Parameter::new("a").annotated(TypeTag::Int))
//!     .param(Parameter::new("b").default(Value::Int(10)));
//! let cmd = CommandBuilder::new(sig, |mut inv| {
//!     let a: i64 = inv.take("a").unwrap_or_default();
//!     let b: i64 = inv.take("b").unwrap_or_default();
//!     a + b
//! })
//! .build()
//! .expect("valid signature");
//! assert_eq!(cmd.run_from(["add", "1", "--b", "2"]).ok(), Some(3));
//! assert_eq!(cmd.run_from(["add", "1"]).ok(), Some(11));
//! ```

mod clap_args;
mod invoke;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

pub use crate::build::composite::CompositeSummary;

use crate::build::composite::CompositeSlot;
use crate::build::{BuildContext, Descriptor, ParamBuilder};
use crate::error::SigResult;
use crate::invocation::Invocation;
use crate::options::{CommandOptions, Group, Hooks};
use crate::registry::{self, Registry};
use crate::signature::{Parameters, Signature};

type Callback<T> = Arc<dyn Fn(Invocation) -> SigResult<T> + Send + Sync>;

/// Serialisable description of a built command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDescriptor {
    /// Command name.
    pub name: String,
    /// Description from the callable's docs.
    pub about: Option<String>,
    /// Descriptors in presentation order.
    pub params: Vec<Descriptor>,
    /// Whether extra positional arguments are collected.
    pub allow_extra_args: bool,
    /// Whether unknown options are collected instead of rejected.
    pub allow_unknown_options: bool,
    /// Parameter groups with conditionals.
    pub conditional_groups: Vec<Group>,
    /// Parameter groups with validations.
    pub validation_groups: Vec<Group>,
    /// Composite parameters.
    pub composites: Vec<CompositeSummary>,
}

/// Collects everything needed to build a [`Command`].
#[must_use]
pub struct CommandBuilder<T> {
    signature: Signature,
    callback: Callback<T>,
    options: CommandOptions,
    registry: Option<Registry>,
}

/// Builder for a command whose callback receives the derived struct `P`.
///
/// ```
/// use sigcli::Parameters;
///
/// /// Greets someone.
/// #[derive(Parameters)]
/// struct Greet {
///     /// Who to greet.
///     name: String,
///     #[sigcli(default = 1)]
///     times: u32,
/// }
///
/// let cmd = sigcli::command(|g: Greet| format!("{} x{}", g.name, g.times))
///     .build()
///     .expect("valid signature");
/// assert_eq!(cmd.run_from(["greet", "Ada"]).ok().as_deref(), Some("Ada x1"));
/// ```
pub fn command<P, T, F>(callback: F) -> CommandBuilder<T>
where
    P: Parameters,
    F: Fn(P) -> T + Send + Sync + 'static,
{
    CommandBuilder::for_parameters(callback)
}

impl<T> CommandBuilder<T> {
    /// Builder calling `callback` with each finished invocation.
    pub fn new<F>(signature: Signature, callback: F) -> Self
    where
        F: Fn(Invocation) -> T + Send + Sync + 'static,
    {
        Self::with_callback(signature, Arc::new(move |invocation| Ok(callback(invocation))))
    }

    /// Builder whose callback receives `P` rebuilt from the invocation.
    pub fn for_parameters<P, F>(callback: F) -> Self
    where
        P: Parameters,
        F: Fn(P) -> T + Send + Sync + 'static,
    {
        Self::with_callback(
            P::signature(),
            Arc::new(move |mut invocation| P::from_invocation(&mut invocation).map(&callback)),
        )
    }

    fn with_callback(signature: Signature, callback: Callback<T>) -> Self {
        Self {
            signature,
            callback,
            options: CommandOptions::default(),
            registry: None,
        }
    }

    /// Replaces the command options.
    pub fn options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds against `registry` instead of the process-wide one.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Resolves every parameter and assembles the command.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SigError::Signature`] for unsupported annotations,
    /// [`crate::SigError::ParameterCollision`] when two parameters claim the
    /// same name and [`crate::SigError::ShortNameExhausted`] when no short
    /// alias is left to infer.
    pub fn build(self) -> SigResult<Command<T>> {
        let Self {
            signature,
            callback,
            options,
            registry: explicit_registry,
        } = self;
        let registry = explicit_registry.unwrap_or_else(registry::global);
        let (name, params, mut hooks) = options.into_parts();

        let mut ctx = BuildContext::default();
        let built = ParamBuilder::new(&registry, &params, &hooks).build(&signature, &mut ctx)?;
        for (group, fns) in built.validations.iter() {
            for validation in fns {
                hooks.validations.push(group.clone(), Arc::clone(validation));
            }
        }

        let descriptor = CommandDescriptor {
            name: name.unwrap_or_else(|| command_name(signature.name())),
            about: signature.documentation().about().map(str::to_owned),
            params: built.descriptors,
            allow_extra_args: built.var_args.is_some(),
            allow_unknown_options: built.var_kwargs.is_some(),
            conditional_groups: hooks.conditionals.groups(),
            validation_groups: hooks.validations.groups(),
            composites: built.composites.iter().map(CompositeSlot::summary).collect(),
        };
        let clap = clap_args::clap_command(&descriptor);
        debug!(
            command = %descriptor.name,
            params = descriptor.params.len(),
            composites = descriptor.composites.len(),
            "built command"
        );
        Ok(Command {
            descriptor,
            composites: built.composites,
            hooks,
            clap,
            callback,
        })
    }
}

/// A built command, immutable and reusable across invocations.
pub struct Command<T> {
    descriptor: CommandDescriptor,
    composites: Vec<CompositeSlot>,
    hooks: Hooks,
    clap: clap::Command,
    callback: Callback<T>,
}

impl<T> Command<T> {
    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Metadata describing the generated interface.
    #[must_use]
    pub const fn describe(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    /// The clap command used for parsing, e.g. to render help.
    #[must_use]
    pub const fn clap_command(&self) -> &clap::Command {
        &self.clap
    }
}

/// Command name derived from a callable name: lowercase, `_` becomes `-`.
fn command_name(callable: &str) -> String {
    callable.to_lowercase().replace('_', "-")
}

impl<T> std::fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("descriptor", &self.descriptor)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
