//! Configuration accepted when declaring a command or a composite type.
//!
//! [`CommandOptions`] and [`CompositeOptions`] share the per-parameter
//! settings in [`ParamOptions`]. Those settings are plain data and can be
//! layered from configuration providers; conditionals and validations hold
//! closures and are attached through builder methods.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use figment::Figment;
use figment::providers::Serialized;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{SigError, SigResult, ValidationError};
use crate::invocation::ValueMap;
use crate::signature::Annotation;

/// Names of the parameters passed to a conditional or validation.
pub type Group = Vec<String>;

/// Rewrites parsed values; returned entries are merged back.
pub type Conditional = Arc<dyn Fn(&ValueMap) -> ValueMap + Send + Sync>;

/// Rejects parsed values by returning an error.
pub type Validation = Arc<dyn Fn(&ValueMap) -> Result<(), ValidationError> + Send + Sync>;

/// Functions attached to parameter groups, in registration order.
pub(crate) struct Grouped<F> {
    entries: Vec<(Group, Vec<F>)>,
}

impl<F> Default for Grouped<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: Clone> Clone for Grouped<F> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<F> Grouped<F> {
    pub(crate) fn push(&mut self, group: Group, f: F) {
        if let Some((_, fns)) = self.entries.iter_mut().find(|(g, _)| *g == group) {
            fns.push(f);
        } else {
            self.entries.push((group, vec![f]));
        }
    }

    pub(crate) fn contains(&self, group: &[String]) -> bool {
        self.entries.iter().any(|(g, _)| g.as_slice() == group)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Group, &[F])> {
        self.entries.iter().map(|(g, fns)| (g, fns.as_slice()))
    }

    pub(crate) fn groups(&self) -> Vec<Group> {
        self.entries.iter().map(|(g, _)| g.clone()).collect()
    }
}

/// Conditionals and validations keyed by parameter group.
#[derive(Clone, Default)]
pub(crate) struct Hooks {
    pub(crate) conditionals: Grouped<Conditional>,
    pub(crate) validations: Grouped<Validation>,
}

impl Hooks {
    /// Runs conditionals, then validations, against `values`.
    pub(crate) fn run(&self, values: &mut ValueMap) -> SigResult<()> {
        for (group, fns) in self.conditionals.iter() {
            for conditional in fns {
                let updates = conditional(&select(group, values));
                if !updates.is_empty() {
                    trace!(
                        ?group,
                        updated = ?updates.keys().collect::<Vec<_>>(),
                        "conditional applied"
                    );
                    values.extend(updates);
                }
            }
        }
        self.validations.validate(values)
    }

    /// Rejects groups naming parameters for which `known` is false.
    pub(crate) fn check_groups(
        &self,
        callable: &str,
        known: impl Fn(&str) -> bool,
    ) -> SigResult<()> {
        let groups = self.conditionals.groups();
        let mut names = groups
            .iter()
            .chain(self.validations.groups().iter())
            .flatten()
            .cloned()
            .collect::<Vec<_>>();
        names.retain(|name| !known(name));
        names.first().map_or(Ok(()), |name| {
            Err(SigError::signature(
                callable,
                name.as_str(),
                "conditional or validation group names an unknown parameter",
            ))
        })
    }
}

impl Grouped<Validation> {
    /// Runs every validation; the first failure aborts.
    pub(crate) fn validate(&self, values: &ValueMap) -> SigResult<()> {
        for (group, fns) in self.iter() {
            for validation in fns {
                validation(&select(group, values)).map_err(|err| match group.as_slice() {
                    [only] => err.for_parameter(only.as_str()),
                    _ => err,
                })?;
            }
        }
        Ok(())
    }
}

fn select(group: &[String], values: &ValueMap) -> ValueMap {
    group
        .iter()
        .map(|name| (name.clone(), values.get(name).cloned().unwrap_or_default()))
        .collect()
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("conditionals", &self.conditionals.groups())
            .field("validations", &self.validations.groups())
            .finish()
    }
}

fn into_group<G, S>(group: G) -> Group
where
    G: IntoIterator<Item = S>,
    S: Into<String>,
{
    group.into_iter().map(Into::into).collect()
}

/// Settings that govern how parameters become options and positionals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamOptions {
    /// Explicit single-character aliases keyed by parameter name.
    pub short_names: BTreeMap<String, char>,
    /// Annotation overrides keyed by parameter name.
    pub types: BTreeMap<String, Annotation>,
    /// Parameters that must be supplied even when they have a default.
    pub required: BTreeSet<String>,
    /// Sensitive parameters whose values are never echoed.
    pub hidden: BTreeSet<String>,
    /// Keep `_` in long option names instead of rendering `-`.
    pub keep_underscores: bool,
    /// Render every simple parameter as an option.
    pub positionals_as_options: bool,
    /// Derive short aliases from parameter names.
    pub infer_short_names: bool,
    /// Append defaults to generated help.
    pub show_defaults: bool,
    /// Parameters to place first, in this order.
    pub option_order: Vec<String>,
    /// Short aliases that must not be inferred.
    pub exclude_short_names: BTreeSet<char>,
}

impl Default for ParamOptions {
    fn default() -> Self {
        Self {
            short_names: BTreeMap::new(),
            types: BTreeMap::new(),
            required: BTreeSet::new(),
            hidden: BTreeSet::new(),
            keep_underscores: false,
            positionals_as_options: false,
            infer_short_names: true,
            show_defaults: false,
            option_order: Vec::new(),
            exclude_short_names: BTreeSet::new(),
        }
    }
}

macro_rules! param_option_builders {
    ($ty:ty) => {
        impl $ty {
            /// Uses `short` as the alias of `param`.
            #[must_use]
            pub fn short_name(mut self, param: impl Into<String>, short: char) -> Self {
                self.params.short_names.insert(param.into(), short);
                self
            }

            /// Overrides the declared annotation of `param`.
            #[must_use]
            pub fn type_override(
                mut self,
                param: impl Into<String>,
                annotation: Annotation,
            ) -> Self {
                self.params.types.insert(param.into(), annotation);
                self
            }

            /// Marks `param` as required even if it has a default.
            #[must_use]
            pub fn required(mut self, param: impl Into<String>) -> Self {
                self.params.required.insert(param.into());
                self
            }

            /// Marks `param` as sensitive.
            #[must_use]
            pub fn hidden(mut self, param: impl Into<String>) -> Self {
                self.params.hidden.insert(param.into());
                self
            }

            /// Keeps `_` in long option names.
            #[must_use]
            pub const fn keep_underscores(mut self, keep: bool) -> Self {
                self.params.keep_underscores = keep;
                self
            }

            /// Renders every simple parameter as an option.
            #[must_use]
            pub const fn positionals_as_options(mut self, enabled: bool) -> Self {
                self.params.positionals_as_options = enabled;
                self
            }

            /// Enables or disables short alias inference.
            #[must_use]
            pub const fn infer_short_names(mut self, enabled: bool) -> Self {
                self.params.infer_short_names = enabled;
                self
            }

            /// Shows default values in help.
            #[must_use]
            pub const fn show_defaults(mut self, enabled: bool) -> Self {
                self.params.show_defaults = enabled;
                self
            }

            /// Places the named parameters first, in this order.
            #[must_use]
            pub fn option_order<I, S>(mut self, order: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.params.option_order = order.into_iter().map(Into::into).collect();
                self
            }

            /// Reserves short aliases so they are never inferred.
            #[must_use]
            pub fn exclude_short_names<I: IntoIterator<Item = char>>(mut self, shorts: I) -> Self {
                self.params.exclude_short_names.extend(shorts);
                self
            }

            /// Attaches a conditional to the parameter group.
            #[must_use]
            pub fn conditional<G, S, F>(mut self, group: G, f: F) -> Self
            where
                G: IntoIterator<Item = S>,
                S: Into<String>,
                F: Fn(&ValueMap) -> ValueMap + Send + Sync + 'static,
            {
                self.hooks.conditionals.push(into_group(group), Arc::new(f));
                self
            }

            /// Attaches a validation to the parameter group.
            #[must_use]
            pub fn validation<G, S, F>(mut self, group: G, f: F) -> Self
            where
                G: IntoIterator<Item = S>,
                S: Into<String>,
                F: Fn(&ValueMap) -> Result<(), ValidationError> + Send + Sync + 'static,
            {
                self.hooks.validations.push(into_group(group), Arc::new(f));
                self
            }

            /// Per-parameter settings.
            #[must_use]
            pub const fn params(&self) -> &ParamOptions {
                &self.params
            }
        }
    };
}

/// Configuration of a command declaration.
///
/// ```
/// use sigcli::CommandOptions;
///
/// let options = CommandOptions::new()
///     .name("greet")
///     .short_name("name", 'n')
///     .show_defaults(true);
/// assert_eq!(options.params().short_names.get("name"), Some(&'n'));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandOptions {
    name: Option<String>,
    #[serde(flatten)]
    params: ParamOptions,
    #[serde(skip)]
    hooks: Hooks,
}

impl CommandOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the command name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Explicit command name, if set.
    #[must_use]
    pub fn command_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Extracts options from `figment` on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SigError::Options`] when extraction fails.
    pub fn from_figment(figment: &Figment) -> SigResult<Self> {
        Self::default().merge_from(figment)
    }

    /// Layers values from `figment` over these options.
    ///
    /// Keys match the field names of [`ParamOptions`] plus `name`. Attached
    /// conditionals and validations are preserved.
    ///
    /// ```
    /// use figment::{Figment, Jail, providers::Env};
    /// use sigcli::CommandOptions;
    ///
    /// Jail::expect_with(|jail| {
    ///     jail.set_env("DEMO_SHOW_DEFAULTS", "true");
    ///     let figment = Figment::new().merge(Env::prefixed("DEMO_"));
    ///     let options = CommandOptions::new().merge_from(&figment).expect("options");
    ///     assert!(options.params().show_defaults);
    ///     Ok(())
    /// });
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`crate::SigError::Options`] when a provider holds values of
    /// the wrong shape.
    pub fn merge_from(self, figment: &Figment) -> SigResult<Self> {
        let Self {
            name,
            params,
            hooks,
        } = self;
        let layered: LayeredOptions = Figment::from(Serialized::defaults(LayeredOptions {
            name,
            params,
        }))
        .merge(figment.clone())
        .extract()?;
        Ok(Self {
            name: layered.name,
            params: layered.params,
            hooks,
        })
    }

    pub(crate) fn into_parts(self) -> (Option<String>, ParamOptions, Hooks) {
        (self.name, self.params, self.hooks)
    }
}

#[derive(Serialize, Deserialize)]
struct LayeredOptions {
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    params: ParamOptions,
}

param_option_builders!(CommandOptions);

/// Configuration supplied when registering a composite type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeOptions {
    #[serde(flatten)]
    params: ParamOptions,
    #[serde(skip)]
    hooks: Hooks,
}

impl CompositeOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn hooks(&self) -> &Hooks {
        &self.hooks
    }
}

param_option_builders!(CompositeOptions);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use anyhow::{Result, ensure};
    use figment::Jail;
    use figment::providers::{Env, Format, Toml};
    use rstest::rstest;

    #[rstest]
    fn defaults_match_declared_behaviour() {
        let options = ParamOptions::default();
        assert!(options.infer_short_names);
        assert!(!options.keep_underscores);
        assert!(!options.positionals_as_options);
    }

    #[rstest]
    fn groups_accumulate_functions_in_order() {
        let options = CommandOptions::new()
            .conditional(["a"], |_| ValueMap::new())
            .conditional(["a"], |_| ValueMap::new())
            .validation(["a", "b"], |_| Ok(()));
        let conditionals: Vec<_> = options.hooks.conditionals.iter().collect();
        assert_eq!(conditionals.len(), 1);
        assert_eq!(conditionals.first().map(|(_, fns)| fns.len()), Some(2));
        assert!(options.hooks.validations.contains(&["a".into(), "b".into()]));
    }

    #[rstest]
    fn merge_from_layers_file_and_env() -> Result<()> {
        let mut outcome = Ok(());
        Jail::expect_with(|jail| {
            jail.create_file("cli.toml", "keep_underscores = true\nname = \"renamed\"")?;
            jail.set_env("APP_SHOW_DEFAULTS", "true");
            let figment = Figment::new()
                .merge(Toml::file("cli.toml"))
                .merge(Env::prefixed("APP_"));
            outcome = CommandOptions::new()
                .validation(["x"], |_| Ok(()))
                .merge_from(&figment)
                .map_err(anyhow::Error::from)
                .and_then(|options| {
                    ensure!(options.params.keep_underscores, "file layer ignored");
                    ensure!(options.params.show_defaults, "env layer ignored");
                    ensure!(options.command_name() == Some("renamed"), "name not layered");
                    ensure!(options.hooks.validations.contains(&["x".into()]), "hooks lost");
                    Ok(())
                });
            Ok(())
        });
        outcome
    }

    #[rstest]
    fn conditional_receives_group_values() {
        let options = CompositeOptions::new().conditional(["n"], |values| {
            let mut out = ValueMap::new();
            if values.get("n") == Some(&Value::Int(0)) {
                out.insert("n".into(), Value::Int(1));
            }
            out
        });
        let (_, fns) = options
            .hooks()
            .conditionals
            .iter()
            .next()
            .expect("conditional registered");
        let mut values = ValueMap::new();
        values.insert("n".into(), Value::Int(0));
        let updates = fns.first().map(|f| f(&values)).unwrap_or_default();
        assert_eq!(updates.get("n"), Some(&Value::Int(1)));
    }
}
