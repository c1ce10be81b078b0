//! Turns a signature into descriptors.
//!
//! [`ParamBuilder`] walks one callable's parameters and emits a
//! [`Descriptor`] for each simple parameter, delegating composite-typed
//! parameters to [`composite`]. A single [`BuildContext`] is threaded through
//! a command and all of its composites so names never collide across them.

pub(crate) mod composite;
mod descriptor;
mod short_names;

use std::collections::BTreeSet;

use tracing::trace;

pub use descriptor::{Descriptor, DescriptorKind};

use self::composite::CompositeSlot;
use self::short_names::ShortNames;
use crate::error::{SigError, SigResult};
use crate::invocation::ValueMap;
use crate::options::{Grouped, Hooks, ParamOptions, Validation};
use crate::registry::{Registry, ValueCheck};
use crate::resolve::{ResolvedType, TypeResolver};
use crate::signature::{ParamKind, Parameter, Signature};
use crate::value::Value;

/// Names claimed while building one command.
#[derive(Debug, Clone)]
pub(crate) struct BuildContext {
    shorts: ShortNames,
    longs: BTreeSet<String>,
    keys: BTreeSet<String>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            shorts: ShortNames::default(),
            longs: BTreeSet::from(["help".to_owned()]),
            keys: BTreeSet::new(),
        }
    }
}

impl BuildContext {
    fn claim_long(&mut self, parameter: &str, long: &str) -> SigResult<()> {
        if self.longs.insert(long.to_owned()) {
            Ok(())
        } else {
            Err(SigError::collision(parameter, format!("--{long}")))
        }
    }

    fn claim_key(&mut self, parameter: &str, key: &str) -> SigResult<()> {
        if self.keys.insert(key.to_owned()) {
            Ok(())
        } else {
            Err(SigError::collision(parameter, key))
        }
    }
}

/// Everything produced for one callable's parameter list.
#[derive(Default)]
pub(crate) struct BuiltParams {
    pub(crate) descriptors: Vec<Descriptor>,
    pub(crate) composites: Vec<CompositeSlot>,
    /// Registry validations attached per parameter.
    pub(crate) validations: Grouped<Validation>,
    pub(crate) var_args: Option<String>,
    pub(crate) var_kwargs: Option<String>,
}

/// Builds descriptors for the parameters of one callable.
pub(crate) struct ParamBuilder<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) options: &'a ParamOptions,
    pub(crate) hooks: &'a Hooks,
    /// Owning parameter when building a composite's sub-parameters.
    pub(crate) prefix: Option<&'a str>,
    pub(crate) keep_underscores: bool,
}

impl<'a> ParamBuilder<'a> {
    pub(crate) const fn new(registry: &'a Registry, options: &'a ParamOptions, hooks: &'a Hooks) -> Self {
        Self {
            registry,
            options,
            hooks,
            prefix: None,
            keep_underscores: options.keep_underscores,
        }
    }

    pub(crate) fn build(
        &self,
        signature: &Signature,
        ctx: &mut BuildContext,
    ) -> SigResult<BuiltParams> {
        let callable = signature.name();
        ctx.shorts.exclude(self.options.exclude_short_names.iter().copied());

        let mut built = BuiltParams::default();
        let mut regular = Vec::new();
        for param in signature.params() {
            match param.kind() {
                ParamKind::Receiver => {}
                ParamKind::Regular => {
                    if let Some(err) = param.invalid_default() {
                        return Err(SigError::Value {
                            parameter: param.name().to_owned(),
                            source: err.clone(),
                        });
                    }
                    regular.push(param);
                }
                ParamKind::VarPositional | ParamKind::VarKeyword if self.prefix.is_some() => {
                    return Err(SigError::signature(
                        callable,
                        param.name(),
                        "composite parameters cannot be variadic",
                    ));
                }
                ParamKind::VarPositional => built.var_args = Some(param.name().to_owned()),
                ParamKind::VarKeyword => built.var_kwargs = Some(param.name().to_owned()),
            }
        }
        self.check_option_names(callable, &regular)?;
        let ordered = self.ordered(callable, regular)?;

        let resolver = TypeResolver::new(self.registry, callable);
        let resolved = ordered
            .into_iter()
            .map(|param| {
                let over = self.options.types.get(param.name());
                resolver.resolve(param, over).map(|r| (param, r))
            })
            .collect::<SigResult<Vec<_>>>()?;

        let explicit = self.claim_explicit_shorts(callable, &resolved, ctx)?;

        for ((param, resolved), short) in resolved.into_iter().zip(explicit) {
            if let Some(descriptor) = self.registry.composite(resolved.match_key()) {
                if self.prefix.is_some() {
                    return Err(SigError::signature(
                        callable,
                        param.name(),
                        format!(
                            "composite {} cannot be nested in another composite",
                            resolved.match_key()
                        ),
                    ));
                }
                let (descriptors, slot) =
                    composite::expand(self, ctx, param.name(), &resolved, descriptor)?;
                built.descriptors.extend(descriptors);
                built.composites.push(slot);
                continue;
            }
            let descriptor = self.simple(signature, ctx, param, &resolved, short)?;
            self.attach_registry_validations(&descriptor, &resolved, &mut built.validations);
            built.descriptors.push(descriptor);
        }

        self.check_positionals(callable, &built)?;
        let keys: BTreeSet<&str> = built.descriptors.iter().map(|d| self.hook_key(d)).collect();
        self.hooks.check_groups(callable, |name| keys.contains(name))?;
        Ok(built)
    }

    /// Name by which hooks of this callable refer to `descriptor`.
    fn hook_key<'d>(&self, descriptor: &'d Descriptor) -> &'d str {
        if self.prefix.is_some() {
            &descriptor.param
        } else {
            &descriptor.name
        }
    }

    fn check_option_names(&self, callable: &str, regular: &[&Parameter]) -> SigResult<()> {
        let known = |name: &str| regular.iter().any(|p| p.name() == name);
        let configured = self
            .options
            .short_names
            .keys()
            .chain(self.options.types.keys())
            .chain(&self.options.required)
            .chain(&self.options.hidden)
            .chain(&self.options.option_order);
        for name in configured {
            if !known(name) {
                return Err(SigError::signature(
                    callable,
                    name.as_str(),
                    "options name a parameter that does not exist",
                ));
            }
        }
        Ok(())
    }

    /// Applies the explicit option order; unnamed parameters keep their
    /// declared order after the named ones.
    fn ordered<'p>(
        &self,
        callable: &str,
        regular: Vec<&'p Parameter>,
    ) -> SigResult<Vec<&'p Parameter>> {
        let order = &self.options.option_order;
        if order.is_empty() {
            return Ok(regular);
        }
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::with_capacity(regular.len());
        for name in order {
            if !seen.insert(name.as_str()) {
                return Err(SigError::signature(
                    callable,
                    name.as_str(),
                    "listed twice in option order",
                ));
            }
            if let Some(param) = regular.iter().find(|p| p.name() == name) {
                ordered.push(*param);
            }
        }
        ordered.extend(regular.into_iter().filter(|p| !seen.contains(p.name())));
        Ok(ordered)
    }

    fn is_option(&self, param: &Parameter, resolved: &ResolvedType) -> bool {
        param.has_default() || resolved.optional || self.options.positionals_as_options
    }

    /// Claims every user-supplied alias before any alias is inferred.
    fn claim_explicit_shorts(
        &self,
        callable: &str,
        resolved: &[(&Parameter, ResolvedType)],
        ctx: &mut BuildContext,
    ) -> SigResult<Vec<Option<char>>> {
        resolved
            .iter()
            .map(|(param, r)| {
                let Some(&short) = self.options.short_names.get(param.name()) else {
                    return Ok(None);
                };
                if self.registry.composite(r.match_key()).is_some() || !self.is_option(param, r) {
                    return Err(SigError::signature(
                        callable,
                        param.name(),
                        "short names apply only to options",
                    ));
                }
                ctx.shorts.claim_explicit(callable, param.name(), short).map(Some)
            })
            .collect()
    }

    fn simple(
        &self,
        signature: &Signature,
        ctx: &mut BuildContext,
        param: &Parameter,
        resolved: &ResolvedType,
        explicit_short: Option<char>,
    ) -> SigResult<Descriptor> {
        let name = param.name();
        let key = self
            .prefix
            .map_or_else(|| name.to_owned(), |prefix| format!("{prefix}_{name}"));
        ctx.claim_key(name, &key)?;

        let hidden = self.options.hidden.contains(name);
        let listed_required = self.options.required.contains(name);
        let mut default = param.default_value().filter(|v| !v.is_none()).cloned();
        if resolved.flag && default.is_none() && !resolved.optional {
            default = Some(Value::Bool(false));
        }
        let default_display = default
            .as_ref()
            .filter(|_| !hidden && param.has_default())
            .map(ToString::to_string);
        let mut help = signature.documentation().help_for(name).map(str::to_owned);
        if self.options.show_defaults
            && let Some(shown) = &default_display
        {
            let suffix = format!("[default: {shown}]");
            help = Some(help.map_or_else(|| suffix.clone(), |text| format!("{text} {suffix}")));
        }

        let (kind, required, variadic) = if self.is_option(param, resolved) {
            let long = if self.keep_underscores {
                key.clone()
            } else {
                key.replace('_', "-")
            };
            ctx.claim_long(name, &long)?;
            let short = match explicit_short {
                Some(short) => Some(short),
                None if self.options.infer_short_names => Some(ctx.shorts.infer(name)?),
                None => None,
            };
            let required = listed_required || (!param.has_default() && !resolved.optional);
            if resolved.flag {
                let sep = if self.keep_underscores { '_' } else { '-' };
                let negation_prefix = format!("no{sep}");
                let negation = match long.strip_prefix(&negation_prefix) {
                    Some(positive) if !positive.is_empty() => positive.to_owned(),
                    _ => format!("{negation_prefix}{long}"),
                };
                ctx.claim_long(name, &negation)?;
                let kind = DescriptorKind::Flag {
                    long,
                    short,
                    negation,
                };
                (kind, listed_required, false)
            } else {
                (DescriptorKind::Option { long, short }, required, false)
            }
        } else {
            let variadic = resolved.multiple;
            (DescriptorKind::Positional, listed_required || !variadic, variadic)
        };

        let descriptor = Descriptor {
            name: key,
            param: name.to_owned(),
            kind,
            type_tag: resolved.tag.clone(),
            arity: resolved.arity,
            multiple: resolved.multiple,
            variadic,
            required,
            hidden_input: hidden,
            default_display,
            help,
            converters: resolved.converters.clone(),
            default,
        };
        trace!(callable = signature.name(), ?descriptor, "built descriptor");
        Ok(descriptor)
    }

    fn attach_registry_validations(
        &self,
        descriptor: &Descriptor,
        resolved: &ResolvedType,
        validations: &mut Grouped<Validation>,
    ) {
        let group = vec![self.hook_key(descriptor).to_owned()];
        if self.hooks.validations.contains(&group) {
            return;
        }
        let checks = resolved
            .alias
            .as_ref()
            .map(|alias| self.registry.validations(alias))
            .filter(|found| !found.is_empty())
            .unwrap_or_else(|| self.registry.validations(&resolved.tag));
        for check in checks {
            let validation = value_validation(&descriptor.param, group.clone(), check);
            validations.push(group.clone(), validation);
        }
    }

    fn check_positionals(&self, callable: &str, built: &BuiltParams) -> SigResult<()> {
        let positionals: Vec<&Descriptor> = built
            .descriptors
            .iter()
            .filter(|d| !d.is_option())
            .collect();
        let Some((last, rest)) = positionals.split_last() else {
            return Ok(());
        };
        if let Some(early) = rest.iter().find(|d| d.variadic) {
            return Err(SigError::signature(
                callable,
                early.param.as_str(),
                "only the last positional may accept a variable number of values",
            ));
        }
        if last.variadic
            && let Some(extra) = &built.var_args
        {
            return Err(SigError::signature(
                callable,
                extra.as_str(),
                format!("cannot collect extra arguments after variadic '{}'", last.param),
            ));
        }
        Ok(())
    }
}

/// Adapts a single-value check to a group validation over `[key]`.
fn value_validation(param: &str, group: Vec<String>, check: &ValueCheck) -> Validation {
    let shared = ValueCheck::clone(check);
    let owner = param.to_owned();
    std::sync::Arc::new(move |values: &ValueMap| {
        let Some(key) = group.first() else {
            return Ok(());
        };
        match values.get(key) {
            None | Some(Value::None) => Ok(()),
            Some(value) => shared(value).map_err(|err| err.for_parameter(owner.as_str())),
        }
    })
}
