//! Parsing, post-processing and dispatch of one invocation.

use std::collections::BTreeSet;
use std::ffi::OsString;

use clap::ArgMatches;
use clap::error::ErrorKind;
use tracing::{debug, trace};

use super::Command;
use super::clap_args::{EXTRA_ARGS, negation_id};
use crate::build::{Descriptor, DescriptorKind};
use crate::error::{SigError, SigResult};
use crate::invocation::{Invocation, ValueMap};
use crate::signature::TypeTag;
use crate::value::Value;

impl<T> Command<T> {
    /// Parses `args` and runs conditionals, validations and composite
    /// collapse, without calling the callback.
    ///
    /// The first item of `args` is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::CliParsing`] for malformed input,
    /// [`SigError::Validation`] when a validation rejects a value and
    /// [`SigError::Value`] when a composite cannot be constructed.
    pub fn parse_from<I, S>(&self, args: I) -> SigResult<Invocation>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let tokens: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let (known, extra_kwargs) = if self.descriptor.allow_unknown_options {
            self.split_unknown_options(tokens)
        } else {
            (tokens, ValueMap::new())
        };
        let matches = self.clap.clone().try_get_matches_from(known)?;
        let mut values = self.collect(&matches)?;
        trace!(command = %self.descriptor.name, "running conditionals and validations");
        self.hooks.run(&mut values)?;
        for composite in &self.composites {
            composite.collapse(&mut values)?;
        }
        let extra_args = if self.descriptor.allow_extra_args {
            matches
                .get_many::<String>(EXTRA_ARGS)
                .map(|extras| extras.cloned().collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(Invocation::new(values).with_extras(extra_args, extra_kwargs))
    }

    /// Parses `args` and calls the callback with the result.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Command::parse_from`], or
    /// [`SigError::Value`] when the callback's parameters cannot be
    /// extracted. The callback is not called when parsing fails.
    pub fn run_from<I, S>(&self, args: I) -> SigResult<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let invocation = self.parse_from(args)?;
        debug!(command = %self.descriptor.name, "invoking callback");
        (self.callback)(invocation)
    }

    /// Runs with the process arguments, exiting on error.
    ///
    /// Errors are printed through clap and terminate the process with a
    /// non-zero status; help requests exit successfully.
    pub fn main(&self) -> T {
        match self.run_from(std::env::args_os()) {
            Ok(result) => result,
            Err(err) => {
                if !err.is_display_request() {
                    debug!(command = %self.descriptor.name, error = %err, "invocation failed");
                }
                err.into_clap_error(&self.clap).exit()
            }
        }
    }

    /// Removes unknown long options from `args`, returning them keyed by
    /// name. `--name=value` records the text; a bare `--name` records
    /// `true`.
    fn split_unknown_options(&self, args: Vec<OsString>) -> (Vec<OsString>, ValueMap) {
        let known: BTreeSet<&str> = self
            .clap
            .get_arguments()
            .filter_map(clap::Arg::get_long)
            .chain(["help"])
            .collect();
        let mut kept = Vec::with_capacity(args.len());
        let mut unknown = ValueMap::new();
        let mut tokens = args.into_iter();
        kept.extend(tokens.next());
        while let Some(token) = tokens.next() {
            let Some(text) = token.to_str() else {
                kept.push(token);
                continue;
            };
            if text == "--" {
                kept.push(token);
                kept.extend(tokens.by_ref());
                break;
            }
            let Some(option) = text.strip_prefix("--") else {
                kept.push(token);
                continue;
            };
            let (name, text_value) = option
                .split_once('=')
                .map_or((option, None), |(key, value)| (key, Some(value)));
            if known.contains(name) {
                kept.push(token);
                continue;
            }
            let value = text_value.map_or(Value::Bool(true), |v| Value::Str(v.to_owned()));
            trace!(option = name, "collected unknown option");
            unknown.insert(name.replace('-', "_"), value);
        }
        (kept, unknown)
    }

    fn collect(&self, matches: &ArgMatches) -> SigResult<ValueMap> {
        let mut values = ValueMap::new();
        for descriptor in &self.descriptor.params {
            let parsed = self.parsed_value(descriptor, matches)?;
            let value = parsed
                .or_else(|| descriptor.default.clone())
                .unwrap_or_else(|| {
                    if descriptor.multiple {
                        Value::List(Vec::new())
                    } else {
                        Value::None
                    }
                });
            trace!(
                parameter = %descriptor.name,
                value = %descriptor.redact(&value),
                "collected value"
            );
            values.insert(descriptor.name.clone(), value);
        }
        Ok(values)
    }

    fn parsed_value(
        &self,
        descriptor: &Descriptor,
        matches: &ArgMatches,
    ) -> SigResult<Option<Value>> {
        let key = descriptor.name.as_str();
        if let DescriptorKind::Flag { .. } = descriptor.kind {
            let value = if matches.get_flag(&negation_id(key)) {
                Some(Value::Bool(false))
            } else if matches.get_flag(key) {
                Some(Value::Bool(true))
            } else {
                None
            };
            return Ok(value);
        }
        if descriptor.is_tuple() {
            let Some(tokens) = matches.get_many::<String>(key) else {
                return Ok(None);
            };
            let items = tokens
                .zip(&descriptor.converters)
                .map(|(token, converter)| {
                    converter.convert(token).map_err(|err| {
                        SigError::from(
                            clap::Error::raw(
                                ErrorKind::ValueValidation,
                                format!("invalid value '{token}' for '{key}': {err}\n"),
                            )
                            .with_cmd(&self.clap),
                        )
                    })
                })
                .collect::<SigResult<Vec<_>>>()?;
            return Ok(Some(Value::Tuple(items)));
        }
        if descriptor.multiple {
            let Some(parsed) = matches.get_many::<Value>(key) else {
                return Ok(None);
            };
            let mut items: Vec<Value> = parsed.cloned().collect();
            if descriptor.type_tag == TypeTag::Set {
                let mut unique = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                items = unique;
            }
            return Ok(Some(Value::List(items)));
        }
        Ok(matches.get_one::<Value>(key).cloned())
    }
}
