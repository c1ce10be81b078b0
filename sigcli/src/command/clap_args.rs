//! Translation of descriptors into clap arguments.

use std::ffi::OsStr;

use clap::builder::TypedValueParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction};

use super::CommandDescriptor;
use crate::build::{Descriptor, DescriptorKind};
use crate::registry::Converter;
use crate::value::Value;

/// Argument id collecting extra positional tokens.
pub(super) const EXTRA_ARGS: &str = "*extra";

/// Argument id of the negating switch of flag `key`.
pub(super) fn negation_id(key: &str) -> String {
    format!("{key}:negated")
}

/// Value parser producing [`Value`] through a registered conversion.
#[derive(Clone)]
pub(super) struct ConvertParser {
    converter: Converter,
}

impl TypedValueParser for ConvertParser {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let Some(token) = value.to_str() else {
            return Err(clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd));
        };
        self.converter.convert(token).map_err(|err| {
            let target = arg.map_or_else(|| "value".to_owned(), ToString::to_string);
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("invalid value '{token}' for '{target}': {err}\n"),
            )
            .with_cmd(cmd)
        })
    }
}

pub(super) fn clap_command(descriptor: &CommandDescriptor) -> clap::Command {
    let mut cmd = clap::Command::new(descriptor.name.clone()).allow_negative_numbers(true);
    if let Some(about) = &descriptor.about {
        cmd = cmd.about(about.clone());
    }
    for param in &descriptor.params {
        cmd = cmd.args(args_for(param));
    }
    if descriptor.allow_extra_args {
        cmd = cmd.arg(
            Arg::new(EXTRA_ARGS)
                .value_name("ARGS")
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        );
    }
    cmd
}

fn args_for(descriptor: &Descriptor) -> Vec<Arg> {
    let key = descriptor.name.clone();
    let help = descriptor.help.clone();
    match &descriptor.kind {
        DescriptorKind::Flag {
            long,
            short,
            negation,
        } => {
            let negated = negation_id(&key);
            let mut on = with_help(
                Arg::new(key.clone())
                    .long(long.clone())
                    .action(ArgAction::SetTrue)
                    .overrides_with(negated.clone())
                    .required(descriptor.required),
                help,
            );
            if let Some(letter) = short {
                on = on.short(*letter);
            }
            let off = Arg::new(negated)
                .long(negation.clone())
                .action(ArgAction::SetTrue)
                .overrides_with(key)
                .help(format!("Negates --{long}"));
            vec![on, off]
        }
        DescriptorKind::Option { long, short } => {
            let mut arg = with_help(
                valued(descriptor, Arg::new(key).long(long.clone()))
                    .value_name(descriptor.type_tag.name().to_uppercase()),
                help,
            );
            if let Some(letter) = short {
                arg = arg.short(*letter);
            }
            vec![arg]
        }
        DescriptorKind::Positional => {
            let arg = valued(descriptor, Arg::new(key.clone())).value_name(key.to_uppercase());
            vec![with_help(arg, help)]
        }
    }
}

fn with_help(arg: Arg, help: Option<String>) -> Arg {
    match help {
        Some(text) => arg.help(text),
        None => arg,
    }
}

/// Applies arity, repetition and the value parser shared by options and
/// positionals.
fn valued(descriptor: &Descriptor, arg: Arg) -> Arg {
    let mut valued = arg.required(descriptor.required);
    valued = if descriptor.variadic {
        valued.num_args(1..)
    } else {
        valued.num_args(descriptor.arity)
    };
    valued = valued.action(if descriptor.multiple {
        ArgAction::Append
    } else {
        ArgAction::Set
    });
    match descriptor.converters.as_slice() {
        [converter] if !descriptor.is_tuple() => valued.value_parser(ConvertParser {
            converter: converter.clone(),
        }),
        _ => valued.value_parser(clap::value_parser!(String)),
    }
}
