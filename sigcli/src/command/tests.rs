//! Tests for command assembly and invocation.

use super::*;
use crate::error::{SigError, ValidationError};
use crate::invocation::ValueMap;
use crate::options::CompositeOptions;
use crate::signature::{Annotation, Parameter, TypeTag};
use crate::value::Value;
use anyhow::{Result, ensure};
use rstest::{fixture, rstest};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq)]
struct Foo {
    a: i64,
    b: String,
}

impl Parameters for Foo {
    fn signature() -> Signature {
        Signature::new("foo")
            .param(Parameter::new("a").annotated(TypeTag::Int))
            .param(Parameter::new("b").annotated(TypeTag::Str).default("foo"))
    }

    fn from_invocation(invocation: &mut Invocation) -> SigResult<Self> {
        Ok(Self {
            a: invocation.take("a")?,
            b: invocation.take("b")?,
        })
    }
}

#[fixture]
fn registry() -> Registry {
    Registry::builder()
        .composite::<Foo>(CompositeOptions::new())
        .validation(TypeTag::Int, |value| match value {
            Value::Int(n) if *n < 0 => Err(ValidationError::new("must not be negative")),
            _ => Ok(()),
        })
        .build()
}

fn main_signature() -> Signature {
    Signature::new("main")
        .param(Parameter::new("foo").annotated(Annotation::named("Foo")))
        .param(Parameter::var_args("args"))
        .param(Parameter::new("bar").annotated(TypeTag::Int).default(1))
        .param(
            Parameter::new("baz")
                .annotated(Annotation::optional(TypeTag::Float.into()))
                .default(Value::None),
        )
        .param(Parameter::var_kwargs("kwargs"))
}

fn echo(registry: Registry, signature: Signature) -> SigResult<Command<Invocation>> {
    CommandBuilder::new(signature, |invocation| invocation)
        .registry(registry)
        .build()
}

#[rstest]
fn main_scenario_reconstructs_composite(registry: Registry) -> Result<()> {
    let cmd = echo(registry, main_signature())?;
    let mut invocation = cmd.run_from(["main", "1"])?;
    ensure!(
        invocation.take::<Value>("foo")?.into_object::<Foo>()? == Foo { a: 1, b: "foo".into() },
        "composite not rebuilt"
    );
    ensure!(invocation.get("bar") == Some(&Value::Int(1)), "bar default");
    ensure!(invocation.get("baz") == Some(&Value::None), "baz must be None");
    ensure!(invocation.extra_args().is_empty(), "unexpected args");
    ensure!(invocation.extra_kwargs().is_empty(), "unexpected kwargs");
    ensure!(invocation.get("foo_a").is_none(), "prefixed keys must be removed");
    Ok(())
}

#[rstest]
fn extras_are_collected(registry: Registry) -> Result<()> {
    let cmd = echo(registry, main_signature())?;
    let invocation = cmd.run_from([
        "main",
        "1",
        "--foo-b",
        "x",
        "--baz",
        "2.5",
        "--colour=red",
        "--dry-run",
        "rest",
        "more",
    ])?;
    ensure!(invocation.get("baz") == Some(&Value::Float(2.5)), "baz parsed");
    ensure!(invocation.extra_args() == ["rest", "more"], "{:?}", invocation.extra_args());
    ensure!(
        invocation.extra_kwargs().get("colour") == Some(&Value::Str("red".into())),
        "valued unknown option"
    );
    ensure!(
        invocation.extra_kwargs().get("dry_run") == Some(&Value::Bool(true)),
        "bare unknown option"
    );
    Ok(())
}

#[rstest]
fn unknown_options_are_rejected_without_var_kwargs(registry: Registry) -> Result<()> {
    let sig = Signature::new("main").param(Parameter::new("x").default(1));
    let cmd = echo(registry, sig)?;
    let err = cmd.run_from(["main", "--nope"]).err();
    ensure!(matches!(err, Some(SigError::CliParsing(_))), "{err:?}");
    Ok(())
}

#[rstest]
#[case(&["main", "1", "--bar", "-3"], "bar")]
#[case(&["main", "-1"], "a")]
fn negative_ints_fail_validation_without_calling_back(
    registry: Registry,
    #[case] args: &[&str],
    #[case] parameter: &str,
) -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let cmd = CommandBuilder::new(main_signature(), move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    })
    .registry(registry)
    .build()?;
    let err = cmd.run_from(args.iter().copied()).err();
    ensure!(
        matches!(&err, Some(SigError::Validation(v)) if v.parameter() == Some(parameter)),
        "{err:?}"
    );
    ensure!(calls.load(Ordering::SeqCst) == 0, "callback ran");
    Ok(())
}

#[rstest]
fn conversion_errors_surface_as_parse_errors(registry: Registry) -> Result<()> {
    let cmd = echo(registry, main_signature())?;
    let err = cmd.run_from(["main", "one"]).err();
    ensure!(matches!(err, Some(SigError::CliParsing(_))), "{err:?}");
    Ok(())
}

#[rstest]
#[case(&["main"], Some(false))]
#[case(&["main", "--verbose"], Some(true))]
#[case(&["main", "-v"], Some(true))]
#[case(&["main", "--verbose", "--no-verbose"], Some(false))]
#[case(&["main", "--no-verbose", "--verbose"], Some(true))]
fn flag_pairs(
    registry: Registry,
    #[case] args: &[&str],
    #[case] expected: Option<bool>,
) -> Result<()> {
    let sig = Signature::new("main").param(Parameter::new("verbose").default(false));
    let cmd = echo(registry, sig)?;
    let mut invocation = cmd.run_from(args.iter().copied())?;
    ensure!(invocation.take::<Option<bool>>("verbose")? == expected, "for {args:?}");
    Ok(())
}

#[rstest]
#[case(&["main"], false)]
#[case(&["main", "--no-color"], true)]
#[case(&["main", "--color"], false)]
fn negative_flag_names_swap(
    registry: Registry,
    #[case] args: &[&str],
    #[case] expected: bool,
) -> Result<()> {
    let sig = Signature::new("main").param(Parameter::new("no_color").default(false));
    let cmd = echo(registry, sig)?;
    let mut invocation = cmd.run_from(args.iter().copied())?;
    ensure!(invocation.take::<bool>("no_color")? == expected, "for {args:?}");
    Ok(())
}

#[rstest]
fn tuples_and_lists_convert_each_value(registry: Registry) -> Result<()> {
    let sig = Signature::new("main")
        .param(
            Parameter::new("point")
                .annotated(Annotation::Tuple(vec![TypeTag::Int.into(), TypeTag::Float.into()]))
                .default((0, 0.0)),
        )
        .param(
            Parameter::new("tags")
                .annotated(Annotation::set(TypeTag::Str.into()))
                .default(Vec::<String>::new()),
        );
    let cmd = echo(registry, sig)?;
    let mut invocation = cmd.run_from([
        "main", "--point", "3", "4.5", "--tags", "a", "--tags", "b", "--tags", "a",
    ])?;
    ensure!(invocation.take::<(i64, f64)>("point")? == (3, 4.5), "tuple");
    ensure!(
        invocation.take::<Vec<String>>("tags")? == ["a", "b"],
        "set must drop duplicates"
    );
    let err = cmd.run_from(["main", "--point", "x", "1"]).err();
    ensure!(matches!(err, Some(SigError::CliParsing(_))), "{err:?}");
    Ok(())
}

#[rstest]
fn single_element_tuples_stay_tuples(registry: Registry) -> Result<()> {
    let sig = Signature::new("main").param(
        Parameter::new("one")
            .annotated(Annotation::Tuple(vec![TypeTag::Int.into()]))
            .default(Value::Tuple(vec![Value::Int(0)])),
    );
    let cmd = echo(registry, sig)?;
    let invocation = cmd.run_from(["main", "--one", "5"])?;
    ensure!(
        invocation.get("one") == Some(&Value::Tuple(vec![Value::Int(5)])),
        "{invocation:?}"
    );
    Ok(())
}

#[rstest]
fn commands_without_var_args_have_no_extras(registry: Registry) -> Result<()> {
    let sig = Signature::new("main").param(Parameter::new("bar").annotated(TypeTag::Int));
    let cmd = echo(registry, sig)?;
    let invocation = cmd.run_from(["main", "2"])?;
    ensure!(invocation.get("bar") == Some(&Value::Int(2)), "{invocation:?}");
    ensure!(invocation.extra_args().is_empty(), "unexpected args");
    ensure!(cmd.run_from(["main", "2", "3"]).is_err(), "stray positional accepted");
    Ok(())
}

#[rstest]
fn newtypes_inherit_base_type_validations() -> Result<()> {
    let registry = Registry::builder()
        .newtype("Port", TypeTag::Int.into())
        .validation(TypeTag::Int, |value| match value {
            Value::Int(n) if *n < 0 => Err(ValidationError::new("must not be negative")),
            _ => Ok(()),
        })
        .build();
    let sig = Signature::new("serve").param(
        Parameter::new("port")
            .annotated(Annotation::named("Port"))
            .default(80),
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let cmd = CommandBuilder::new(sig, move |invocation| {
        seen.fetch_add(1, Ordering::SeqCst);
        invocation
    })
    .registry(registry)
    .build()?;
    let err = cmd.run_from(["serve", "--port", "-5"]).err();
    ensure!(matches!(err, Some(SigError::Validation(_))), "{err:?}");
    ensure!(calls.load(Ordering::SeqCst) == 0, "callback ran");
    ensure!(cmd.run_from(["serve", "--port", "8080"]).is_ok());
    Ok(())
}

#[rstest]
fn missing_repeated_option_is_empty_list(registry: Registry) -> Result<()> {
    let sig = Signature::new("main").param(
        Parameter::new("names")
            .annotated(Annotation::optional(Annotation::list(TypeTag::Str.into()))),
    );
    let cmd = echo(registry, sig)?;
    let invocation = cmd.run_from(["main"])?;
    ensure!(invocation.get("names") == Some(&Value::List(vec![])), "{invocation:?}");
    Ok(())
}

#[rstest]
fn conditionals_run_before_validations(registry: Registry) -> Result<()> {
    let options = CommandOptions::new()
        .conditional(["bar"], |values| {
            let mut out = ValueMap::new();
            if let Some(Value::Int(n)) = values.get("bar") {
                out.insert("bar".into(), Value::Int(n.abs()));
            }
            out
        })
        .validation(["bar", "baz"], |values| {
            let baz_given = values.get("baz").is_some_and(|v| !v.is_none());
            if baz_given && values.get("bar") == Some(&Value::Int(1)) {
                return Err(ValidationError::new("baz requires bar > 1"));
            }
            Ok(())
        });
    let cmd = CommandBuilder::new(main_signature(), |inv| inv)
        .options(options)
        .registry(registry)
        .build()?;
    let invocation = cmd.run_from(["main", "1", "--bar", "-5"])?;
    ensure!(invocation.get("bar") == Some(&Value::Int(5)), "conditional ignored");
    let err = cmd.run_from(["main", "1", "--baz", "1.0"]).err();
    ensure!(
        matches!(&err, Some(SigError::Validation(v)) if v.parameter().is_none()),
        "{err:?}"
    );
    Ok(())
}

#[rstest]
fn composite_hooks_run_during_collapse() -> Result<()> {
    let registry = Registry::builder()
        .composite::<Foo>(CompositeOptions::new().conditional(["b"], |values| {
            let mut out = ValueMap::new();
            if let Some(Value::Str(b)) = values.get("b") {
                out.insert("b".into(), Value::Str(b.to_uppercase()));
            }
            out
        }))
        .build();
    let sig =
        Signature::new("main").param(Parameter::new("foo").annotated(Annotation::named("Foo")));
    let cmd = echo(registry, sig)?;
    let mut invocation = cmd.run_from(["main", "7"])?;
    let foo = invocation.take::<Value>("foo")?.into_object::<Foo>()?;
    ensure!(foo == Foo { a: 7, b: "FOO".into() }, "{foo:?}");
    Ok(())
}

#[rstest]
fn describe_reports_interface(registry: Registry) -> Result<()> {
    let cmd = CommandBuilder::new(main_signature(), |_| ())
        .options(CommandOptions::new().name("renamed"))
        .registry(registry)
        .build()?;
    let descriptor = cmd.describe();
    ensure!(cmd.name() == "renamed", "name override");
    ensure!(descriptor.allow_extra_args && descriptor.allow_unknown_options, "extras");
    ensure!(
        descriptor.composites.first().map(|c| c.fields.clone())
            == Some(vec!["foo_a".to_owned(), "foo_b".to_owned()]),
        "{:?}",
        descriptor.composites
    );
    let json = serde_json::to_value(descriptor)?;
    ensure!(json["params"][0]["kind"] == "positional", "{json}");
    ensure!(json["params"][1]["long"] == "foo-b", "{json}");
    Ok(())
}

#[rstest]
fn help_requests_are_display_requests(registry: Registry) -> Result<()> {
    let cmd = echo(registry, main_signature())?;
    let err = cmd.run_from(["main", "--help"]).err();
    ensure!(
        err.as_ref().is_some_and(SigError::is_display_request),
        "help must short-circuit parsing: {err:?}"
    );
    Ok(())
}

#[rstest]
fn parameters_callback_receives_typed_struct(registry: Registry) -> Result<()> {
    let cmd = CommandBuilder::for_parameters(|foo: Foo| foo.a * 2)
        .registry(registry)
        .build()?;
    ensure!(cmd.run_from(["foo", "21"])? == 42, "typed callback");
    Ok(())
}

#[rstest]
#[case("main", "main")]
#[case("main_args", "main-args")]
#[case("Run_All", "run-all")]
fn default_names_come_from_the_callable(
    registry: Registry,
    #[case] callable: &str,
    #[case] expected: &str,
) -> Result<()> {
    let cmd = echo(registry, Signature::new(callable))?;
    ensure!(cmd.name() == expected, "name: {}", cmd.name());
    ensure!(cmd.clap_command().get_name() == expected, "clap name");
    Ok(())
}
