//! Demo command built from a `foo`/`bar`/`baz` signature.
//!
//! `Foo` is registered as a composite, so its fields surface as `foo-a`
//! (positional) and `--foo-b`. Integer values are rejected when negative.

use sigcli::{CompositeOptions, Parameters, Registry, TypeTag, ValidationError, Value, ValueMap};

/// Two values grouped under one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Parameters)]
pub struct Foo {
    /// First value.
    pub a: i64,
    /// Second value.
    #[sigcli(default = "foo")]
    pub b: String,
}

/// Prints the values it was called with.
#[derive(Debug, Parameters)]
#[sigcli(name = "metasyntactic")]
pub struct MainArgs {
    /// Grouped values.
    pub foo: Foo,
    /// Extra positional arguments.
    #[sigcli(var_args)]
    pub args: Vec<String>,
    /// How many bars.
    #[sigcli(default = 1)]
    pub bar: i64,
    /// Optional scaling factor.
    #[sigcli(default = None)]
    pub baz: Option<f64>,
    /// Unrecognised `--name[=value]` options.
    #[sigcli(var_kwargs)]
    pub kwargs: ValueMap,
}

fn non_negative(value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Int(n) if *n < 0 => Err(ValidationError::new("must not be negative")),
        _ => Ok(()),
    }
}

/// Registry with `Foo` as a composite and non-negative integers.
#[must_use]
pub fn registry() -> Registry {
    Registry::builder()
        .composite::<Foo>(CompositeOptions::new())
        .validation(TypeTag::Int, non_negative)
        .build()
}

/// Renders one line per parameter.
#[must_use]
pub fn report(args: &MainArgs) -> String {
    let baz = args.baz.map_or_else(|| "none".to_owned(), |v| v.to_string());
    let mut lines = vec![
        format!("foo.a = {}", args.foo.a),
        format!("foo.b = {}", args.foo.b),
        format!("args = {}", args.args.join(" ")),
        format!("bar = {}", args.bar),
        format!("baz = {baz}"),
    ];
    lines.extend(args.kwargs.iter().map(|(key, value)| format!("{key} = {value}")));
    lines.iter().map(|line| format!("{line}\n")).collect()
}
