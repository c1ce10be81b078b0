//! Tests for registry construction and lookups.

use super::*;
use crate::invocation::Invocation;
use crate::signature::{Parameter, Signature};
use anyhow::{Result, ensure};
use rstest::{fixture, rstest};

#[derive(Debug, PartialEq)]
struct Point {
    x: i64,
}

impl Parameters for Point {
    fn signature() -> Signature {
        Signature::new("point").param(Parameter::new("x").annotated(TypeTag::Int))
    }

    fn from_invocation(invocation: &mut Invocation) -> crate::SigResult<Self> {
        Ok(Self {
            x: invocation.take("x")?,
        })
    }
}

#[fixture]
fn registry() -> Registry {
    Registry::builder()
        .conversion(TypeTag::custom("Celsius"), |t| {
            t.parse::<f64>().map(Value::Float).map_err(|e| e.to_string())
        })
        .composite::<Point>(CompositeOptions::new())
        .newtype("Port", Annotation::of(TypeTag::Int))
        .build()
}

#[rstest]
#[case("str", TypeTag::Str)]
#[case("String", TypeTag::Str)]
#[case("int", TypeTag::Int)]
#[case("i64", TypeTag::Int)]
#[case("float", TypeTag::Float)]
#[case("bool", TypeTag::Bool)]
#[case("path", TypeTag::Path)]
#[case("PathBuf", TypeTag::Path)]
fn builtin_names_resolve(registry: Registry, #[case] name: &str, #[case] tag: TypeTag) {
    assert_eq!(registry.lookup(name), Some(&Annotation::of(tag)));
}

#[rstest]
fn registrations_extend_the_namespace(registry: Registry) -> Result<()> {
    ensure!(
        registry.lookup("Celsius") == Some(&Annotation::of(TypeTag::custom("Celsius"))),
        "conversion name missing"
    );
    ensure!(
        registry.lookup("Point") == Some(&Annotation::of(TypeTag::custom("Point"))),
        "composite name missing"
    );
    ensure!(
        matches!(registry.lookup("Port"), Some(Annotation::NewType { name, .. }) if name == "Port"),
        "newtype missing"
    );
    Ok(())
}

#[rstest]
fn composite_constructs_registered_type(registry: Registry) -> Result<()> {
    let composite = registry
        .composite(&TypeTag::custom("Point"))
        .ok_or_else(|| anyhow::anyhow!("composite not registered"))?;
    let mut invocation = Invocation::new([("x".to_owned(), Value::Int(3))].into());
    let value = composite.construct(&mut invocation)?;
    ensure!(value.into_object::<Point>()? == Point { x: 3 }, "wrong point");
    Ok(())
}

#[rstest]
fn user_conversion_overrides_builtin() -> Result<()> {
    let registry = Registry::builder()
        .conversion(TypeTag::Int, |t| Ok(Value::Int(t.len().try_into().unwrap_or(0))))
        .build();
    let converter = registry
        .conversion(&TypeTag::Int)
        .ok_or_else(|| anyhow::anyhow!("int conversion missing"))?;
    ensure!(converter.convert("abc")? == Value::Int(3), "override not used");
    Ok(())
}

#[rstest]
fn clones_share_tables(registry: Registry) {
    let copy = registry.clone();
    assert!(Arc::ptr_eq(&registry.tables, &copy.tables));
}

#[rstest]
fn to_builder_keeps_existing_entries(registry: Registry) {
    let extended = registry
        .to_builder()
        .validation(TypeTag::Str, |_| Ok(()))
        .build();
    assert!(extended.composite(&TypeTag::custom("Point")).is_some());
    assert_eq!(extended.validations(&TypeTag::Str).len(), 1);
    assert!(registry.validations(&TypeTag::Str).is_empty());
}

#[rstest]
fn global_falls_back_to_builtins() {
    assert!(global().conversion(&TypeTag::Bool).is_some());
}
