//! Tests for the generated `Parameters` impls.

use super::expand;
use super::generate::annotation;
use anyhow::{Result, anyhow, ensure};
use quote::quote;
use rstest::rstest;
use syn::{DeriveInput, Type, parse_quote};

fn expand_to_string(input: &DeriveInput) -> Result<String> {
    expand(input)
        .map(|tokens| tokens.to_string())
        .map_err(|err| anyhow!(err))
}

fn assert_contains(haystack: &str, needles: &[&str]) -> Result<()> {
    for needle in needles {
        ensure!(
            haystack.contains(needle),
            "expected '{needle}' in generated tokens: {haystack}"
        );
    }
    Ok(())
}

#[rstest]
#[case::string(parse_quote!(String), "Annotation :: of (:: sigcli :: TypeTag :: Str)")]
#[case::str_ref(parse_quote!(&'static str), "TypeTag :: Str")]
#[case::unsigned(parse_quote!(u16), "TypeTag :: Int")]
#[case::float(parse_quote!(f32), "TypeTag :: Float")]
#[case::boolean(parse_quote!(bool), "TypeTag :: Bool")]
#[case::path(parse_quote!(std::path::PathBuf), "TypeTag :: Path")]
#[case::untyped(parse_quote!(sigcli::Value), "Annotation :: Missing")]
#[case::custom(parse_quote!(Port), "Annotation :: named (\"Port\")")]
#[case::optional(parse_quote!(Option<f64>), "Annotation :: optional (:: sigcli :: Annotation :: of")]
#[case::list(parse_quote!(Vec<i64>), "Annotation :: list (")]
#[case::set(parse_quote!(BTreeSet<String>), "Annotation :: set (")]
#[case::tuple(parse_quote!((i64, String)), "Annotation :: Tuple (:: std :: vec ! [")]
fn maps_rust_types_to_annotations(#[case] ty: Type, #[case] expected: &str) -> Result<()> {
    let tokens = annotation(&quote! { ::sigcli }, &ty)
        .map_err(|err| anyhow!(err))?
        .to_string();
    ensure!(tokens.contains(expected), "got {tokens}");
    Ok(())
}

#[rstest]
#[case::unit(parse_quote!(()))]
#[case::function(parse_quote!(fn(i64) -> i64))]
fn rejects_unsupported_types(#[case] ty: Type) {
    assert!(annotation(&quote! { ::sigcli }, &ty).is_err());
}

#[test]
fn generates_signature_and_extraction() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        /// Frobnicates things.
        struct FooBar {
            /// Number of things.
            count: i64,
            #[sigcli(default = "foo")]
            label: String,
            #[sigcli(var_args)]
            rest: Vec<String>,
            #[sigcli(var_kwargs)]
            options: sigcli::ValueMap,
        }
    };
    let tokens = expand_to_string(&input)?;
    assert_contains(
        &tokens,
        &[
            "impl :: sigcli :: Parameters for FooBar",
            "Signature :: new (\"foo_bar\")",
            "Parameter :: new (\"count\")",
            ". default (:: sigcli :: Value :: from (:: core :: convert :: Into :: < String > :: into (\"foo\")))",
            "Parameter :: var_args (\"rest\")",
            "Parameter :: var_kwargs (\"options\")",
            ". description (\"Frobnicates things.\")",
            ". param (\"count\" , \"Number of things.\")",
            "count : invocation . take (\"count\") ?",
            "rest : invocation . take_extra_args ()",
            "options : invocation . take_extra_kwargs ()",
            "impl :: sigcli :: FromValue for FooBar",
            "value . into_object ()",
        ],
    )
}

#[test]
fn numeric_defaults_take_the_field_type() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Limits {
            #[sigcli(default = 3)]
            retries: u32,
            #[sigcli(default = Some(8))]
            depth: Option<usize>,
            #[sigcli(default = 0.5)]
            ratio: f32,
        }
    };
    let tokens = expand_to_string(&input)?;
    assert_contains(
        &tokens,
        &[
            ". try_default (:: sigcli :: Value :: int ({ let typed : u32 = 3 ; typed }))",
            "{ let typed : Option < usize > = Some (8) ; typed }",
            ":: core :: option :: Option :: Some (value) => :: sigcli :: Value :: int (value)",
            ". default (:: sigcli :: Value :: from ({ let typed : f32 = 0.5 ; typed }))",
        ],
    )
}

#[test]
fn custom_type_defaults_become_objects() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Serve {
            #[sigcli(default = Port(80))]
            port: Port,
            #[sigcli(default = None)]
            fallback: Option<Port>,
        }
    };
    let tokens = expand_to_string(&input)?;
    assert_contains(
        &tokens,
        &[
            ":: sigcli :: Value :: object (:: core :: convert :: Into :: < Port > :: into (Port (80)))",
            ":: core :: option :: Option :: None => :: sigcli :: Value :: None",
        ],
    )
}

#[test]
fn name_and_crate_overrides_apply() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[sigcli(name = "serve", crate = "cli")]
        struct Server {}
    };
    let tokens = expand_to_string(&input)?;
    assert_contains(
        &tokens,
        &[
            "impl cli :: Parameters for Server",
            "cli :: Signature :: new (\"serve\")",
            "let _ = invocation ;",
        ],
    )?;
    ensure!(!tokens.contains("::sigcli") && !tokens.contains(":: sigcli"));
    Ok(())
}

#[test]
fn errors_become_spanned_failures() {
    let input: DeriveInput = parse_quote! {
        struct Broken {
            #[sigcli(bogus)]
            field: i64,
        }
    };
    let err = expand(&input).err().map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some("unknown field key `bogus`"));
}
