//! Generated units compiled into the test itself.
//!
//! `fixtures/prelude_names.rs` is the generator's output for
//! [`prelude_names_module`]; the first test keeps the two in sync.

use codegen::generate_default;
use options::{Module, OptionType};

#[allow(dead_code)]
mod generated {
    include!("fixtures/prelude_names.rs");
}

/// Members whose type names shadow `From`, `Ok` and a `D` type parameter.
fn prelude_names_module() -> Module {
    Module::new()
        .with("d", OptionType::either([OptionType::Str, OptionType::Int]))
        .with("from", OptionType::Submodule(Module::new().with("x", OptionType::Str)))
        .with("ok", OptionType::enumeration(["yes", "no"]))
}

#[test]
fn test_fixture_matches_generator() {
    let unit = generate_default(&prelude_names_module()).expect("generates");
    assert_eq!(unit.source, include_str!("fixtures/prelude_names.rs"));
}

#[test]
fn test_quoted_number_selects_string_alternative() {
    let config: generated::Config =
        serde_json::from_str(r#"{"d": "5", "from": {"x": "a"}, "ok": "yes"}"#).expect("decodes");
    assert!(matches!(&config.d, generated::D::Str(generated::DStr(s)) if s == "5"));
    assert_eq!(config.from.x, "a");
    assert_eq!(config.ok, generated::OkYes);
}

#[test]
fn test_bare_number_falls_through_to_int() {
    let d: generated::D = serde_json::from_str("5").expect("decodes");
    assert!(matches!(d, generated::D::Int(generated::DInt(5))));
}

#[test]
fn test_unmatched_value_is_rejected() {
    let err = serde_json::from_str::<generated::D>("true").expect_err("no alternative matches");
    assert!(err.to_string().contains("no alternative matched `D`"), "{err}");
}

#[test]
fn test_conversions_and_serialization() {
    let d: generated::D = generated::DInt(7).into();
    assert_eq!(serde_json::to_string(&d).expect("encodes"), "7");
    assert_eq!(serde_json::to_string(&generated::OkNo).expect("encodes"), "\"no\"");
    assert_eq!(
        serde_json::from_str::<generated::Ok>("\"no\"").expect("decodes"),
        generated::OkNo
    );
}
