//! Function registries and the builtin library.

use isotemplate::templating::FunctionNotFound;
use isotemplate::templating::builtins::{BUILTIN_NAMES, builtin_registry, register_builtins};
use isotemplate::templating::functions::FunctionRegistry;
use serde_json::{Value, json};

#[test]
fn test_builtins_merge_with_custom_functions() {
    let mut registry = FunctionRegistry::new().with("greet", |args| {
        Ok(json!(format!("hi {}", args.first().and_then(Value::as_str).unwrap_or("?"))))
    });
    register_builtins(&mut registry);

    assert_eq!(registry.len(), BUILTIN_NAMES.len() + 1);
    assert_eq!(registry.invoke("greet", &[json!("ann")]).unwrap(), json!("hi ann"));
    assert_eq!(registry.invoke("lower", &[json!("ANN")]).unwrap(), json!("ann"));
}

#[test]
fn test_unknown_builtin_suggests_neighbours() {
    let err = builtin_registry().invoke("lenght", &[json!("abc")]).unwrap_err();
    let missing = err.downcast_ref::<FunctionNotFound>().unwrap();
    assert_eq!(missing.name, "lenght");
    assert_eq!(missing.suggestions.first().map(String::as_str), Some("length"));
}

#[test]
fn test_function_errors_pass_through_unchanged() {
    let err = builtin_registry().invoke("join", &[json!(42)]).unwrap_err();
    assert!(err.downcast_ref::<FunctionNotFound>().is_none());
    assert!(err.to_string().contains("'join'"));
}
