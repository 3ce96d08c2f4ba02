//! Builtin template functions.
//!
//! These are ordinary [`FunctionRegistry`] entries; templates reach them
//! through `f` like any other function, and a caller's own registration under
//! the same name replaces them.
//!
//! | Function | Result |
//! |---|---|
//! | `upper(s)` | `s` uppercased |
//! | `lower(s)` | `s` lowercased |
//! | `trim(s)` | `s` without surrounding whitespace |
//! | `join(list, sep = "")` | items of `list` joined by `sep` |
//! | `escape_html(s)` | `s` with `& < > " '` escaped |
//! | `json(v)` | `v` serialized as JSON text |
//! | `length(v)` | character count of a string, item count of an array or object |
//! | `concat(a, b, ...)` | all arguments as text, concatenated |

use anyhow::{Result, bail};
use serde_json::{Value, json};

use super::bindings::{describe_value, value_to_text};
use super::functions::FunctionRegistry;

/// Names of every builtin, sorted.
pub const BUILTIN_NAMES: [&str; 8] =
    ["concat", "escape_html", "join", "json", "length", "lower", "trim", "upper"];

/// Register all builtins into `registry`.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    registry
        .register("upper", |args| Ok(json!(text_arg("upper", args, 0)?.to_uppercase())))
        .register("lower", |args| Ok(json!(text_arg("lower", args, 0)?.to_lowercase())))
        .register("trim", |args| Ok(json!(text_arg("trim", args, 0)?.trim())))
        .register("join", join)
        .register("escape_html", |args| {
            Ok(json!(escape_html(&text_arg("escape_html", args, 0)?)))
        })
        .register("json", |args| Ok(json!(serde_json::to_string(arg("json", args, 0)?)?)))
        .register("length", length)
        .register("concat", |args| Ok(json!(args.iter().map(value_to_text).collect::<String>())));

    tracing::trace!("Registered {} builtin template functions", BUILTIN_NAMES.len());
}

/// A registry holding only the builtins.
pub fn builtin_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    register_builtins(&mut registry);
    registry
}

fn arg<'a>(function: &str, args: &'a [Value], index: usize) -> Result<&'a Value> {
    match args.get(index) {
        Some(value) => Ok(value),
        None => bail!(
            "Function '{}' expects at least {} argument(s), got {}",
            function,
            index + 1,
            args.len()
        ),
    }
}

fn text_arg(function: &str, args: &[Value], index: usize) -> Result<String> {
    match arg(function, args, index)? {
        value @ (Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null) => {
            Ok(value_to_text(value))
        }
        other => bail!(
            "Function '{}' expects a scalar argument at position {}, got {}",
            function,
            index + 1,
            describe_value(other)
        ),
    }
}

fn join(args: &[Value]) -> Result<Value> {
    let items = match arg("join", args, 0)? {
        Value::Array(items) => items,
        other => bail!("Function 'join' expects an array, got {}", describe_value(other)),
    };
    let separator = match args.get(1) {
        Some(_) => text_arg("join", args, 1)?,
        None => String::new(),
    };

    let parts: Vec<String> = items.iter().map(value_to_text).collect();
    Ok(json!(parts.join(&separator)))
}

fn length(args: &[Value]) -> Result<Value> {
    let len = match arg("length", args, 0)? {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => bail!("Function 'length' cannot measure {}", describe_value(other)),
    };
    Ok(json!(len))
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
