//! Template files rendered through the public API.

use std::path::Path;
use std::sync::Arc;

use isotemplate::evaluator::{FileEvaluatorFactory, TemplateFactory};
use isotemplate::templating::builtins::builtin_registry;
use isotemplate::templating::{
    Context, ContextError, ContextService, FunctionNotFound, FunctionRegistry, RenderError, output,
};
use serde_json::Value;
use isotemplate::test_utils::{CountingService, init_test_logging, object, write_template};
use serde_json::json;
use tempfile::TempDir;

const GREETING: &str = r#"{% set name = c(key="name", default="world") %}{{ c(key="greeting") }} {{ f(name="shout", args=name) }}"#;

fn factory(dir: &TempDir) -> TemplateFactory {
    let functions = FunctionRegistry::new().with("shout", |args| {
        Ok(json!(args[0].as_str().unwrap_or_default().to_uppercase()))
    });
    TemplateFactory::new(
        Arc::new(FileEvaluatorFactory::with_base_dir(dir.path())),
        object(json!({"greeting": "Hi"})),
        functions,
    )
}

#[test]
fn test_greeting_template_file() {
    init_test_logging(None);
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "hello.tera", GREETING);

    let template = factory(&dir).from_location(Path::new("hello.tera")).unwrap();
    assert_eq!(template.render(json!({})).unwrap(), "Hi WORLD");
    assert_eq!(template.render(json!({"name": "alice"})).unwrap(), "Hi ALICE");
}

#[test]
fn test_context_overrides_default_context() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "x.tera", r#"{{ c(key="greeting") }}"#);

    let template = factory(&dir).from_location(Path::new("x.tera")).unwrap();
    assert_eq!(template.render(json!({"greeting": "Yo"})).unwrap(), "Yo");
    assert_eq!(template.render(()).unwrap(), "Hi");
}

#[test]
fn test_context_shapes_render_identically() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "key.tera", r#"[{{ c(key="key") }}]"#);
    let template = factory(&dir).from_location(Path::new("key.tera")).unwrap();

    let service = CountingService::new([("key".to_string(), json!("value"))]);
    let mut indexable = std::collections::BTreeMap::new();
    indexable.insert("key".to_string(), json!("value"));

    assert_eq!(template.render(json!({"key": "value"})).unwrap(), "[value]");
    assert_eq!(template.render(Context::indexable(indexable)).unwrap(), "[value]");
    assert_eq!(template.render(Context::service(service)).unwrap(), "[value]");
}

#[test]
fn test_service_is_consulted_lazily() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "lazy.tera", r#"{{ c(key="greeting") }}"#);
    let template = factory(&dir).from_location(Path::new("lazy.tera")).unwrap();

    let service = Arc::new(CountingService::new([("unused".to_string(), json!(1))]));
    let context = Context::Service(service.clone());

    // the service lacks "greeting", so the default context answers
    assert_eq!(template.render(&context).unwrap(), "Hi");
    assert_eq!(service.gets(), 0);
}

#[test]
fn test_unknown_function_in_file() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "bad.tera", r#"before {{ f(name="nope") }} after"#);
    let template = factory(&dir).from_location(Path::new("bad.tera")).unwrap();

    let outer = output::Capture::begin();
    let err = template.render(json!({"k": 1})).unwrap_err();
    assert_eq!(outer.finish(), "");

    assert!(matches!(err, RenderError::Evaluation { .. }));
    let missing = err.find::<FunctionNotFound>().expect("FunctionNotFound in chain");
    assert_eq!(missing.name, "nope");
    assert!(err.format_with_context().contains("Available functions: shout"));
}

/// Claims every key but fails to produce any of them.
struct OfflineService;

impl ContextService for OfflineService {
    fn has(&self, _key: &str) -> bool {
        true
    }

    fn get(&self, _key: &str) -> anyhow::Result<Value> {
        anyhow::bail!("lookup backend offline")
    }
}

#[test]
fn test_failing_service_lookup_in_file() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "lookup.tera", r#"before {{ c(key="greeting") }} after"#);
    let template = factory(&dir).from_location(Path::new("lookup.tera")).unwrap();

    let outer = output::Capture::begin();
    let err = template.render(Context::service(OfflineService)).unwrap_err();
    assert_eq!(outer.finish(), "");

    assert!(matches!(err, RenderError::Evaluation { .. }));
    match err.find::<ContextError>() {
        Some(ContextError::Lookup { key, source }) => {
            assert_eq!(key, "greeting");
            assert!(source.to_string().contains("backend offline"));
        }
        other => panic!("expected a lookup error, got {other:?}"),
    }
    assert!(err.format_with_context().contains("backend offline"));
}

#[test]
fn test_template_cannot_see_host_state() {
    let dir = TempDir::new().unwrap();
    let template = factory(&dir);

    for (name, body) in [
        ("env.tera", r#"{{ get_env(name="PATH") }}"#),
        ("now.tera", "{{ now() }}"),
        ("random.tera", "{{ get_random(end=10) }}"),
    ] {
        write_template(dir.path(), name, body);
        let err = template.from_location(Path::new(name)).unwrap().render(()).unwrap_err();
        assert!(err.format_with_context().contains("not available to templates"), "{body}");
    }
}

#[test]
fn test_missing_file_fails_at_render() {
    let dir = TempDir::new().unwrap();
    let template = factory(&dir).from_location(Path::new("later.tera")).unwrap();
    assert!(template.render(()).is_err());

    write_template(dir.path(), "later.tera", "now present");
    assert_eq!(template.render(()).unwrap(), "now present");
}

#[test]
fn test_builtins_from_file() {
    let dir = TempDir::new().unwrap();
    write_template(
        dir.path(),
        "builtins.tera",
        concat!(
            r#"{% set items = c(key="items") %}{% set html = c(key="html") %}"#,
            r#"{{ f(name="join", args=[items, ", "]) }}|{{ f(name="escape_html", args=html) }}"#,
        ),
    );

    let factory = TemplateFactory::new(
        Arc::new(FileEvaluatorFactory::with_base_dir(dir.path())),
        object(json!({})),
        builtin_registry(),
    );
    let template = factory.from_location(Path::new("builtins.tera")).unwrap();
    let rendered = template.render(json!({"items": ["a", "b"], "html": "<b>"})).unwrap();
    assert_eq!(rendered, "a, b|&lt;b&gt;");
}

#[test]
fn test_nested_directories_resolved_against_base() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "mail/welcome.tera", r#"Welcome {{ c(key="name") }}"#);

    let template = factory(&dir).from_location(Path::new("mail/welcome.tera")).unwrap();
    assert_eq!(template.location(), Some(dir.path().join("mail/welcome.tera").as_path()));
    assert_eq!(template.render(json!({"name": "bo"})).unwrap(), "Welcome bo");
}
