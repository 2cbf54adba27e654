//! Settings binding scenarios through the public API

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use flowexpr::{Binder, ErrorKind, Evaluator, build_path, parse_path};

fn binder() -> Binder {
    Binder::new(Arc::new(Evaluator::default()))
}

#[rstest]
#[case("Hello {{item.name}}!", json!("Hello Ada!"))]
#[case("{{ item.name }}", json!("Ada"))]
#[case("{{ item.count }}", json!(42))]
#[case("{{ item.count > 10 }}", json!(true))]
#[case("{{ item.missing }}", json!(null))]
#[case("count: {{item.count}}, name: {{item.name}}", json!("count: 42, name: Ada"))]
#[case("  {{ item.count }}  ", json!("  42  "))]
#[case("{{ item.name }} ", json!("Ada "))]
#[case("{{}} is not a template", json!("{{}} is not a template"))]
#[case("plain", json!("plain"))]
fn bind_string_cases(#[case] template: &str, #[case] expected: serde_json::Value) {
    let item = json!({"name": "Ada", "count": 42});
    let bound = binder().bind_string(&item, template).unwrap();
    assert_eq!(bound, expected, "{template}");
}

#[test]
fn whole_string_template_preserves_containers() {
    let item = json!({"tags": ["a", "b"], "meta": {"k": 1}});
    let b = binder();
    assert_eq!(b.bind_string(&item, "{{ item.tags }}").unwrap(), json!(["a", "b"]));
    assert_eq!(b.bind_string(&item, "{{ item.meta }}").unwrap(), json!({"k": 1}));
}

#[test]
fn mixed_text_stringifies_containers() {
    let item = json!({"tags": ["a", "b"]});
    let bound = binder().bind_string(&item, "tags: {{ item.tags }}").unwrap();
    // ECMAScript array-to-string: comma-joined elements
    assert_eq!(bound, json!("tags: a,b"));
}

#[test]
fn nested_settings_bind_recursively() {
    let item = json!({"user": {"name": "Ada", "id": 7}});
    let settings = json!({
        "subject": "Welcome {{ item.user.name }}",
        "routing": {
            "target": "user-{{ item.user.id }}",
            "retries": 3,
            "flags": [true, "{{ item.user.id > 5 }}"]
        }
    });
    let bound = binder().bind_value(&item, &settings).unwrap();
    assert_eq!(
        bound,
        json!({
            "subject": "Welcome Ada",
            "routing": {
                "target": "user-7",
                "retries": 3,
                "flags": [true, true]
            }
        })
    );
}

#[test]
fn failed_expression_aborts_with_path() {
    let settings = json!({
        "ok": "{{ 1 + 1 }}",
        "outer": {"list": ["fine", "{{ boom( }}"]}
    });
    let err = binder().bind_value(&json!({}), &settings).unwrap_err();
    assert_eq!(err.path, "outer.list[1]");
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn security_failure_surfaces_kind() {
    let err = binder()
        .bind_string(&json!({}), "{{ require('fs') }}")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Security);
}

#[test]
fn bind_to_struct_marshals_native_types() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct HttpSettings {
        url: String,
        timeout_ms: f64,
        verify_tls: bool,
    }

    let item = json!({"host": "api.example.com", "timeout": 2500, "secure": true});
    let settings = json!({
        "url": "https://{{ item.host }}/v1",
        "timeout_ms": "{{ item.timeout }}",
        "verify_tls": "{{ item.secure }}"
    });
    let bound: HttpSettings = binder().bind_to_struct(&item, &settings).unwrap();
    assert_eq!(
        bound,
        HttpSettings {
            url: "https://api.example.com/v1".to_string(),
            timeout_ms: 2500.0,
            verify_tls: true,
        }
    );
}

#[test]
fn bind_to_struct_mismatch_is_type_error() {
    #[derive(serde::Deserialize, Debug)]
    struct Settings {
        #[allow(dead_code)]
        port: u16,
    }
    let err = binder()
        .bind_to_struct::<Settings>(&json!({}), &json!({"port": "{{ 'not a number' }}"}))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn path_round_trip() {
    let segments = parse_path("items[0].name").unwrap();
    assert_eq!(build_path(&segments), "items[0].name");
}
