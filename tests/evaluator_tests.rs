//! End-to-end evaluation scenarios through the public API

use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use flowexpr::{ErrorKind, Evaluator, EvaluatorOptions, ExpressionContext, Value};

fn ctx(item: serde_json::Value) -> ExpressionContext {
    ExpressionContext::with_item(Value::from(item))
}

#[rstest]
#[case("1 + 2", json!(3))]
#[case("2 ** 3 ** 2", json!(512))]
#[case("10 % 3", json!(1))]
#[case("-5 + +'3'", json!(-2))]
#[case("'a' + 1", json!("a1"))]
#[case("1 + '2'", json!("12"))]
#[case("!0", json!(true))]
#[case("1 < 2 == true", json!(true))]
#[case("'b' > 'a'", json!(true))]
#[case("'10' < '9'", json!(true))]
#[case("null == undefined", json!(true))]
#[case("(0 / 0) == (0 / 0)", json!(false))]
#[case("'1' == 1", json!(true))]
#[case("'1' === 1", json!(false))]
#[case("[1, 2] === [1, 2]", json!(true))]
#[case("true ? 'yes' : 'no'", json!("yes"))]
#[case("null ?? false ?? 'x'", json!(false))]
#[case("[1, 2, 3].length", json!(3))]
#[case("'hello'.length", json!(5))]
#[case("{a: 1, b: 2}.b", json!(2))]
fn evaluates_to(#[case] source: &str, #[case] expected: serde_json::Value) {
    let result = Evaluator::default().evaluate(source, &ExpressionContext::default());
    assert!(result.success, "{source}: {:?}", result.error);
    assert_eq!(serde_json::Value::from(result.value), expected, "{source}");
}

#[test]
fn item_access_against_json_data() {
    let context = ctx(json!({
        "name": "Ada",
        "count": 42,
        "items": [{"price": 10.5}, {"price": 2.0}],
    }));
    let evaluator = Evaluator::default();

    let result = evaluator.evaluate("item.count > 10", &context);
    assert_eq!(result.value, Value::Bool(true));

    let result = evaluator.evaluate("item.items[0].price + item.items[1].price", &context);
    assert_eq!(result.value, Value::Number(12.5));

    let result = evaluator.evaluate("item.items[-1]", &context);
    assert_eq!(result.value, Value::Null);

    let result = evaluator.evaluate("item.nothing.at.all", &context);
    assert!(result.success);
    assert_eq!(result.value, Value::Null);
}

#[test]
fn result_values_are_native_types() {
    let evaluator = Evaluator::default();
    let context = ctx(json!({"n": 2}));

    assert!(matches!(
        evaluator.evaluate("item.n * 2", &context).value,
        Value::Number(_)
    ));
    assert!(matches!(
        evaluator.evaluate("item.n > 1", &context).value,
        Value::Bool(_)
    ));
    assert!(matches!(
        evaluator.evaluate("[item.n]", &context).value,
        Value::Array(_)
    ));
    assert!(matches!(
        evaluator.evaluate("{v: item.n}", &context).value,
        Value::Object(_)
    ));
}

#[test]
fn builtin_pipeline() {
    let context = ctx(json!({"tags": " a, b , c "}));
    let result = Evaluator::default().evaluate(
        "item.tags.trim().split(',').map(t => t.trim()).join('|')",
        &context,
    );
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.value, Value::string("a|b|c"));
}

#[test]
fn higher_order_functions_compose() {
    let context = ctx(json!({"nums": [1, 2, 3, 4, 5]}));
    let evaluator = Evaluator::default();

    let result = evaluator.evaluate(
        "item.nums.filter(n => n % 2 == 1).map(n => n * n)",
        &context,
    );
    assert_eq!(
        result.value,
        Value::Array(vec![
            Value::Number(1.0),
            Value::Number(9.0),
            Value::Number(25.0)
        ])
    );

    let result = evaluator.evaluate("item.nums.some(n => n > 4)", &context);
    assert_eq!(result.value, Value::Bool(true));
    let result = evaluator.evaluate("item.nums.every(n => n > 0)", &context);
    assert_eq!(result.value, Value::Bool(true));
    let result = evaluator.evaluate("item.nums.find(n => n > 3)", &context);
    assert_eq!(result.value, Value::Number(4.0));
    let result = evaluator.evaluate("reduce(item.nums, (a, n) => a + n, 0)", &context);
    assert_eq!(result.value, Value::Number(15.0));
}

#[rstest]
#[case("require('fs')")]
#[case("process.exit(1)")]
#[case("globalThis.fetch('http://x')")]
#[case("constructor('return 1')")]
fn security_rejections(#[case] source: &str) {
    let result = Evaluator::default().evaluate(source, &ExpressionContext::default());
    assert!(!result.success, "{source} must be rejected");
    assert_eq!(result.error_kind, Some(ErrorKind::Security), "{source}");
}

#[test]
fn crypto_namespace_has_no_members() {
    let result = Evaluator::default().evaluate("Crypto.random()", &ExpressionContext::default());
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Security));
}

#[test]
fn complexity_gate_rejects_before_execution() {
    let evaluator = Evaluator::new(EvaluatorOptions::default().with_max_complexity(5.0));
    let result = evaluator.evaluate(
        "upper(lower(trim(join(split('a', ','), '-'))))",
        &ExpressionContext::default(),
    );
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Complexity));
}

#[test]
fn depth_gate_rejects_deep_nesting() {
    let evaluator = Evaluator::new(EvaluatorOptions::default().with_max_depth(3));
    let result = evaluator.evaluate("((((1))))* (2 + (3 + (4 + 5)))", &ExpressionContext::default());
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Complexity));
}

#[test]
fn timeout_interrupts_evaluation() {
    let evaluator = Evaluator::new(EvaluatorOptions::default().with_timeout(Duration::ZERO));
    let result = evaluator.evaluate("1", &ExpressionContext::default());
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Timeout));
}

#[test]
fn timeout_interrupts_long_running_walk() {
    // A small tree that passes the static gates but iterates 10k * 10k
    // times at runtime; the deadline check at each node must stop it
    // close to the 25ms budget, not after the full walk.
    let nums: Vec<serde_json::Value> = (0..10_000).map(|i| json!(i)).collect();
    let context = ctx(json!({"nums": nums}));
    let evaluator =
        Evaluator::new(EvaluatorOptions::default().with_timeout(Duration::from_millis(25)));

    let started = std::time::Instant::now();
    let result = evaluator.evaluate("item.nums.map(x => item.nums.map(y => y + 1))", &context);
    let elapsed = started.elapsed();

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Timeout));
    assert!(
        elapsed < Duration::from_secs(2),
        "walk ran {elapsed:?} past a 25ms budget"
    );
}

#[test]
fn evaluation_never_panics_on_garbage() {
    let evaluator = Evaluator::default();
    let context = ExpressionContext::default();
    for source in [
        "", "   ", "1 +", ")", "{{", "a.", "[1,", "'unterminated", "x => ",
        "1 ** ", "a b c", "@", "item..x", "f(,)",
    ] {
        let result = evaluator.evaluate(source, &context);
        assert!(!result.success, "{source:?} should fail cleanly");
        assert_eq!(result.error_kind, Some(ErrorKind::Syntax), "{source:?}");
    }
}

#[test]
fn failures_are_isolated_per_expression() {
    let evaluator = Evaluator::default();
    let context = ctx(json!({"n": 1}));
    assert!(!evaluator.evaluate("require('x')", &context).success);
    // the same evaluator keeps working afterwards
    let result = evaluator.evaluate("item.n + 1", &context);
    assert!(result.success);
    assert_eq!(result.value, Value::Number(2.0));
}

#[test]
fn concurrent_evaluation_shares_the_cache() {
    use std::sync::Arc;

    let evaluator = Arc::new(Evaluator::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let evaluator = Arc::clone(&evaluator);
            std::thread::spawn(move || {
                let context = ctx(json!({"n": i}));
                let result = evaluator.evaluate("item.n * 2", &context);
                assert!(result.success);
                result.value
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let stats = evaluator.cache_stats().unwrap();
    assert_eq!(stats.hits + stats.misses, 4);
    assert!(stats.entries >= 1);
}

#[test]
fn metadata_reports_dependencies_and_functions() {
    let evaluator = Evaluator::new(EvaluatorOptions::default().with_metrics(true));
    let context = ctx(json!({"price": 10}));
    let result = evaluator.evaluate("Math.round(item.price * 1.2)", &context);
    let metadata = result.metadata.expect("metrics enabled");
    assert_eq!(metadata.accessed_variables, vec!["item".to_string()]);
    assert_eq!(metadata.called_functions, vec!["Math.round".to_string()]);
    assert!(metadata.complexity > 0.0);
}

#[test]
fn json_namespace_round_trips_values() {
    let context = ctx(json!({"obj": {"a": 1}}));
    let evaluator = Evaluator::default();
    let result = evaluator.evaluate("JSON.parse(JSON.stringify(item.obj)).a", &context);
    assert_eq!(result.value, Value::Number(1.0));
}
