// tests/cli_tests.rs

use serde_json::json;

use sylva::cli::{execute_filter, execute_get, execute_transform, CliError, RunOptions};

fn options(input: serde_json::Value) -> RunOptions {
    RunOptions {
        input: Some(input.to_string()),
        pretty: false,
    }
}

// ============================================================================
// Get
// ============================================================================

#[test]
fn test_get_resolves_a_path() {
    let result = execute_get("a.b", &options(json!({"a": {"b": 7}}))).unwrap();
    assert_eq!(result, json!(7));
}

#[test]
fn test_get_missing_path_is_null() {
    let result = execute_get("a.z", &options(json!({"a": {"b": 7}}))).unwrap();
    assert_eq!(result, json!(null));
}

#[test]
fn test_get_maps_over_streams() {
    let input = options(json!([{"a": 1}, {"a": 2}, {"b": 3}]));
    let result = execute_get("a", &input).unwrap();
    assert_eq!(result, json!([1, 2, null]));
}

#[test]
fn test_get_wraps_scalar_input() {
    let result = execute_get("value", &options(json!(5))).unwrap();
    assert_eq!(result, json!(5));
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn test_filter_returns_matching_record() {
    let input = options(json!({"metadata": {"year": 1851}}));
    let result = execute_filter(r#"["gt", "metadata.year", 1800]"#, &input).unwrap();
    assert_eq!(result, json!({"metadata": {"year": 1851}}));
}

#[test]
fn test_filter_returns_null_for_non_match() {
    let input = options(json!({"metadata": {"year": 1851}}));
    let result = execute_filter(r#"["lt", "metadata.year", 1800]"#, &input).unwrap();
    assert_eq!(result, json!(null));
}

#[test]
fn test_filter_keeps_matching_stream_elements() {
    let input = options(json!([{"n": 1}, {"n": 5}, {"n": 3}]));
    let result = execute_filter(r#"["gt", ["n"], 2]"#, &input).unwrap();
    assert_eq!(result, json!([{"n": 5}, {"n": 3}]));
}

#[test]
fn test_filter_rejects_bad_arity() {
    let result = execute_filter(r#"["gt", ["n"]]"#, &options(json!({"n": 1})));
    assert!(matches!(result, Err(CliError::Expr(_))));
}

#[test]
fn test_filter_rejects_unparseable_expression() {
    let result = execute_filter("[nope", &options(json!({"n": 1})));
    assert!(matches!(result, Err(CliError::Json(_))));
}

#[test]
fn test_filter_reports_evaluation_errors() {
    let result = execute_filter(r#"["gt", ["a"], 1]"#, &options(json!({"a": {"b": 1}})));
    assert!(matches!(result, Err(CliError::Filter(_))));
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn test_transform_rewrites_a_record() {
    let input = options(json!({"meta": {"title": "The Voyage"}}));
    let result = execute_transform(r#"[["copy", "title", "meta.title"]]"#, &input).unwrap();
    assert_eq!(result, json!({"title": "The Voyage"}));
}

#[test]
fn test_transform_maps_over_streams() {
    let input = options(json!([{"a": 1}, {"a": 2}]));
    let result =
        execute_transform(r#"[["copy", "n", "a"], ["static", "kind", "x"]]"#, &input).unwrap();
    assert_eq!(
        result,
        json!([{"n": 1, "kind": "x"}, {"n": 2, "kind": "x"}])
    );
}

#[test]
fn test_transform_rejects_unknown_operators() {
    let result = execute_transform(r#"["mangle", "a", "b"]"#, &options(json!({})));
    assert!(matches!(result, Err(CliError::Expr(_))));
}

#[test]
fn test_transform_reports_application_errors() {
    let input = options(json!({"date": "2024-01-02"}));
    let result = execute_transform(r#"["split", "parts", "", "date"]"#, &input);
    assert!(matches!(result, Err(CliError::Transform(_))));
}

// ============================================================================
// Input Handling
// ============================================================================

#[test]
fn test_missing_input_is_an_error() {
    let result = execute_get("a", &RunOptions::default());
    assert!(matches!(result, Err(CliError::NoInput)));
}

#[test]
fn test_invalid_input_json_is_an_error() {
    let input = RunOptions {
        input: Some("{nope".to_string()),
        pretty: false,
    };
    let result = execute_get("a", &input);
    assert!(matches!(result, Err(CliError::Json(_))));
}
