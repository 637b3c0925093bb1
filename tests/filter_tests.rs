use serde_json::json;
use sylva::expr::ExprError;
use sylva::filter::{FilterError, FilterOp, Operand};
use sylva::{Filter, Record, Value};

fn sample() -> Record {
    Record::try_from(json!({
        "header": {
            "identifier": {"_text": "oai:example.com:1234"},
            "setSpec": [{"_text": "alpha"}, {"_text": "beta"}],
        },
        "metadata": {
            "title": {"_text": "The Voyage"},
            "year": 1851,
            "score": 4.5,
            "subjects": ["whaling", "sea"],
            "available": true,
            "note": null,
        },
    }))
    .unwrap()
}

fn filter(expr: serde_json::Value) -> Filter {
    Filter::new(&Value::from(expr)).unwrap()
}

fn matches(expr: serde_json::Value) -> bool {
    filter(expr).matches(&sample()).unwrap()
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_eq_path_against_literal() {
    assert!(matches(json!(["eq", "metadata.title._text", "The Voyage"])));
    assert!(!matches(json!(["eq", "metadata.title._text", "Another"])));
}

#[test]
fn test_eq_numeric_value() {
    assert!(matches(json!(["eq", "metadata.year", 1851])));
}

#[test]
fn test_eq_integer_against_float() {
    assert!(matches(json!(["eq", "metadata.year", 1851.0])));
    assert!(!matches(json!(["eq", "metadata.year", 1851.5])));
}

#[test]
fn test_eq_segment_list_path() {
    assert!(matches(json!([
        "eq",
        ["header", "setSpec", 0, "_text"],
        "alpha"
    ])));
}

#[test]
fn test_eq_missing_path_resolves_to_null() {
    assert!(matches(json!(["eq", "metadata.absent", null])));
}

#[test]
fn test_eq_dotless_strings_are_literals() {
    assert!(matches(json!(["eq", "same", "same"])));
    assert!(!matches(json!(["eq", "same", "other"])));
}

#[test]
fn test_eq_dotted_literal_is_taken_as_path() {
    // "1851.0" contains a dot, so it resolves (to nothing) instead of
    // comparing as text.
    assert!(!matches(json!(["eq", "metadata.year", "1851.0"])));
}

#[test]
fn test_eq_literal_with_dot_via_typed_operand() {
    let mut rec = Record::new();
    rec.insert("version", Value::String("1.0".to_string()));

    let op = FilterOp::Eq(
        Operand::Path(vec!["version".to_string()]),
        Operand::Literal(Value::String("1.0".to_string())),
    );
    assert!(Filter::from(op).matches(&rec).unwrap());
}

#[test]
fn test_eq_compares_records_ignoring_key_order() {
    let mut first = Record::new();
    first.insert("a", Value::Integer(1));
    first.insert("b", Value::Integer(2));
    let mut second = Record::new();
    second.insert("b", Value::Integer(2));
    second.insert("a", Value::Integer(1));

    let op = FilterOp::Eq(
        Operand::Literal(Value::Record(first)),
        Operand::Literal(Value::Record(second)),
    );
    assert!(Filter::from(op).matches(&Record::new()).unwrap());
}

#[test]
fn test_neq() {
    assert!(matches(json!(["neq", "metadata.year", 1900])));
    assert!(!matches(json!(["neq", "metadata.year", 1851])));
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_gt_and_lt_integers() {
    assert!(matches(json!(["gt", "metadata.year", 1800])));
    assert!(!matches(json!(["gt", "metadata.year", 1851])));
    assert!(matches(json!(["lt", "metadata.year", 1900])));
}

#[test]
fn test_gte_and_lte_boundaries() {
    assert!(matches(json!(["gte", "metadata.year", 1851])));
    assert!(matches(json!(["lte", "metadata.year", 1851])));
    assert!(!matches(json!(["gte", "metadata.year", 1852])));
}

#[test]
fn test_ordering_across_integer_and_float() {
    assert!(matches(json!(["gt", "metadata.year", 1850.5])));
    assert!(matches(json!(["gte", "metadata.year", 1851.0])));
    assert!(matches(json!(["gt", "metadata.score", 4])));
}

#[test]
fn test_ordering_strings() {
    assert!(matches(json!(["lt", "metadata.title._text", "Zanzibar"])));
    assert!(matches(json!(["gt", "metadata.title._text", "Aardvark"])));
}

#[test]
fn test_ordering_incomparable_types_is_an_error() {
    let result = filter(json!(["gt", ["metadata"], 1])).matches(&sample());
    assert!(matches!(
        result,
        Err(FilterError::Incomparable { left: "record", right: "integer" })
    ));
}

// ============================================================================
// Containment and Existence
// ============================================================================

#[test]
fn test_contains_list_element() {
    assert!(matches(json!(["contains", "metadata.subjects", "whaling"])));
    assert!(!matches(json!(["contains", "metadata.subjects", "trains"])));
}

#[test]
fn test_contains_substring() {
    assert!(matches(json!(["contains", "metadata.title._text", "Voyage"])));
    assert!(!matches(json!(["contains", "metadata.title._text", "voyage"])));
}

#[test]
fn test_contains_record_key() {
    assert!(matches(json!(["contains", ["metadata"], "year"])));
    assert!(!matches(json!(["contains", ["metadata"], "absent"])));
}

#[test]
fn test_contains_on_scalar_is_false() {
    assert!(!matches(json!(["contains", "metadata.year", 1])));
}

#[test]
fn test_exists() {
    assert!(matches(json!(["exists", "header.identifier._text"])));
    assert!(!matches(json!(["exists", "header.absent"])));
}

#[test]
fn test_exists_is_false_for_null_values() {
    assert!(!matches(json!(["exists", "metadata.note"])));
}

// ============================================================================
// Boolean Combinators
// ============================================================================

#[test]
fn test_not_inverts() {
    assert!(!matches(json!(["not", ["eq", "metadata.year", 1851]])));
    assert!(matches(json!(["not", ["eq", "metadata.year", 1900]])));
}

#[test]
fn test_not_without_argument_is_true() {
    assert!(matches(json!(["not"])));
}

#[test]
fn test_and() {
    assert!(matches(json!([
        "and",
        ["eq", "metadata.year", 1851],
        ["exists", "metadata.title._text"]
    ])));
    assert!(!matches(json!([
        "and",
        ["eq", "metadata.year", 1851],
        ["eq", "metadata.year", 1900]
    ])));
}

#[test]
fn test_and_without_arguments_is_true() {
    assert!(matches(json!(["and"])));
}

#[test]
fn test_and_single_argument_behaves_as_inner() {
    assert!(!matches(json!(["and", ["false"]])));
}

#[test]
fn test_or() {
    assert!(matches(json!([
        "or",
        ["eq", "metadata.year", 1900],
        ["eq", "metadata.year", 1851]
    ])));
    assert!(!matches(json!([
        "or",
        ["eq", "metadata.year", 1900],
        ["eq", "metadata.year", 2000]
    ])));
}

#[test]
fn test_or_without_arguments_is_true() {
    assert!(matches(json!(["or"])));
}

#[test]
fn test_constants() {
    assert!(matches(json!(["true"])));
    assert!(!matches(json!(["false"])));
}

#[test]
fn test_and_short_circuits() {
    // The second condition would error; the first settles the result.
    let result = filter(json!(["and", ["false"], ["gt", ["metadata"], 1]])).matches(&sample());
    assert_eq!(result.unwrap(), false);
}

#[test]
fn test_or_short_circuits() {
    let result = filter(json!(["or", ["true"], ["gt", ["metadata"], 1]])).matches(&sample());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn test_unknown_operator_never_matches() {
    assert!(!matches(json!(["within", "metadata.year", 1851])));
}

// ============================================================================
// Compilation Errors
// ============================================================================

#[test]
fn test_empty_expression() {
    let result = Filter::new(&Value::from(json!([])));
    assert!(matches!(result, Err(ExprError::Empty)));
}

#[test]
fn test_expression_must_be_a_list() {
    let result = Filter::new(&Value::from(json!("eq")));
    assert!(matches!(result, Err(ExprError::Malformed(_))));
}

#[test]
fn test_operator_must_be_a_string() {
    let result = Filter::new(&Value::from(json!([42, 1, 2])));
    assert!(matches!(result, Err(ExprError::Malformed(_))));
}

#[test]
fn test_eq_arity() {
    let result = Filter::new(&Value::from(json!(["eq", "metadata.year"])));
    assert!(matches!(
        result,
        Err(ExprError::Arity { found: 1, .. })
    ));
}

#[test]
fn test_exists_arity() {
    let result = Filter::new(&Value::from(json!(["exists"])));
    assert!(matches!(result, Err(ExprError::Arity { found: 0, .. })));
}

#[test]
fn test_not_arity() {
    let result = Filter::new(&Value::from(json!(["not", ["true"], ["true"]])));
    assert!(matches!(result, Err(ExprError::Arity { found: 2, .. })));
}

#[test]
fn test_constants_take_no_arguments() {
    let result = Filter::new(&Value::from(json!(["true", 1])));
    assert!(matches!(result, Err(ExprError::Arity { .. })));
}

#[test]
fn test_segment_list_rejects_non_string_segments() {
    let result = Filter::new(&Value::from(json!(["exists", [true]])));
    assert!(matches!(result, Err(ExprError::Malformed(_))));
}
