use serde_json::json;
use sylva::expr::ExprError;
use sylva::transform::{CustomFn, TransformError, TransformOp};
use sylva::{Record, Transform, Value};

fn sample() -> Record {
    Record::try_from(json!({
        "header": {
            "identifier": {"_text": "oai:example.com:1234"},
            "setSpec": [{"_text": "alpha"}, {"_text": "beta"}],
        },
        "metadata": {
            "title": {"_text": "The Voyage"},
            "creator": {"first": "H.", "last": "Melville"},
            "date": {"_text": "1851-10-18"},
            "subjects": ["whaling", "sea"],
            "year": 1851,
        },
    }))
    .unwrap()
}

fn transform(expr: serde_json::Value) -> Transform {
    Transform::new(&Value::from(expr)).unwrap()
}

fn apply(expr: serde_json::Value) -> Record {
    transform(expr).apply(&sample()).unwrap()
}

// ============================================================================
// Single Operators
// ============================================================================

#[test]
fn test_static_writes_literal() {
    let out = apply(json!(["static", "kind", "book"]));
    assert_eq!(out.get("kind"), Some(Value::String("book".to_string())));
    assert_eq!(out.len(), 1);
}

#[test]
fn test_static_creates_nested_target() {
    let out = apply(json!(["static", "source.kind", "book"]));
    assert_eq!(out.get("source.kind"), Some(Value::String("book".to_string())));
}

#[test]
fn test_copy_resolves_source_path() {
    let out = apply(json!(["copy", "title", "metadata.title._text"]));
    assert_eq!(out.get("title"), Some(Value::String("The Voyage".to_string())));
}

#[test]
fn test_copy_missing_source_writes_null() {
    let out = apply(json!(["copy", "gap", "metadata.absent"]));
    assert_eq!(out.get("gap"), Some(Value::Null));
}

#[test]
fn test_copy_projects_list_sources() {
    let out = apply(json!(["copy", "sets", "header.setSpec._text"]));
    assert_eq!(
        out.get("sets"),
        Some(Value::List(vec![
            Value::String("alpha".to_string()),
            Value::String("beta".to_string()),
        ]))
    );
}

#[test]
fn test_copy_accepts_segment_list_source() {
    let out = apply(json!(["copy", "first", ["header", "setSpec", 0, "_text"]]));
    assert_eq!(out.get("first"), Some(Value::String("alpha".to_string())));
}

#[test]
fn test_fill_writes_default_when_missing() {
    let out = apply(json!(["fill", "language", "en"]));
    assert_eq!(out.get("language"), Some(Value::String("en".to_string())));
}

#[test]
fn test_fill_carries_existing_value() {
    let out = apply(json!(["fill", "metadata.year", 0]));
    assert_eq!(out.get("metadata.year"), Some(Value::Integer(1851)));
}

#[test]
fn test_fill_treats_null_as_missing() {
    let rec = Record::try_from(json!({"gap": null})).unwrap();
    let out = transform(json!(["fill", "gap", "filled"]))
        .apply(&rec)
        .unwrap();
    assert_eq!(out.get("gap"), Some(Value::String("filled".to_string())));
}

#[test]
fn test_split_string_source() {
    let out = apply(json!(["split", "date.part{}", "-", "metadata.date._text"]));
    assert_eq!(out.get("date.part1"), Some(Value::String("1851".to_string())));
    assert_eq!(out.get("date.part2"), Some(Value::String("10".to_string())));
    assert_eq!(out.get("date.part3"), Some(Value::String("18".to_string())));
}

#[test]
fn test_split_list_source_spreads_elements() {
    let out = apply(json!(["split", "subject{}", "-", "metadata.subjects"]));
    assert_eq!(out.get("subject1"), Some(Value::String("whaling".to_string())));
    assert_eq!(out.get("subject2"), Some(Value::String("sea".to_string())));
}

#[test]
fn test_split_target_without_placeholder_keeps_last_part() {
    let out = apply(json!(["split", "only", "-", "metadata.date._text"]));
    assert_eq!(out.get("only"), Some(Value::String("18".to_string())));
}

#[test]
fn test_split_missing_source_writes_nothing() {
    let out = apply(json!(["split", "part{}", "-", "metadata.absent"]));
    assert!(out.is_empty());
}

#[test]
fn test_split_empty_splitter_is_an_error() {
    let result = transform(json!(["split", "part{}", "", "metadata.date._text"]))
        .apply(&sample());
    assert!(matches!(result, Err(TransformError::EmptySplitter)));
}

#[test]
fn test_split_empty_splitter_with_missing_source_is_fine() {
    let out = apply(json!(["split", "part{}", "", "metadata.absent"]));
    assert!(out.is_empty());
}

#[test]
fn test_combine_collects_sources() {
    let out = apply(json!([
        "combine",
        "fields",
        "metadata.title._text",
        "metadata.date._text"
    ]));
    assert_eq!(
        out.get("fields"),
        Some(Value::List(vec![
            Value::String("The Voyage".to_string()),
            Value::String("1851-10-18".to_string()),
        ]))
    );
}

#[test]
fn test_combine_keeps_null_slots() {
    let out = apply(json!(["combine", "pair", "metadata.year", "metadata.absent"]));
    assert_eq!(
        out.get("pair"),
        Some(Value::List(vec![Value::Integer(1851), Value::Null]))
    );
}

#[test]
fn test_join_list_source() {
    let out = apply(json!(["join", "subjects", ", ", "metadata.subjects"]));
    assert_eq!(
        out.get("subjects"),
        Some(Value::String("whaling, sea".to_string()))
    );
}

#[test]
fn test_join_scalar_source_stringifies() {
    let out = apply(json!(["join", "year", "-", "metadata.year"]));
    assert_eq!(out.get("year"), Some(Value::String("1851".to_string())));
}

#[test]
fn test_join_missing_source_writes_nothing() {
    let out = apply(json!(["join", "gap", "-", "metadata.absent"]));
    assert!(out.is_empty());
}

#[test]
fn test_join_falsy_source_writes_nothing() {
    let rec = Record::try_from(json!({"empty": ""})).unwrap();
    let out = transform(json!(["join", "gap", "-", "empty"]))
        .apply(&rec)
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_join_multiple_sources() {
    let out = apply(json!([
        "join",
        "name",
        " ",
        "metadata.creator.first",
        "metadata.creator.last"
    ]));
    assert_eq!(out.get("name"), Some(Value::String("H. Melville".to_string())));
}

#[test]
fn test_join_multiple_sources_require_all_present() {
    let out = apply(json!([
        "join",
        "name",
        " ",
        "metadata.creator.first",
        "metadata.creator.middle"
    ]));
    assert!(out.is_empty());
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn test_sequence_threads_output_into_next_stage() {
    let out = apply(json!([
        "sequence",
        ["copy", "t", "metadata.title._text"],
        ["split", "word{}", " ", "t"]
    ]));
    assert_eq!(out.get("word1"), Some(Value::String("The".to_string())));
    assert_eq!(out.get("word2"), Some(Value::String("Voyage".to_string())));
    assert_eq!(out.get("t"), None);
}

#[test]
fn test_empty_sequence_produces_empty_record() {
    let out = apply(json!(["sequence"]));
    assert!(out.is_empty());
}

#[test]
fn test_parallel_merges_outputs() {
    let out = apply(json!([
        "parallel",
        ["static", "about.kind", "book"],
        ["copy", "about.title", "metadata.title._text"]
    ]));
    assert_eq!(out.get("about.kind"), Some(Value::String("book".to_string())));
    assert_eq!(
        out.get("about.title"),
        Some(Value::String("The Voyage".to_string()))
    );
}

#[test]
fn test_parallel_concatenates_list_targets() {
    let out = apply(json!([
        "parallel",
        ["combine", "all", "metadata.title._text"],
        ["combine", "all", "metadata.date._text"]
    ]));
    assert_eq!(
        out.get("all"),
        Some(Value::List(vec![
            Value::String("The Voyage".to_string()),
            Value::String("1851-10-18".to_string()),
        ]))
    );
}

#[test]
fn test_top_level_list_is_implicit_parallel() {
    let out = apply(json!([
        ["static", "a", 1],
        ["static", "b", 2]
    ]));
    assert_eq!(out.get("a"), Some(Value::Integer(1)));
    assert_eq!(out.get("b"), Some(Value::Integer(2)));
}

#[test]
fn test_custom_operator_calls_function() {
    let op = TransformOp::Custom {
        target: "label".to_string(),
        func: CustomFn::new(|record: &Record| {
            let title = record
                .get("metadata.title._text")
                .unwrap_or(Value::Null)
                .as_string();
            Value::String(title.to_uppercase())
        }),
    };
    let out = Transform::from(op).apply(&sample()).unwrap();
    assert_eq!(out.get("label"), Some(Value::String("THE VOYAGE".to_string())));
}

#[test]
fn test_apply_does_not_mutate_input() {
    let rec = sample();
    let before = rec.clone();
    transform(json!(["copy", "title", "metadata.title._text"]))
        .apply(&rec)
        .unwrap();
    assert_eq!(rec, before);
}

// ============================================================================
// Compilation Errors
// ============================================================================

#[test]
fn test_unknown_operator_is_rejected() {
    let result = Transform::new(&Value::from(json!(["frobnicate", "a", "b"])));
    assert!(matches!(result, Err(ExprError::UnknownOperator(_))));
}

#[test]
fn test_custom_has_no_literal_form() {
    let result = Transform::new(&Value::from(json!(["custom", "target"])));
    assert!(matches!(result, Err(ExprError::Malformed(_))));
}

#[test]
fn test_static_arity() {
    let result = Transform::new(&Value::from(json!(["static", "a"])));
    assert!(matches!(result, Err(ExprError::Arity { found: 1, .. })));
}

#[test]
fn test_copy_arity() {
    let result = Transform::new(&Value::from(json!(["copy", "a", "b", "c"])));
    assert!(matches!(result, Err(ExprError::Arity { found: 3, .. })));
}

#[test]
fn test_split_arity() {
    let result = Transform::new(&Value::from(json!(["split", "a", "-"])));
    assert!(matches!(result, Err(ExprError::Arity { found: 2, .. })));
}

#[test]
fn test_combine_arity() {
    let result = Transform::new(&Value::from(json!(["combine", "a"])));
    assert!(matches!(result, Err(ExprError::Arity { found: 1, .. })));
}

#[test]
fn test_join_arity() {
    let result = Transform::new(&Value::from(json!(["join", "a", "-"])));
    assert!(matches!(result, Err(ExprError::Arity { found: 2, .. })));
}

#[test]
fn test_target_must_be_a_string() {
    let result = Transform::new(&Value::from(json!(["static", 1, 2])));
    assert!(matches!(result, Err(ExprError::Malformed(_))));
}

#[test]
fn test_source_must_be_a_path() {
    let result = Transform::new(&Value::from(json!(["copy", "t", 42])));
    assert!(matches!(result, Err(ExprError::Malformed(_))));
}

#[test]
fn test_empty_expression() {
    let result = Transform::new(&Value::from(json!([])));
    assert!(matches!(result, Err(ExprError::Empty)));
}
