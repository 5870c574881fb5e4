use gutcheck_types::{FilterOp, Predicate, QueryBuilder, SortDirection};
use pretty_assertions::assert_eq;
use serde_json::json;

fn meal(name: &str, calories: i64, date: &str) -> serde_json::Value {
    json!({
        "name": name,
        "date": date,
        "nutrition": { "calories": calories },
        "tags": ["home", "dinner"],
    })
}

// ── Predicates ───────────────────────────────────────────────────

#[test]
fn eq_matches_strings_and_numbers() {
    let doc = meal("Lunch", 450, "2026-10-01");
    assert!(Predicate::new("name", FilterOp::Eq, "Lunch").matches(&doc));
    assert!(Predicate::new("nutrition.calories", FilterOp::Eq, 450).matches(&doc));
    // integer and float forms compare numerically
    assert!(Predicate::new("nutrition.calories", FilterOp::Eq, 450.0).matches(&doc));
    assert!(!Predicate::new("name", FilterOp::Eq, "Dinner").matches(&doc));
}

#[test]
fn range_operators() {
    let doc = meal("Lunch", 450, "2026-10-01");
    assert!(Predicate::new("nutrition.calories", FilterOp::Gt, 400).matches(&doc));
    assert!(Predicate::new("nutrition.calories", FilterOp::Ge, 450).matches(&doc));
    assert!(Predicate::new("nutrition.calories", FilterOp::Lt, 500).matches(&doc));
    assert!(Predicate::new("nutrition.calories", FilterOp::Le, 450).matches(&doc));
    assert!(!Predicate::new("nutrition.calories", FilterOp::Lt, 450).matches(&doc));
    assert!(Predicate::new("date", FilterOp::Ge, "2026-09-30").matches(&doc));
}

#[test]
fn mismatched_types_never_compare() {
    let doc = meal("Lunch", 450, "2026-10-01");
    assert!(!Predicate::new("nutrition.calories", FilterOp::Gt, "100").matches(&doc));
    assert!(!Predicate::new("name", FilterOp::Lt, 3).matches(&doc));
}

#[test]
fn missing_field_never_matches() {
    let doc = meal("Lunch", 450, "2026-10-01");
    assert!(!Predicate::new("severity", FilterOp::Eq, 3).matches(&doc));
    assert!(!Predicate::new("severity", FilterOp::Ne, 3).matches(&doc));
    assert!(!Predicate::new("nutrition.fat", FilterOp::Ge, 0).matches(&doc));
}

#[test]
fn contains_on_arrays_and_strings() {
    let doc = meal("Late Lunch", 450, "2026-10-01");
    assert!(Predicate::new("tags", FilterOp::Contains, "home").matches(&doc));
    assert!(!Predicate::new("tags", FilterOp::Contains, "work").matches(&doc));
    assert!(Predicate::new("name", FilterOp::Contains, "Lunch").matches(&doc));
    assert!(!Predicate::new("nutrition", FilterOp::Contains, "calories").matches(&doc));
}

#[test]
fn spec_requires_every_predicate() {
    let doc = meal("Lunch", 450, "2026-10-01");
    let spec = QueryBuilder::new()
        .where_eq("name", "Lunch")
        .filter("nutrition.calories", FilterOp::Lt, 400)
        .build();
    assert!(!spec.matches(&doc));

    let empty = QueryBuilder::new().build();
    assert!(empty.matches(&doc));
}

// ── Ordering / limit ─────────────────────────────────────────────

#[test]
fn sort_and_limit_orders_descending_then_truncates() {
    let spec = QueryBuilder::new()
        .order_by("date", SortDirection::Descending)
        .limit(2)
        .build();

    let sorted = spec.sort_and_limit(vec![
        meal("a", 1, "2026-10-01"),
        meal("b", 2, "2026-10-03"),
        meal("c", 3, "2026-10-02"),
    ]);

    let names: Vec<&str> = sorted.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn sort_is_stable_and_missing_fields_go_last() {
    let spec = QueryBuilder::new()
        .order_by("nutrition.calories", SortDirection::Ascending)
        .build();

    let sorted = spec.sort_and_limit(vec![
        json!({ "name": "no-nutrition" }),
        meal("x", 300, "2026-10-01"),
        meal("y", 100, "2026-10-01"),
        meal("z", 300, "2026-10-02"),
    ]);

    let names: Vec<&str> = sorted.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["y", "x", "z", "no-nutrition"]);
}

#[test]
fn no_ordering_keeps_input_order() {
    let spec = QueryBuilder::new().limit(10).build();
    let sorted = spec.sort_and_limit(vec![3, 1, 2]);
    assert_eq!(sorted, vec![3, 1, 2]);
}

#[test]
fn query_spec_serializes_for_the_wire() {
    let spec = QueryBuilder::new()
        .filter("severity", FilterOp::Ge, 3)
        .order_by("date", SortDirection::Descending)
        .limit(5)
        .build();

    let wire = serde_json::to_value(&spec).unwrap();
    assert_eq!(
        wire,
        json!({
            "predicates": [{ "field": "severity", "op": "ge", "value": 3 }],
            "order_by": [{ "field": "date", "direction": "descending" }],
            "limit": 5
        })
    );
}
