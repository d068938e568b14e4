#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end translation tests with document-style fragments.

use qp_filter::{FilterError, FilterRule, FilterSpec, QueryParams, parsers, translate};
use serde_json::{Value, json};

fn dispatcher_spec() -> FilterSpec<Value> {
    FilterSpec::new()
        .with(
            "category",
            FilterRule::single(parsers::non_empty_string, |v| json!({ "category": v })),
        )
        .with(
            "subcategory",
            FilterRule::single(parsers::non_empty_string, |v| json!({ "subcategory": v }))
                .excluded_by(["work_area"]),
        )
        .with(
            "work_area",
            FilterRule::single(parsers::non_empty_string, |v| json!({ "work_area": v })),
        )
        .with(
            "dispatcher__department__id__in",
            FilterRule::many(parsers::uuid, |ids| {
                json!({ "dispatcher.department._id": { "$in": ids } })
            })
            .excluded_by(["dispatcher__id__in"]),
        )
        .with(
            "dispatcher__id__in",
            FilterRule::many(parsers::uuid, |ids| json!({ "dispatcher._id": { "$in": ids } })),
        )
        .with(
            "area__str_number__in",
            FilterRule::single(parsers::area_range, |numbers| {
                json!({ "area.str_number": { "$in": numbers } })
            }),
        )
}

#[test]
fn more_specific_filter_wins() {
    let spec = dispatcher_spec().with(
        "category",
        FilterRule::single(parsers::non_empty_string, |v| json!({ "category": v }))
            .excluded_by(["subcategory", "work_area"]),
    );
    let params = QueryParams::from_query_str("category=plumbing&subcategory=leak").unwrap();

    let q = translate(&params, &spec).unwrap();

    assert_eq!(q.fragments, vec![json!({ "subcategory": "leak" })]);
}

#[test]
fn dispatcher_id_suppresses_department() {
    let dept = "0190a4f6-0000-7000-8000-000000000001";
    let d1 = "0190a4f6-0000-7000-8000-000000000002";
    let d2 = "0190a4f6-0000-7000-8000-000000000003";
    let raw = format!(
        "dispatcher__department__id__in={dept}&dispatcher__id__in={d1}&dispatcher__id__in={d2}"
    );

    let q = translate(&QueryParams::from_query_str(&raw).unwrap(), &dispatcher_spec()).unwrap();

    assert_eq!(
        q.fragments,
        vec![json!({ "dispatcher._id": { "$in": [d1, d2] } })]
    );
}

#[test]
fn fragments_follow_first_seen_order() {
    let params = QueryParams::from_query_str("work_area=pipes&category=plumbing").unwrap();

    let q = translate(&params, &dispatcher_spec()).unwrap();

    assert_eq!(
        q.fragments,
        vec![json!({ "work_area": "pipes" }), json!({ "category": "plumbing" })]
    );
}

#[test]
fn unknown_keys_are_all_reported() {
    let params = QueryParams::from_query_str("zeta=1&category=x&alpha=2&limit=10").unwrap();

    let err = translate(&params, &dispatcher_spec()).unwrap_err();

    assert_eq!(
        err,
        FilterError::UnknownFilter(vec!["alpha".to_owned(), "zeta".to_owned()])
    );
}

#[test]
fn invalid_value_carries_parser_message() {
    let params = QueryParams::from_query_str("area__str_number__in=10-20").unwrap();

    let err = translate(&params, &dispatcher_spec()).unwrap_err();

    match err {
        FilterError::InvalidFilterValue { key, message } => {
            assert_eq!(key, "area__str_number__in");
            assert!(message.contains("single digits"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn area_range_fragment_is_sorted_set() {
    let params = QueryParams::from_query_str("area__str_number__in=3,1-2,2").unwrap();

    let q = translate(&params, &dispatcher_spec()).unwrap();

    assert_eq!(
        q.fragments,
        vec![json!({ "area.str_number": { "$in": ["1", "2", "3"] } })]
    );
}

#[test]
fn reversed_area_range_is_rejected() {
    let params = QueryParams::from_query_str("area__str_number__in=7-5").unwrap();

    let err = translate(&params, &dispatcher_spec()).unwrap_err();

    assert!(matches!(
        err,
        FilterError::InvalidFilterValue { ref key, .. } if key == "area__str_number__in"
    ));
}

#[test]
fn excluded_required_rule_is_missing() {
    let spec = dispatcher_spec().with(
        "subcategory",
        FilterRule::single(parsers::non_empty_string, |v| json!({ "subcategory": v }))
            .excluded_by(["work_area"])
            .required(),
    );
    let params = QueryParams::from_query_str("subcategory=leak&work_area=pipes").unwrap();

    let err = translate(&params, &spec).unwrap_err();

    assert_eq!(
        err,
        FilterError::MissingRequiredFilter(vec!["subcategory".to_owned()])
    );
}
