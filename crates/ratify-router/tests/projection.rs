//! Property tests: every accepted parameter set projects to a path that
//! matches back to the same parameters.

use proptest::prelude::*;
use ratify_core::{Field, NumberOptions};
use ratify_router::SegmentChain;
use serde_json::{json, Value};

fn assert_projects_back(chain: &SegmentChain, params: &Value) {
    let expected = chain
        .params_field()
        .validate(params)
        .expect("parameters must be accepted");
    let path = chain.project(params).expect("accepted parameters must project");
    let matched = chain
        .match_path(&path)
        .unwrap_or_else(|e| panic!("{path:?} did not match {chain}: {e}"));
    assert_eq!(matched.to_value(), expected, "round trip through {path:?}");
}

// The name capture ends at the first "-x", which plain percent-encoding
// leaves untouched.
fn named_chain() -> SegmentChain {
    SegmentChain::root()
        .literal("/v")
        .capture("name", Field::string())
        .literal("-x")
        .literal("/")
        .capture("id", Field::number())
}

fn float_chain() -> SegmentChain {
    SegmentChain::root()
        .literal("/p/")
        .capture("x", Field::number_with(NumberOptions::float()))
        .literal("/tail")
}

fn finite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

fn text_with_literal() -> impl Strategy<Value = String> {
    ("\\PC{0,6}", "\\PC{0,6}").prop_map(|(head, tail)| format!("{head}-x{tail}"))
}

proptest! {
    #[test]
    fn arbitrary_text_projects_back(
        name in any::<String>().prop_filter("non-empty", |s| !s.is_empty()),
        id in any::<i64>(),
    ) {
        assert_projects_back(&named_chain(), &json!({"name": name, "id": id}));
    }

    #[test]
    fn text_containing_next_literal_projects_back(name in text_with_literal(), id in any::<u64>()) {
        assert_projects_back(&named_chain(), &json!({"name": name, "id": id}));
    }

    #[test]
    fn int_captures_project_back(id in any::<i64>()) {
        let chain = SegmentChain::root().literal("/items/").capture("id", Field::number());
        assert_projects_back(&chain, &json!({"id": id}));
    }

    #[test]
    fn integral_floats_project_back_into_int_captures(x in finite_f64()) {
        let chain = SegmentChain::root().literal("/items/").capture("id", Field::number());
        assert_projects_back(&chain, &json!({"id": x.trunc()}));
    }

    #[test]
    fn float_captures_project_back(x in finite_f64()) {
        assert_projects_back(&float_chain(), &json!({"x": x}));
    }
}

#[test]
fn extreme_floats_project_back() {
    for x in [f64::MAX, f64::MIN, f64::MIN_POSITIVE, 5e-324, -0.0, 1e-7, 1e20, 1e300] {
        assert_projects_back(&float_chain(), &json!({"x": x}));
    }
}
