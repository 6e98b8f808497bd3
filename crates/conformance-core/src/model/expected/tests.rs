// crates/conformance-core/src/model/expected/tests.rs
// ============================================================================
// Module: Expected Attribute Tests
// Description: Unit tests for the tri-state attribute matcher.
// Purpose: Validate that absent, empty, and patterned values stay distinct.
// Dependencies: conformance-core, proptest
// ============================================================================

//! ## Overview
//! Exercises matcher semantics, rendering, and pattern equality.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use proptest::prelude::*;

use super::AttrPattern;
use super::Expected;
use super::describe_actual;

#[test]
fn absent_matches_only_missing_values() {
    assert!(Expected::Absent.matches(None));
    assert!(!Expected::Absent.matches(Some("")));
    assert!(!Expected::Absent.matches(Some("value")));
}

#[test]
fn exact_empty_is_not_absent() {
    let expected = Expected::exact("");
    assert!(expected.matches(Some("")));
    assert!(!expected.matches(None));
    assert!(!expected.matches(Some(" ")));
}

#[test]
fn pattern_requires_presence() {
    let expected = Expected::pattern(".*").unwrap();
    assert!(expected.matches(Some("")));
    assert!(expected.matches(Some("anything")));
    assert!(!expected.matches(None));
}

#[test]
fn pattern_searches_within_text() {
    let expected = Expected::pattern("role/[a-z]+_auth").unwrap();
    assert!(expected.matches(Some("arn:aws:iam::123456789012:role/api_auth_invocation_role")));
    assert!(!expected.matches(Some("arn:aws:iam::123456789012:user/api")));
}

#[test]
fn invalid_pattern_is_rejected() {
    let err = Expected::pattern("(unclosed").unwrap_err();
    assert!(err.to_string().starts_with("invalid attribute pattern"));
}

#[test]
fn from_option_maps_none_to_absent() {
    assert_eq!(Expected::from_option(None::<String>), Expected::Absent);
    assert_eq!(Expected::from_option(Some("x")), Expected::exact("x"));
}

#[test]
fn display_renders_each_state() {
    assert_eq!(Expected::Absent.to_string(), "<absent>");
    assert_eq!(Expected::exact("").to_string(), "\"\"");
    assert_eq!(Expected::pattern("^a$").unwrap().to_string(), "/^a$/");
    assert_eq!(describe_actual(None), "<absent>");
    assert_eq!(describe_actual(Some("300")), "\"300\"");
}

#[test]
fn patterns_compare_by_source() {
    assert_eq!(AttrPattern::new("a+").unwrap(), AttrPattern::new("a+").unwrap());
    assert_ne!(AttrPattern::new("a+").unwrap(), AttrPattern::new("a*").unwrap());
}

proptest! {
    #[test]
    fn exact_matches_only_identical_text(expected in ".{0,12}", actual in ".{0,12}") {
        let matcher = Expected::exact(expected.clone());
        prop_assert_eq!(matcher.matches(Some(&actual)), expected == actual);
        prop_assert!(!matcher.matches(None));
    }

    #[test]
    fn escaped_literal_pattern_matches_itself(text in "[ -~]{0,16}") {
        let matcher = Expected::pattern(&format!("^{}$", regex::escape(&text))).unwrap();
        prop_assert!(matcher.matches(Some(&text)));
    }
}
