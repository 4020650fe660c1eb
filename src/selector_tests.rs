// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `selector.rs`

use crate::errors::ConfigError;
use crate::selector::{LabelSelector, LabelSelectorRequirement};
use std::collections::BTreeMap;

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn requirement(key: &str, operator: &str, values: &[&str]) -> LabelSelectorRequirement {
    LabelSelectorRequirement {
        key: key.to_string(),
        operator: operator.to_string(),
        values: Some(values.iter().map(ToString::to_string).collect()),
    }
}

#[test]
fn test_everything_matches_any_labels() {
    let selector = LabelSelector::everything();

    assert!(selector.is_everything());
    assert!(selector.matches(&BTreeMap::new()));
    assert!(selector.matches(&labels(&[("app", "web")])));
}

#[test]
fn test_match_labels_requires_all_pairs() {
    let selector = LabelSelector {
        match_labels: Some(labels(&[("app", "web"), ("tier", "frontend")])),
        match_expressions: None,
    };

    assert!(selector.matches(&labels(&[
        ("app", "web"),
        ("tier", "frontend"),
        ("extra", "ignored"),
    ])));
    assert!(!selector.matches(&labels(&[("app", "web")])));
    assert!(!selector.matches(&labels(&[("app", "api"), ("tier", "frontend")])));
}

#[test]
fn test_match_expression_operators() {
    let present = labels(&[("env", "prod")]);
    let absent = BTreeMap::new();

    let in_req = requirement("env", "In", &["prod", "staging"]);
    assert!(in_req.matches(&present));
    assert!(!in_req.matches(&absent));

    let not_in = requirement("env", "NotIn", &["prod"]);
    assert!(!not_in.matches(&present));
    assert!(not_in.matches(&absent));

    let exists = requirement("env", "Exists", &[]);
    assert!(exists.matches(&present));
    assert!(!exists.matches(&absent));

    let does_not_exist = requirement("env", "DoesNotExist", &[]);
    assert!(!does_not_exist.matches(&present));
    assert!(does_not_exist.matches(&absent));
}

#[test]
fn test_unknown_operator_never_matches() {
    let req = requirement("env", "Gt", &["1"]);

    assert!(!req.matches(&labels(&[("env", "2")])));
    assert!(!req.matches(&BTreeMap::new()));
}

#[test]
fn test_labels_and_expressions_are_anded() {
    let selector = LabelSelector {
        match_labels: Some(labels(&[("app", "web")])),
        match_expressions: Some(vec![requirement("env", "In", &["prod"])]),
    };

    assert!(selector.matches(&labels(&[("app", "web"), ("env", "prod")])));
    assert!(!selector.matches(&labels(&[("app", "web"), ("env", "dev")])));
    assert!(!selector.matches(&labels(&[("env", "prod")])));
}

#[test]
fn test_parse_blank_selects_everything() {
    assert_eq!("".parse::<LabelSelector>(), Ok(LabelSelector::everything()));
    assert_eq!(" , ".parse::<LabelSelector>(), Ok(LabelSelector::everything()));
}

#[test]
fn test_parse_key_value_pairs() {
    let selector: LabelSelector = "app=web, tier = frontend".parse().unwrap();

    assert_eq!(
        selector.match_labels,
        Some(labels(&[("app", "web"), ("tier", "frontend")]))
    );
    assert!(selector.match_expressions.is_none());
}

#[test]
fn test_parse_rejects_malformed_terms() {
    assert!(matches!(
        "app".parse::<LabelSelector>(),
        Err(ConfigError::InvalidSelector { .. })
    ));
    assert!(matches!(
        "=web".parse::<LabelSelector>(),
        Err(ConfigError::InvalidSelector { .. })
    ));
    assert!(matches!(
        "app=web,app=api".parse::<LabelSelector>(),
        Err(ConfigError::InvalidSelector { .. })
    ));
}
