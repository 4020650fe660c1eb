// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label selector matching for snapshot reads.
//!
//! The lister filters the cached `Ingress` objects with a [`LabelSelector`]
//! before the reconciler derives hosts entries from them. The default selector
//! is [`LabelSelector::everything`], which matches every object.
//!
//! # Example
//!
//! ```rust
//! use ingress_hosts::selector::LabelSelector;
//! use std::collections::BTreeMap;
//!
//! let selector: LabelSelector = "app=web".parse().unwrap();
//! let labels = BTreeMap::from([("app".to_string(), "web".to_string())]);
//! assert!(selector.matches(&labels));
//! assert!(LabelSelector::everything().matches(&BTreeMap::new()));
//! ```

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Label selector to match Kubernetes resources.
///
/// The result of matchLabels and matchExpressions are `ANDed`. An empty label
/// selector matches all objects.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Map of {key,value} pairs that must all be present on the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,

    /// List of label selector requirements. All requirements must be satisfied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_expressions: Option<Vec<LabelSelectorRequirement>>,
}

/// A label selector requirement relates a key to a set of values via an operator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelSelectorRequirement {
    /// The label key that the selector applies to.
    pub key: String,

    /// Valid operators are `In`, `NotIn`, `Exists` and `DoesNotExist`.
    pub operator: String,

    /// Values for `In` and `NotIn`; ignored by `Exists` and `DoesNotExist`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl LabelSelector {
    /// The selector that matches every object.
    #[must_use]
    pub fn everything() -> Self {
        Self::default()
    }

    /// Returns `true` if this selector has no requirements.
    #[must_use]
    pub fn is_everything(&self) -> bool {
        self.match_labels.as_ref().is_none_or(BTreeMap::is_empty)
            && self.match_expressions.as_ref().is_none_or(Vec::is_empty)
    }

    /// Check whether a set of labels satisfies this selector.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let labels_match = self.match_labels.as_ref().is_none_or(|required| {
            required
                .iter()
                .all(|(key, value)| labels.get(key) == Some(value))
        });

        labels_match
            && self
                .match_expressions
                .as_ref()
                .is_none_or(|exprs| exprs.iter().all(|expr| expr.matches(labels)))
    }
}

impl LabelSelectorRequirement {
    /// Check a single requirement. Unknown operators never match.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        let values = self.values.as_deref().unwrap_or_default();

        match self.operator.as_str() {
            "In" => value.is_some_and(|v| values.contains(v)),
            "NotIn" => value.is_none_or(|v| !values.contains(v)),
            "Exists" => value.is_some(),
            "DoesNotExist" => value.is_none(),
            _ => false,
        }
    }
}

impl FromStr for LabelSelector {
    type Err = ConfigError;

    /// Parse the `key=value,key2=value2` form. Blank input selects everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut match_labels = BTreeMap::new();

        for term in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let invalid = |reason: &str| ConfigError::InvalidSelector {
                selector: s.to_string(),
                reason: reason.to_string(),
            };

            let (key, value) = term
                .split_once('=')
                .ok_or_else(|| invalid("expected key=value"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(invalid("label key must not be empty"));
            }
            if match_labels
                .insert(key.to_string(), value.trim().to_string())
                .is_some()
            {
                return Err(invalid("duplicate label key"));
            }
        }

        if match_labels.is_empty() {
            return Ok(Self::everything());
        }

        Ok(Self {
            match_labels: Some(match_labels),
            match_expressions: None,
        })
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
