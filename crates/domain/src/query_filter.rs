//! Link-field query filters handed to the host form's candidate pickers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single equality constraint value in a query filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Check field stored by the Document Service as `0`/`1`.
    Flag(bool),
    /// Plain text field.
    Text(String),
}

impl FilterValue {
    /// Returns the Document Service wire value.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Flag(flag) => Value::from(u8::from(*flag)),
            Self::Text(text) => Value::from(text.as_str()),
        }
    }

    /// Reports whether a raw Document Service value satisfies this constraint.
    #[must_use]
    pub fn matches_wire(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Flag(expected), Value::Bool(actual)) => expected == actual,
            (Self::Flag(expected), Value::Number(number)) => {
                number.as_i64().is_some_and(|actual| (actual != 0) == *expected)
            }
            (Self::Flag(expected), Value::Null) => !expected,
            (Self::Text(expected), Value::String(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// Conjunction of field equality constraints applied to a link search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    filters: BTreeMap<String, FilterValue>,
}

impl QueryFilter {
    /// Creates an empty filter that matches every candidate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a check-field constraint.
    #[must_use]
    pub fn with_flag(mut self, field: impl Into<String>, expected: bool) -> Self {
        self.filters.insert(field.into(), FilterValue::Flag(expected));
        self
    }

    /// Adds a text equality constraint.
    #[must_use]
    pub fn with_text(mut self, field: impl Into<String>, expected: impl Into<String>) -> Self {
        self.filters
            .insert(field.into(), FilterValue::Text(expected.into()));
        self
    }

    /// Returns the constraint for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.filters.get(field)
    }

    /// Iterates constraints in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.filters
            .iter()
            .map(|(field, value)| (field.as_str(), value))
    }

    /// Returns true when the filter has no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Renders the filter as the Document Service `filters` object.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        Value::Object(
            self.filters
                .iter()
                .map(|(field, value)| (field.clone(), value.to_wire()))
                .collect(),
        )
    }

    /// Reports whether a record satisfies every constraint.
    ///
    /// Missing fields are read as null, which satisfies only `false` flags.
    pub fn matches<'a, F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<&'a Value>,
    {
        self.filters
            .iter()
            .all(|(field, expected)| match lookup(field.as_str()) {
                Some(value) => expected.matches_wire(value),
                None => expected.matches_wire(&Value::Null),
            })
    }
}
