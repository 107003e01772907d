//! Host hook for `custom-rule` conditions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::Pathway;

/// Answers opaque `custom-rule` expressions on behalf of the engine.
///
/// The engine never interprets an expression itself. Returning `None` means
/// the host cannot answer; the condition then evaluates false and the pass
/// reports a diagnostic.
pub trait CustomConditionHost: Send + Sync {
    fn evaluate(&self, expression: &str, pathway: &Pathway) -> Option<bool>;
}

/// Host that answers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomHost;

impl CustomConditionHost for NoCustomHost {
    fn evaluate(&self, _expression: &str, _pathway: &Pathway) -> Option<bool> {
        None
    }
}

/// Results the caller worked out before the pass, keyed by expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecomputedCustomResults {
    results: HashMap<String, bool>,
}

impl PrecomputedCustomResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, expression: impl Into<String>, result: bool) -> Self {
        self.results.insert(expression.into(), result);
        self
    }

    pub fn insert(&mut self, expression: impl Into<String>, result: bool) {
        self.results.insert(expression.into(), result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for PrecomputedCustomResults {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl CustomConditionHost for PrecomputedCustomResults {
    fn evaluate(&self, expression: &str, _pathway: &Pathway) -> Option<bool> {
        self.results.get(expression).copied()
    }
}
