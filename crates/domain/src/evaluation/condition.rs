//! Condition Evaluator - one condition against one pathway snapshot

use std::collections::HashMap;

use regex::Regex;

use super::custom::{CustomConditionHost, NoCustomHost};
use crate::common::{json_equal, scalar_text};
use crate::entities::{Condition, ConditionKind, SelectionMatch};
use crate::value_objects::Pathway;

/// Why a condition could not be evaluated normally. The condition counts as
/// not satisfied (before negation) and the fault is reported.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionFault {
    InvalidRegex { pattern: String, reason: String },
    UnansweredCustomRule { expression: String },
}

impl ConditionFault {
    pub fn describe(&self) -> String {
        match self {
            Self::InvalidRegex { pattern, reason } => {
                format!("Invalid regular expression '{}': {}", pattern, reason)
            }
            Self::UnansweredCustomRule { expression } => {
                format!("Custom rule '{}' could not be evaluated", expression)
            }
        }
    }
}

/// Result of one condition, negation applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionOutcome {
    pub satisfied: bool,
    pub fault: Option<ConditionFault>,
}

/// Evaluates conditions for one pass.
///
/// Regex patterns are compiled once per evaluator and reused, so one
/// evaluator should live exactly as long as one validation pass.
pub struct ConditionEvaluator<'h> {
    host: &'h dyn CustomConditionHost,
    patterns: HashMap<String, Result<Regex, String>>,
}

impl<'h> ConditionEvaluator<'h> {
    pub fn new(host: &'h dyn CustomConditionHost) -> Self {
        Self {
            host,
            patterns: HashMap::new(),
        }
    }

    pub fn evaluate(&mut self, condition: &Condition, pathway: &Pathway) -> ConditionOutcome {
        let (raw, fault) = match self.raw(condition.kind(), pathway) {
            Ok(result) => (result, None),
            Err(fault) => (false, Some(fault)),
        };
        ConditionOutcome {
            satisfied: raw != condition.is_negated(),
            fault,
        }
    }

    fn raw(&mut self, kind: &ConditionKind, pathway: &Pathway) -> Result<bool, ConditionFault> {
        match kind {
            ConditionKind::TagExists { tag, presence } => Ok(presence.test(pathway.has_tag(tag))),
            ConditionKind::PlotBlockExists {
                plot_block,
                presence,
            } => Ok(presence.test(pathway.has_plot_block(plot_block))),
            ConditionKind::TagCount { comparison } => Ok(comparison.test(pathway.tags.len() as u64)),
            ConditionKind::PathwayLength { scope, comparison } => {
                Ok(comparison.test(scope.measure(pathway)))
            }
            ConditionKind::SelectionValue { key, matcher } => {
                let Some(selected) = pathway.selection(key) else {
                    return Ok(false);
                };
                self.match_selection(matcher, selected)
            }
            ConditionKind::CustomRule { expression } => self
                .host
                .evaluate(expression, pathway)
                .ok_or_else(|| ConditionFault::UnansweredCustomRule {
                    expression: expression.clone(),
                }),
        }
    }

    fn match_selection(
        &mut self,
        matcher: &SelectionMatch,
        selected: &serde_json::Value,
    ) -> Result<bool, ConditionFault> {
        use serde_json::Value;

        match matcher {
            SelectionMatch::Equals(expected) => Ok(json_equal(selected, expected)),
            SelectionMatch::Contains(needle) => Ok(match (selected, needle) {
                (Value::Array(items), _) => items.iter().any(|item| json_equal(item, needle)),
                (Value::String(text), Value::String(part)) => text.contains(part.as_str()),
                _ => false,
            }),
            SelectionMatch::StartsWith(prefix) => Ok(scalar_text(selected)
                .is_some_and(|text| text.starts_with(prefix.as_str()))),
            SelectionMatch::MatchesRegex(pattern) => {
                let re = self.compiled(pattern)?;
                Ok(scalar_text(selected).is_some_and(|text| re.is_match(&text)))
            }
        }
    }

    fn compiled(&mut self, pattern: &str) -> Result<&Regex, ConditionFault> {
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| Regex::new(pattern).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|reason| ConditionFault::InvalidRegex {
                pattern: pattern.to_string(),
                reason: reason.clone(),
            })
    }

    /// Number of distinct patterns compiled so far.
    pub fn cached_patterns(&self) -> usize {
        self.patterns.len()
    }
}

/// Evaluate a single condition with no custom host and a throwaway cache.
pub fn evaluate_condition(condition: &Condition, pathway: &Pathway) -> bool {
    ConditionEvaluator::new(&NoCustomHost)
        .evaluate(condition, pathway)
        .satisfied
}
