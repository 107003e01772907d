//! Rule aggregate - a named, prioritized set of conditions and actions
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: All fields are encapsulated
//! - **Valid parts**: conditions and actions are typed values, so operator /
//!   operand mismatches cannot be represented
//! - **Definition check**: `validate_definition()` reports the remaining
//!   configuration errors (no conditions, dangling condition groups, bad
//!   patterns) before a rule is persisted

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{Action, Condition, ConditionKind, CountComparison};
use crate::ids::{FandomId, RuleId};
use crate::value_objects::{LogicOperator, RuleName};

fn default_active() -> bool {
    true
}

/// A business rule evaluated against pathways of one fandom.
///
/// # Example
///
/// ```
/// use pathwise_domain::{Action, Condition, FandomId, Rule, RuleId, RuleName};
///
/// let rule = Rule::new(
///     RuleId::new("no-harmony").unwrap(),
///     RuleName::new("No Harmony").unwrap(),
///     FandomId::new("hp").unwrap(),
/// )
/// .with_condition(Condition::tag_exists("harry/hermione"))
/// .with_action(Action::error("conflict").unwrap())
/// .with_priority(100);
///
/// assert!(rule.is_active());
/// assert!(rule.validate_definition().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    // Identity
    id: RuleId,
    name: RuleName,
    fandom_id: FandomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    // Logic
    conditions: Vec<Condition>,
    #[serde(default)]
    actions: Vec<Action>,
    #[serde(default)]
    logic_operator: LogicOperator,
    /// When set, a condition group is satisfied once the weight of its
    /// satisfied conditions reaches this share of the group's total weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight_threshold: Option<f64>,

    // Ordering and status
    /// Higher evaluates first
    #[serde(default)]
    priority: i32,
    #[serde(default = "default_active")]
    is_active: bool,
}

impl Rule {
    pub fn new(id: RuleId, name: RuleName, fandom_id: FandomId) -> Self {
        Self {
            id,
            name,
            fandom_id,
            description: None,
            conditions: Vec::new(),
            actions: Vec::new(),
            logic_operator: LogicOperator::And,
            weight_threshold: None,
            priority: 0,
            is_active: true,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &RuleId {
        &self.id
    }

    pub fn name(&self) -> &RuleName {
        &self.name
    }

    pub fn fandom_id(&self) -> &FandomId {
        &self.fandom_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn logic_operator(&self) -> LogicOperator {
        self.logic_operator
    }

    pub fn weight_threshold(&self) -> Option<f64> {
        self.weight_threshold
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_logic_operator(mut self, logic_operator: LogicOperator) -> Self {
        self.logic_operator = logic_operator;
        self
    }

    pub fn with_weight_threshold(mut self, threshold: f64) -> Self {
        self.weight_threshold = Some(threshold);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    // =========================================================================
    // Definition Check
    // =========================================================================

    /// Names of all condition groups declared by this rule's conditions.
    pub fn condition_groups(&self) -> HashSet<&str> {
        self.conditions
            .iter()
            .filter_map(Condition::group_id)
            .collect()
    }

    /// Report every configuration error in this rule.
    ///
    /// Called before a rule is persisted; the evaluator does not repeat
    /// these checks and degrades gracefully if they were skipped.
    pub fn validate_definition(&self) -> Result<(), Vec<RuleDefinitionError>> {
        let mut errors = Vec::new();

        if self.conditions.is_empty() {
            errors.push(RuleDefinitionError::NoConditions);
        }

        if let Some(threshold) = self.weight_threshold {
            if !threshold_in_range(threshold) {
                errors.push(RuleDefinitionError::InvalidWeightThreshold(threshold));
            }
        }

        for (index, condition) in self.conditions.iter().enumerate() {
            if let ConditionKind::TagCount {
                comparison: CountComparison::Between { min, max },
            } = condition.kind()
            {
                if min > max {
                    errors.push(RuleDefinitionError::InvertedRange {
                        index,
                        min: *min,
                        max: *max,
                    });
                }
            }
            if let Some(pattern) = condition.regex_pattern() {
                if let Err(e) = regex::Regex::new(pattern) {
                    errors.push(RuleDefinitionError::InvalidPattern {
                        index,
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let groups = self.condition_groups();
        for (index, action) in self.actions.iter().enumerate() {
            if let Some(group) = action.condition_group() {
                if !groups.contains(group) {
                    errors.push(RuleDefinitionError::UnknownConditionGroup {
                        index,
                        group: group.to_string(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Weight thresholds are shares of a group's weight, in (0, 1].
pub(crate) fn threshold_in_range(threshold: f64) -> bool {
    threshold.is_finite() && threshold > 0.0 && threshold <= 1.0
}

/// A configuration error found by [`Rule::validate_definition`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleDefinitionError {
    #[error("rule has no conditions")]
    NoConditions,

    #[error("weight threshold must be in (0, 1], got {0}")]
    InvalidWeightThreshold(f64),

    #[error("condition {index} has an invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        reason: String,
    },

    #[error("condition {index} has an inverted range [{min}, {max}]")]
    InvertedRange { index: usize, min: u64, max: u64 },

    #[error("action {index} targets condition group '{group}' which no condition declares")]
    UnknownConditionGroup { index: usize, group: String },
}
