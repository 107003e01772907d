//! Condition entity - one typed predicate over a pathway
//!
//! On the wire a condition is a flat record (`type`, `target`, `operator`,
//! `value`, ...) whose `value` shape depends on the type/operator pair. Inside
//! the domain it is a closed tagged union: every [`ConditionKind`] variant
//! carries exactly the operand it needs, and the per-type operator matrix is
//! enforced when a record is converted, so a `Condition` value can never hold
//! an operator that is invalid for its type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::value_objects::Pathway;

/// What a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionType {
    TagExists,
    TagCount,
    PlotBlockExists,
    SelectionValue,
    PathwayLength,
    CustomRule,
}

/// Comparison applied to the inspected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    Exists,
    NotExists,
    Equals,
    GreaterThan,
    LessThan,
    Between,
    Contains,
    StartsWith,
    MatchesRegex,
    EvaluatesTrue,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TagExists => "tag-exists",
            Self::TagCount => "tag-count",
            Self::PlotBlockExists => "plot-block-exists",
            Self::SelectionValue => "selection-value",
            Self::PathwayLength => "pathway-length",
            Self::CustomRule => "custom-rule",
        }
    }

    /// The operators this condition type accepts. Anything else is a
    /// configuration error.
    pub fn valid_operators(&self) -> &'static [ConditionOperator] {
        use ConditionOperator::*;
        match self {
            Self::TagExists | Self::PlotBlockExists => &[Exists, NotExists],
            Self::TagCount => &[Equals, GreaterThan, LessThan, Between],
            Self::SelectionValue => &[Equals, Contains, StartsWith, MatchesRegex],
            Self::PathwayLength => &[Equals, GreaterThan, LessThan],
            Self::CustomRule => &[EvaluatesTrue],
        }
    }

    pub fn accepts(&self, operator: ConditionOperator) -> bool {
        self.valid_operators().contains(&operator)
    }
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::NotExists => "not-exists",
            Self::Equals => "equals",
            Self::GreaterThan => "greater-than",
            Self::LessThan => "less-than",
            Self::Between => "between",
            Self::Contains => "contains",
            Self::StartsWith => "starts-with",
            Self::MatchesRegex => "matches-regex",
            Self::EvaluatesTrue => "evaluates-true",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Typed operands
// =============================================================================

/// Whether a tag or plot block must be present or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

impl Presence {
    pub fn test(self, found: bool) -> bool {
        match self {
            Self::Present => found,
            Self::Absent => !found,
        }
    }

    fn operator(self) -> ConditionOperator {
        match self {
            Self::Present => ConditionOperator::Exists,
            Self::Absent => ConditionOperator::NotExists,
        }
    }
}

/// Comparison against the number of tags in a pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountComparison {
    Equals(u64),
    GreaterThan(u64),
    LessThan(u64),
    /// Inclusive on both ends.
    Between { min: u64, max: u64 },
}

impl CountComparison {
    pub fn test(&self, count: u64) -> bool {
        match *self {
            Self::Equals(n) => count == n,
            Self::GreaterThan(n) => count > n,
            Self::LessThan(n) => count < n,
            Self::Between { min, max } => (min..=max).contains(&count),
        }
    }

    fn operator(&self) -> ConditionOperator {
        match self {
            Self::Equals(_) => ConditionOperator::Equals,
            Self::GreaterThan(_) => ConditionOperator::GreaterThan,
            Self::LessThan(_) => ConditionOperator::LessThan,
            Self::Between { .. } => ConditionOperator::Between,
        }
    }

    fn operand(&self) -> Value {
        match *self {
            Self::Equals(n) | Self::GreaterThan(n) | Self::LessThan(n) => Value::from(n),
            Self::Between { min, max } => Value::from(vec![min, max]),
        }
    }
}

/// Comparison against the size of a pathway collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthComparison {
    Equals(u64),
    GreaterThan(u64),
    LessThan(u64),
}

impl LengthComparison {
    pub fn test(&self, length: u64) -> bool {
        match *self {
            Self::Equals(n) => length == n,
            Self::GreaterThan(n) => length > n,
            Self::LessThan(n) => length < n,
        }
    }

    fn operator(&self) -> ConditionOperator {
        match self {
            Self::Equals(_) => ConditionOperator::Equals,
            Self::GreaterThan(_) => ConditionOperator::GreaterThan,
            Self::LessThan(_) => ConditionOperator::LessThan,
        }
    }

    fn operand(&self) -> Value {
        match *self {
            Self::Equals(n) | Self::GreaterThan(n) | Self::LessThan(n) => Value::from(n),
        }
    }
}

/// Which pathway collection a `pathway-length` condition measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthScope {
    Tags,
    PlotBlocks,
    All,
}

impl LengthScope {
    /// Parse the record's `target`. An empty target measures everything.
    pub fn from_target(target: &str) -> Option<Self> {
        match target.trim() {
            "tags" => Some(Self::Tags),
            "plotBlocks" | "plot-blocks" | "plot_blocks" => Some(Self::PlotBlocks),
            "all" | "" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::PlotBlocks => "plotBlocks",
            Self::All => "all",
        }
    }

    pub fn measure(&self, pathway: &Pathway) -> u64 {
        let length = match self {
            Self::Tags => pathway.tags.len(),
            Self::PlotBlocks => pathway.plot_blocks.len(),
            Self::All => pathway.item_count(),
        };
        length as u64
    }
}

/// How a selection value is matched.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionMatch {
    Equals(Value),
    /// Array membership, or substring for string selections.
    Contains(Value),
    StartsWith(String),
    /// Regex search over the value's text form. The pattern is not anchored:
    /// it matches anywhere unless it carries its own `^`/`$`.
    MatchesRegex(String),
}

impl SelectionMatch {
    fn operator(&self) -> ConditionOperator {
        match self {
            Self::Equals(_) => ConditionOperator::Equals,
            Self::Contains(_) => ConditionOperator::Contains,
            Self::StartsWith(_) => ConditionOperator::StartsWith,
            Self::MatchesRegex(_) => ConditionOperator::MatchesRegex,
        }
    }

    fn into_operand(self) -> Value {
        match self {
            Self::Equals(value) | Self::Contains(value) => value,
            Self::StartsWith(text) | Self::MatchesRegex(text) => Value::String(text),
        }
    }
}

/// The predicate itself, one variant per condition type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    TagExists {
        tag: String,
        presence: Presence,
    },
    /// Counts the pathway's tags; the record's `target` is ignored.
    TagCount {
        comparison: CountComparison,
    },
    PlotBlockExists {
        plot_block: String,
        presence: Presence,
    },
    SelectionValue {
        key: String,
        matcher: SelectionMatch,
    },
    PathwayLength {
        scope: LengthScope,
        comparison: LengthComparison,
    },
    /// Opaque expression answered by the host application.
    CustomRule {
        expression: String,
    },
}

// =============================================================================
// Condition
// =============================================================================

/// A single typed predicate with its negation flag, weight and group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConditionRecord", into = "ConditionRecord")]
pub struct Condition {
    kind: ConditionKind,
    weight: f64,
    group_id: Option<String>,
    is_negated: bool,
}

impl Condition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            weight: 1.0,
            group_id: None,
            is_negated: false,
        }
    }

    pub fn tag_exists(tag: impl Into<String>) -> Self {
        Self::new(ConditionKind::TagExists {
            tag: tag.into(),
            presence: Presence::Present,
        })
    }

    pub fn tag_missing(tag: impl Into<String>) -> Self {
        Self::new(ConditionKind::TagExists {
            tag: tag.into(),
            presence: Presence::Absent,
        })
    }

    pub fn tag_count(comparison: CountComparison) -> Self {
        Self::new(ConditionKind::TagCount { comparison })
    }

    pub fn plot_block_exists(plot_block: impl Into<String>) -> Self {
        Self::new(ConditionKind::PlotBlockExists {
            plot_block: plot_block.into(),
            presence: Presence::Present,
        })
    }

    pub fn selection(key: impl Into<String>, matcher: SelectionMatch) -> Self {
        Self::new(ConditionKind::SelectionValue {
            key: key.into(),
            matcher,
        })
    }

    pub fn pathway_length(scope: LengthScope, comparison: LengthComparison) -> Self {
        Self::new(ConditionKind::PathwayLength { scope, comparison })
    }

    pub fn custom(expression: impl Into<String>) -> Self {
        Self::new(ConditionKind::CustomRule {
            expression: expression.into(),
        })
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn negated(mut self) -> Self {
        self.is_negated = true;
        self
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Set the relative weight used by weighted-threshold rules.
    ///
    /// # Errors
    ///
    /// Returns `ConditionConfigError::InvalidWeight` unless the weight is a
    /// finite positive number.
    pub fn with_weight(mut self, weight: f64) -> Result<Self, ConditionConfigError> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(ConditionConfigError::InvalidWeight(weight));
        }
        self.weight = weight;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn is_negated(&self) -> bool {
        self.is_negated
    }

    pub fn condition_type(&self) -> ConditionType {
        match self.kind {
            ConditionKind::TagExists { .. } => ConditionType::TagExists,
            ConditionKind::TagCount { .. } => ConditionType::TagCount,
            ConditionKind::PlotBlockExists { .. } => ConditionType::PlotBlockExists,
            ConditionKind::SelectionValue { .. } => ConditionType::SelectionValue,
            ConditionKind::PathwayLength { .. } => ConditionType::PathwayLength,
            ConditionKind::CustomRule { .. } => ConditionType::CustomRule,
        }
    }

    pub fn operator(&self) -> ConditionOperator {
        match &self.kind {
            ConditionKind::TagExists { presence, .. }
            | ConditionKind::PlotBlockExists { presence, .. } => presence.operator(),
            ConditionKind::TagCount { comparison } => comparison.operator(),
            ConditionKind::SelectionValue { matcher, .. } => matcher.operator(),
            ConditionKind::PathwayLength { comparison, .. } => comparison.operator(),
            ConditionKind::CustomRule { .. } => ConditionOperator::EvaluatesTrue,
        }
    }

    /// The regular expression of a `matches-regex` condition, if any.
    pub fn regex_pattern(&self) -> Option<&str> {
        match &self.kind {
            ConditionKind::SelectionValue {
                matcher: SelectionMatch::MatchesRegex(pattern),
                ..
            } => Some(pattern),
            _ => None,
        }
    }

    /// Short human-readable form used in diagnostics.
    pub fn describe(&self) -> String {
        let subject = match &self.kind {
            ConditionKind::TagExists { tag, .. } => format!(" '{}'", tag),
            ConditionKind::PlotBlockExists { plot_block, .. } => format!(" '{}'", plot_block),
            ConditionKind::SelectionValue { key, .. } => format!(" '{}'", key),
            ConditionKind::PathwayLength { scope, .. } => format!(" {}", scope.as_str()),
            ConditionKind::TagCount { .. } | ConditionKind::CustomRule { .. } => String::new(),
        };
        let negation = if self.is_negated { "not " } else { "" };
        format!(
            "{}{}{} {}",
            negation,
            self.condition_type(),
            subject,
            self.operator()
        )
    }
}

// =============================================================================
// Wire Record
// =============================================================================

fn default_weight() -> f64 {
    1.0
}

/// Flat JSON form of a condition as stored and exchanged with callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRecord {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    #[serde(default)]
    pub target: String,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub is_negated: bool,
}

/// A condition record that violates the operator matrix or operand shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionConfigError {
    #[error("operator '{operator}' is not valid for condition type '{condition_type}'")]
    OperatorNotAllowed {
        condition_type: ConditionType,
        operator: ConditionOperator,
    },

    #[error("condition type '{0}' requires a non-empty target")]
    MissingTarget(ConditionType),

    #[error("invalid value for {condition_type} {operator}: {reason}")]
    InvalidValue {
        condition_type: ConditionType,
        operator: ConditionOperator,
        reason: String,
    },

    #[error("condition weight must be a positive number, got {0}")]
    InvalidWeight(f64),
}

fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_range(value: &Value) -> Option<(u64, u64)> {
    match value {
        Value::Array(items) if items.len() == 2 => {
            Some((parse_count(&items[0])?, parse_count(&items[1])?))
        }
        Value::Object(map) => Some((
            parse_count(map.get("min")?)?,
            parse_count(map.get("max")?)?,
        )),
        _ => None,
    }
}

fn required_target(
    condition_type: ConditionType,
    target: String,
) -> Result<String, ConditionConfigError> {
    if target.trim().is_empty() {
        return Err(ConditionConfigError::MissingTarget(condition_type));
    }
    Ok(target)
}

impl TryFrom<ConditionRecord> for Condition {
    type Error = ConditionConfigError;

    fn try_from(record: ConditionRecord) -> Result<Self, Self::Error> {
        let ConditionRecord {
            condition_type,
            target,
            operator,
            value,
            weight,
            group_id,
            is_negated,
        } = record;

        if !condition_type.accepts(operator) {
            return Err(ConditionConfigError::OperatorNotAllowed {
                condition_type,
                operator,
            });
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(ConditionConfigError::InvalidWeight(weight));
        }

        let invalid = |reason: &str| ConditionConfigError::InvalidValue {
            condition_type,
            operator,
            reason: reason.to_string(),
        };
        let presence = if operator == ConditionOperator::NotExists {
            Presence::Absent
        } else {
            Presence::Present
        };

        let kind = match condition_type {
            ConditionType::TagExists => ConditionKind::TagExists {
                tag: required_target(condition_type, target)?,
                presence,
            },
            ConditionType::PlotBlockExists => ConditionKind::PlotBlockExists {
                plot_block: required_target(condition_type, target)?,
                presence,
            },
            ConditionType::TagCount => {
                let comparison = if operator == ConditionOperator::Between {
                    let (min, max) = parse_range(&value)
                        .ok_or_else(|| invalid("expected a [min, max] pair of non-negative integers"))?;
                    if min > max {
                        return Err(invalid("range minimum exceeds maximum"));
                    }
                    CountComparison::Between { min, max }
                } else {
                    let n = parse_count(&value)
                        .ok_or_else(|| invalid("expected a non-negative integer"))?;
                    match operator {
                        ConditionOperator::Equals => CountComparison::Equals(n),
                        ConditionOperator::GreaterThan => CountComparison::GreaterThan(n),
                        _ => CountComparison::LessThan(n),
                    }
                };
                ConditionKind::TagCount { comparison }
            }
            ConditionType::PathwayLength => {
                let scope = LengthScope::from_target(&target)
                    .ok_or_else(|| invalid("target must be one of tags, plotBlocks, all"))?;
                let n =
                    parse_count(&value).ok_or_else(|| invalid("expected a non-negative integer"))?;
                let comparison = match operator {
                    ConditionOperator::Equals => LengthComparison::Equals(n),
                    ConditionOperator::GreaterThan => LengthComparison::GreaterThan(n),
                    _ => LengthComparison::LessThan(n),
                };
                ConditionKind::PathwayLength { scope, comparison }
            }
            ConditionType::SelectionValue => {
                let key = required_target(condition_type, target)?;
                let matcher = match (operator, value) {
                    (ConditionOperator::Equals, value) => SelectionMatch::Equals(value),
                    (ConditionOperator::Contains, Value::Null) => {
                        return Err(invalid("expected a value to look for"))
                    }
                    (ConditionOperator::Contains, value) => SelectionMatch::Contains(value),
                    (ConditionOperator::StartsWith, Value::String(prefix)) => {
                        SelectionMatch::StartsWith(prefix)
                    }
                    (ConditionOperator::MatchesRegex, Value::String(pattern))
                        if !pattern.is_empty() =>
                    {
                        SelectionMatch::MatchesRegex(pattern)
                    }
                    _ => return Err(invalid("expected a string")),
                };
                ConditionKind::SelectionValue { key, matcher }
            }
            ConditionType::CustomRule => {
                let expression = match value {
                    Value::String(expression) if !expression.trim().is_empty() => expression,
                    Value::Null | Value::String(_) => {
                        return Err(invalid("expected an expression for the host to evaluate"))
                    }
                    other => other.to_string(),
                };
                ConditionKind::CustomRule { expression }
            }
        };

        Ok(Self {
            kind,
            weight,
            group_id: group_id.filter(|g| !g.trim().is_empty()),
            is_negated,
        })
    }
}

impl From<Condition> for ConditionRecord {
    fn from(condition: Condition) -> Self {
        let condition_type = condition.condition_type();
        let operator = condition.operator();
        let (target, value) = match condition.kind {
            ConditionKind::TagExists { tag, .. } => (tag, Value::Null),
            ConditionKind::PlotBlockExists { plot_block, .. } => (plot_block, Value::Null),
            ConditionKind::TagCount { comparison } => (String::new(), comparison.operand()),
            ConditionKind::SelectionValue { key, matcher } => (key, matcher.into_operand()),
            ConditionKind::PathwayLength { scope, comparison } => {
                (scope.as_str().to_string(), comparison.operand())
            }
            ConditionKind::CustomRule { expression } => (String::new(), Value::String(expression)),
        };
        Self {
            condition_type,
            target,
            operator,
            value,
            weight: condition.weight,
            group_id: condition.group_id,
            is_negated: condition.is_negated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Condition, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    mod operator_matrix {
        use super::*;

        #[test]
        fn every_type_accepts_its_operators() {
            assert!(ConditionType::TagExists.accepts(ConditionOperator::NotExists));
            assert!(ConditionType::TagCount.accepts(ConditionOperator::Between));
            assert!(ConditionType::SelectionValue.accepts(ConditionOperator::MatchesRegex));
            assert!(ConditionType::CustomRule.accepts(ConditionOperator::EvaluatesTrue));
        }

        #[test]
        fn pathway_length_rejects_between() {
            assert!(!ConditionType::PathwayLength.accepts(ConditionOperator::Between));
            let err = parse(json!({
                "type": "pathway-length",
                "target": "tags",
                "operator": "between",
                "value": [1, 2],
            }))
            .unwrap_err();
            assert!(err.contains("not valid for condition type 'pathway-length'"));
        }

        #[test]
        fn tag_exists_rejects_equals() {
            let err = parse(json!({
                "type": "tag-exists",
                "target": "angst",
                "operator": "equals",
            }))
            .unwrap_err();
            assert!(err.contains("'equals' is not valid"));
        }

        #[test]
        fn unknown_operator_is_rejected() {
            assert!(parse(json!({
                "type": "tag-exists",
                "target": "angst",
                "operator": "sort-of-exists",
            }))
            .is_err());
        }
    }

    mod operands {
        use super::*;

        #[test]
        fn tag_exists_needs_a_target() {
            let err = parse(json!({"type": "tag-exists", "operator": "exists"})).unwrap_err();
            assert!(err.contains("requires a non-empty target"));
        }

        #[test]
        fn between_accepts_pair_or_object() {
            let pair = parse(json!({
                "type": "tag-count", "operator": "between", "value": [2, 4],
            }))
            .unwrap();
            let object = parse(json!({
                "type": "tag-count", "operator": "between", "value": {"min": 2, "max": 4},
            }))
            .unwrap();
            assert_eq!(pair, object);
            assert_eq!(
                pair.kind(),
                &ConditionKind::TagCount {
                    comparison: CountComparison::Between { min: 2, max: 4 }
                }
            );
        }

        #[test]
        fn between_rejects_inverted_range() {
            let err = parse(json!({
                "type": "tag-count", "operator": "between", "value": [5, 1],
            }))
            .unwrap_err();
            assert!(err.contains("range minimum exceeds maximum"));
        }

        #[test]
        fn counts_accept_numeric_strings() {
            let condition = parse(json!({
                "type": "tag-count", "operator": "greater-than", "value": "2",
            }))
            .unwrap();
            assert_eq!(
                condition.kind(),
                &ConditionKind::TagCount {
                    comparison: CountComparison::GreaterThan(2)
                }
            );
        }

        #[test]
        fn pathway_length_scope_comes_from_target() {
            let condition = parse(json!({
                "type": "pathway-length", "target": "plotBlocks",
                "operator": "less-than", "value": 3,
            }))
            .unwrap();
            assert_eq!(
                condition.kind(),
                &ConditionKind::PathwayLength {
                    scope: LengthScope::PlotBlocks,
                    comparison: LengthComparison::LessThan(3),
                }
            );

            assert!(parse(json!({
                "type": "pathway-length", "target": "chapters",
                "operator": "less-than", "value": 3,
            }))
            .is_err());
        }

        #[test]
        fn regex_pattern_must_be_a_string() {
            assert!(parse(json!({
                "type": "selection-value", "target": "rating",
                "operator": "matches-regex", "value": 5,
            }))
            .is_err());
        }

        #[test]
        fn weight_must_be_positive() {
            let err = parse(json!({
                "type": "tag-exists", "target": "angst", "operator": "exists", "weight": 0,
            }))
            .unwrap_err();
            assert!(err.contains("weight must be a positive number"));
            assert!(Condition::tag_exists("angst").with_weight(-1.0).is_err());
        }

        #[test]
        fn custom_rule_needs_expression() {
            assert!(parse(json!({"type": "custom-rule", "operator": "evaluates-true"})).is_err());
            let condition = parse(json!({
                "type": "custom-rule", "operator": "evaluates-true",
                "value": "wordCount > 50000",
            }))
            .unwrap();
            assert_eq!(
                condition.kind(),
                &ConditionKind::CustomRule {
                    expression: "wordCount > 50000".to_string()
                }
            );
        }
    }

    mod wire_format {
        use super::*;

        #[test]
        fn record_round_trip_keeps_flags() {
            let source = json!({
                "type": "selection-value",
                "target": "rating",
                "operator": "starts-with",
                "value": "teen",
                "weight": 2.5,
                "groupId": "ratings",
                "isNegated": true,
            });
            let condition = parse(source.clone()).unwrap();
            assert!(condition.is_negated());
            assert_eq!(condition.group_id(), Some("ratings"));
            assert_eq!(serde_json::to_value(&condition).unwrap(), source);
        }

        #[test]
        fn describe_mentions_subject_and_operator() {
            let condition = Condition::tag_missing("fluff").negated();
            assert_eq!(condition.describe(), "not tag-exists 'fluff' not-exists");
        }
    }
}
