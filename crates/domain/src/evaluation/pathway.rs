//! Pathway Validator - run a rule set against a pathway

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::action::{resolve, Bucket};
use super::condition::{ConditionEvaluator, ConditionFault};
use super::custom::{CustomConditionHost, NoCustomHost};
use super::message::{DiagnosticKind, ResolvedMessage};
use super::rule::{RuleEvaluation, RuleEvaluator};
use crate::aggregates::Rule;
use crate::entities::FixAction;
use crate::ids::RuleId;
use crate::value_objects::Pathway;

static NO_CUSTOM_HOST: NoCustomHost = NoCustomHost;

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// False iff `errors` is non-empty.
    pub is_valid: bool,
    pub errors: Vec<ResolvedMessage>,
    pub warnings: Vec<ResolvedMessage>,
    pub suggestions: Vec<ResolvedMessage>,
    /// Rules that fired, in evaluation order.
    pub applied_rules: Vec<RuleId>,
    pub rules_evaluated: usize,
    #[serde(with = "millis")]
    pub execution_time: Duration,
    /// Soft failures met during the pass. Never affects `is_valid`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ResolvedMessage>,
}

impl ValidationResult {
    fn empty() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            applied_rules: Vec::new(),
            rules_evaluated: 0,
            execution_time: Duration::ZERO,
            diagnostics: Vec::new(),
        }
    }

    pub fn message_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.suggestions.len()
    }
}

/// `executionTime` travels as `"<n>ms"`.
mod millis {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.trim()
            .strip_suffix("ms")
            .and_then(|n| n.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .ok_or_else(|| de::Error::custom(format!("invalid execution time '{}'", text)))
    }
}

/// Evaluates rule sets against pathways.
///
/// Holds nothing but the custom-rule host, so one validator can serve any
/// number of passes, concurrently if the host allows it.
#[derive(Clone, Copy)]
pub struct PathwayValidator<'h> {
    host: &'h dyn CustomConditionHost,
}

impl Default for PathwayValidator<'static> {
    fn default() -> Self {
        Self {
            host: &NO_CUSTOM_HOST,
        }
    }
}

impl<'h> PathwayValidator<'h> {
    pub fn new(host: &'h dyn CustomConditionHost) -> Self {
        Self { host }
    }

    /// Evaluate every active rule, highest priority first.
    ///
    /// Equal priorities keep their input order. Evaluation never stops
    /// early: every active rule runs even after an error.
    pub fn validate_pathway(&self, pathway: &Pathway, rules: &[Rule]) -> ValidationResult {
        let mut active: Vec<&Rule> = rules.iter().filter(|r| r.is_active()).collect();
        active.sort_by(|a, b| b.priority().cmp(&a.priority()));
        self.run(pathway, &active)
    }

    /// Evaluate one rule whether or not it is active. The rule's own
    /// evaluation comes back alongside the pass result.
    pub fn validate_rule(
        &self,
        pathway: &Pathway,
        rule: &Rule,
    ) -> (RuleEvaluation, ValidationResult) {
        let mut pass = Pass::start();
        let evaluation =
            RuleEvaluator::new(ConditionEvaluator::new(self.host)).evaluate(rule, pathway);
        pass.record(rule, &evaluation);
        (evaluation, pass.finish())
    }

    fn run(&self, pathway: &Pathway, rules: &[&Rule]) -> ValidationResult {
        let mut pass = Pass::start();
        let mut evaluator = RuleEvaluator::new(ConditionEvaluator::new(self.host));
        for rule in rules {
            let evaluation = evaluator.evaluate(rule, pathway);
            pass.record(rule, &evaluation);
        }
        pass.finish()
    }
}

/// Accumulates rule evaluations into one [`ValidationResult`].
struct Pass {
    started: Instant,
    result: ValidationResult,
    // subject -> directive kept for it
    fixes: HashMap<String, (FixAction, RuleId)>,
}

impl Pass {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            result: ValidationResult::empty(),
            fixes: HashMap::new(),
        }
    }

    fn record(&mut self, rule: &Rule, evaluation: &RuleEvaluation) {
        let result = &mut self.result;
        result.rules_evaluated += 1;

        for fault in &evaluation.faults {
            result
                .diagnostics
                .push(fault_diagnostic(rule, fault.condition_index, &fault.fault));
        }

        if !evaluation.fired {
            return;
        }
        result.applied_rules.push(rule.id().clone());

        for action in &evaluation.fired_actions {
            let resolved = resolve(action, rule);
            if let Some(diagnostic) = resolved.diagnostic {
                result.diagnostics.push(diagnostic);
            }

            if let Some(fix) = &resolved.fix {
                if let Some(subject) = &fix.subject {
                    match self.fixes.get(subject) {
                        Some((kept, kept_by)) if *kept != fix.action => {
                            let mut detail = Map::new();
                            detail.insert("subject".to_string(), Value::String(subject.clone()));
                            detail.insert(
                                "keptRuleId".to_string(),
                                Value::String(kept_by.to_string()),
                            );
                            result.diagnostics.push(ResolvedMessage::diagnostic(
                                rule,
                                DiagnosticKind::SupersededAutoFix,
                                format!(
                                    "Auto-fix '{}' on '{}' dropped in favour of '{}' from rule {}",
                                    fix.action, subject, kept, kept_by
                                ),
                                detail,
                            ));
                            continue;
                        }
                        Some(_) => {}
                        None => {
                            self.fixes
                                .insert(subject.clone(), (fix.action, rule.id().clone()));
                        }
                    }
                }
            }

            match resolved.bucket {
                Bucket::Errors => result.errors.push(resolved.message),
                Bucket::Warnings => result.warnings.push(resolved.message),
                Bucket::Suggestions => result.suggestions.push(resolved.message),
            }
        }
    }

    fn finish(mut self) -> ValidationResult {
        self.result.is_valid = self.result.errors.is_empty();
        self.result.execution_time = self.started.elapsed();
        self.result
    }
}

fn fault_diagnostic(
    rule: &Rule,
    condition_index: usize,
    fault: &ConditionFault,
) -> ResolvedMessage {
    let mut detail = Map::new();
    detail.insert("conditionIndex".to_string(), Value::from(condition_index));
    let kind = match fault {
        ConditionFault::InvalidRegex { pattern, .. } => {
            detail.insert("pattern".to_string(), Value::String(pattern.clone()));
            DiagnosticKind::InvalidRegex
        }
        ConditionFault::UnansweredCustomRule { expression } => {
            detail.insert("expression".to_string(), Value::String(expression.clone()));
            DiagnosticKind::UnansweredCustomRule
        }
    };
    ResolvedMessage::diagnostic(rule, kind, fault.describe(), detail)
}

/// Validate with no custom-rule host.
pub fn validate_pathway(pathway: &Pathway, rules: &[Rule]) -> ValidationResult {
    PathwayValidator::default().validate_pathway(pathway, rules)
}
