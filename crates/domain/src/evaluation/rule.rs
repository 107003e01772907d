//! Rule Evaluator - combine a rule's conditions and pick the actions to fire

use serde::Serialize;

use super::condition::{ConditionEvaluator, ConditionFault};
use super::custom::NoCustomHost;
use crate::aggregates::rule::threshold_in_range;
use crate::aggregates::Rule;
use crate::entities::Action;
use crate::value_objects::Pathway;

/// A fault raised by one of the rule's conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFault {
    pub condition_index: usize,
    pub fault: ConditionFault,
}

/// Result of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluation {
    pub fired: bool,
    pub fired_actions: Vec<Action>,
    /// Groups that evaluated true, in order of first appearance. Ungrouped
    /// conditions form the default group, reported as `None`.
    pub satisfied_groups: Vec<Option<String>>,
    pub satisfied_conditions: usize,
    pub total_conditions: usize,
    /// Satisfied weight over total weight, 0.0 without conditions.
    pub weight_ratio: f64,
    #[serde(skip)]
    pub faults: Vec<RuleFault>,
}

impl RuleEvaluation {
    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{}/{} conditions satisfied ({}% by weight), {}",
            self.satisfied_conditions,
            self.total_conditions,
            (self.weight_ratio * 100.0).round() as u32,
            if self.fired { "fired" } else { "not fired" }
        )
    }
}

struct GroupTally<'r> {
    id: Option<&'r str>,
    results: Vec<bool>,
    satisfied_weight: f64,
    total_weight: f64,
}

/// Evaluates rules, sharing one [`ConditionEvaluator`] (and its pattern
/// cache) across all rules of a pass.
pub struct RuleEvaluator<'h> {
    conditions: ConditionEvaluator<'h>,
}

impl<'h> RuleEvaluator<'h> {
    pub fn new(conditions: ConditionEvaluator<'h>) -> Self {
        Self { conditions }
    }

    pub fn evaluate(&mut self, rule: &Rule, pathway: &Pathway) -> RuleEvaluation {
        let logic = rule.logic_operator();
        let mut groups: Vec<GroupTally<'_>> = Vec::new();
        let mut faults = Vec::new();
        let mut satisfied_conditions = 0;
        let mut satisfied_weight = 0.0;
        let mut total_weight = 0.0;

        for (index, condition) in rule.conditions().iter().enumerate() {
            let outcome = self.conditions.evaluate(condition, pathway);
            if let Some(fault) = outcome.fault {
                faults.push(RuleFault {
                    condition_index: index,
                    fault,
                });
            }

            let weight = condition.weight();
            total_weight += weight;
            if outcome.satisfied {
                satisfied_conditions += 1;
                satisfied_weight += weight;
            }

            let group_id = condition.group_id();
            let position = match groups.iter().position(|g| g.id == group_id) {
                Some(position) => position,
                None => {
                    groups.push(GroupTally {
                        id: group_id,
                        results: Vec::new(),
                        satisfied_weight: 0.0,
                        total_weight: 0.0,
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[position];
            group.results.push(outcome.satisfied);
            group.total_weight += weight;
            if outcome.satisfied {
                group.satisfied_weight += weight;
            }
        }

        let group_results: Vec<bool> = groups
            .iter()
            .map(|group| match rule.weight_threshold() {
                // an out-of-range threshold never satisfies a group
                Some(threshold) => {
                    threshold_in_range(threshold)
                        && group.total_weight > 0.0
                        && group.satisfied_weight / group.total_weight >= threshold
                }
                None => logic.combine(group.results.iter().copied()),
            })
            .collect();

        let fired = logic.combine(group_results.iter().copied());

        let satisfied_groups: Vec<Option<&str>> = groups
            .iter()
            .zip(&group_results)
            .filter(|(_, satisfied)| **satisfied)
            .map(|(group, _)| group.id)
            .collect();

        let fired_actions = if fired {
            rule.actions()
                .iter()
                .filter(|action| match action.condition_group() {
                    None => true,
                    Some(wanted) => satisfied_groups.contains(&Some(wanted)),
                })
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        RuleEvaluation {
            fired,
            fired_actions,
            satisfied_groups: satisfied_groups
                .into_iter()
                .map(|id| id.map(str::to_string))
                .collect(),
            satisfied_conditions,
            total_conditions: rule.conditions().len(),
            weight_ratio: if total_weight > 0.0 {
                satisfied_weight / total_weight
            } else {
                0.0
            },
            faults,
        }
    }
}

/// Evaluate a single rule with no custom host.
pub fn evaluate_rule(rule: &Rule, pathway: &Pathway) -> RuleEvaluation {
    RuleEvaluator::new(ConditionEvaluator::new(&NoCustomHost)).evaluate(rule, pathway)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Condition;
    use crate::ids::{FandomId, RuleId};
    use crate::value_objects::{LogicOperator, RuleName};

    fn rule() -> Rule {
        Rule::new(
            RuleId::new("r1").unwrap(),
            RuleName::new("Test").unwrap(),
            FandomId::new("hp").unwrap(),
        )
    }

    fn pathway(tags: &[&str]) -> Pathway {
        Pathway::new(FandomId::new("hp").unwrap()).with_tags(tags.iter().copied())
    }

    mod combination {
        use super::*;

        #[test]
        fn rule_without_conditions_never_fires() {
            let rule = rule().with_action(Action::error("x").unwrap());
            let evaluation = evaluate_rule(&rule, &pathway(&["a"]));
            assert!(!evaluation.fired);
            assert!(evaluation.fired_actions.is_empty());
            assert_eq!(evaluation.weight_ratio, 0.0);
        }

        #[test]
        fn and_needs_every_condition() {
            let rule = rule()
                .with_condition(Condition::tag_exists("a"))
                .with_condition(Condition::tag_exists("b"))
                .with_action(Action::error("x").unwrap());
            assert!(evaluate_rule(&rule, &pathway(&["a", "b"])).fired);
            let partial = evaluate_rule(&rule, &pathway(&["a"]));
            assert!(!partial.fired);
            assert_eq!(partial.summary(), "1/2 conditions satisfied (50% by weight), not fired");
        }

        #[test]
        fn or_needs_one_condition() {
            let rule = rule()
                .with_logic_operator(LogicOperator::Or)
                .with_condition(Condition::tag_exists("a"))
                .with_condition(Condition::tag_exists("b"));
            assert!(evaluate_rule(&rule, &pathway(&["b"])).fired);
            assert!(!evaluate_rule(&rule, &pathway(&["c"])).fired);
        }

        #[test]
        fn operator_applies_within_and_across_groups() {
            // (a OR b) OR (c OR d)
            let rule = rule()
                .with_logic_operator(LogicOperator::Or)
                .with_condition(Condition::tag_exists("a").in_group("left"))
                .with_condition(Condition::tag_exists("b").in_group("left"))
                .with_condition(Condition::tag_exists("c").in_group("right"))
                .with_condition(Condition::tag_exists("d").in_group("right"));
            let evaluation = evaluate_rule(&rule, &pathway(&["d"]));
            assert!(evaluation.fired);
            assert_eq!(evaluation.satisfied_groups, vec![Some("right".to_string())]);
        }
    }

    mod actions {
        use super::*;

        #[test]
        fn grouped_actions_need_their_group() {
            let rule = rule()
                .with_logic_operator(LogicOperator::Or)
                .with_condition(Condition::tag_exists("a").in_group("left"))
                .with_condition(Condition::tag_exists("c").in_group("right"))
                .with_action(Action::error("always").unwrap())
                .with_action(Action::warning("left only").unwrap().for_group("left"))
                .with_action(Action::info("right only").unwrap().for_group("right"));

            let evaluation = evaluate_rule(&rule, &pathway(&["a"]));
            let messages: Vec<_> = evaluation
                .fired_actions
                .iter()
                .map(|a| a.message())
                .collect();
            assert_eq!(messages, vec!["always", "left only"]);
        }

        #[test]
        fn default_group_can_be_targeted_implicitly() {
            let rule = rule()
                .with_condition(Condition::tag_exists("a"))
                .with_action(Action::error("x").unwrap());
            let evaluation = evaluate_rule(&rule, &pathway(&["a"]));
            assert_eq!(evaluation.satisfied_groups, vec![None]);
            assert_eq!(evaluation.fired_actions.len(), 1);
        }
    }

    mod weights {
        use super::*;

        fn weighted_rule(threshold: f64) -> Rule {
            rule()
                .with_weight_threshold(threshold)
                .with_condition(Condition::tag_exists("a").with_weight(3.0).unwrap())
                .with_condition(Condition::tag_exists("b"))
                .with_condition(Condition::tag_exists("c"))
        }

        #[test]
        fn threshold_uses_satisfied_weight_share() {
            // a alone carries 3 of 5
            assert!(evaluate_rule(&weighted_rule(0.6), &pathway(&["a"])).fired);
            assert!(!evaluate_rule(&weighted_rule(0.7), &pathway(&["a"])).fired);
            assert!(!evaluate_rule(&weighted_rule(0.6), &pathway(&["b", "c"])).fired);
        }

        #[test]
        fn out_of_range_threshold_never_fires() {
            for threshold in [0.0, -0.5, f64::NAN, 1.5] {
                let rule = rule()
                    .with_weight_threshold(threshold)
                    .with_condition(Condition::tag_exists("missing"))
                    .with_action(Action::error("x").unwrap());
                let evaluation = evaluate_rule(&rule, &pathway(&["a"]));
                assert!(!evaluation.fired, "threshold {} fired", threshold);
                assert!(evaluation.satisfied_groups.is_empty());
            }
        }

        #[test]
        fn weight_ratio_is_reported() {
            let evaluation = evaluate_rule(&weighted_rule(0.5), &pathway(&["b"]));
            assert!((evaluation.weight_ratio - 0.2).abs() < 1e-9);
        }
    }
}
