//! Evaluation engine
//!
//! Leaf-first: [`condition`] evaluates one condition, [`action`] resolves a
//! fired action into a message, [`rule`] combines a rule's conditions and
//! [`pathway`] runs a whole rule set. Everything here is synchronous and
//! pure; a pass allocates only its own state and never mutates its inputs.

pub mod action;
pub mod condition;
pub mod custom;
pub mod message;
pub mod pathway;
pub mod rule;

pub use action::{resolve, Bucket, FixDirective, ResolvedAction};
pub use condition::{evaluate_condition, ConditionEvaluator, ConditionFault, ConditionOutcome};
pub use custom::{CustomConditionHost, NoCustomHost, PrecomputedCustomResults};
pub use message::{DiagnosticKind, ResolvedMessage};
pub use pathway::{validate_pathway, PathwayValidator, ValidationResult};
pub use rule::{evaluate_rule, RuleEvaluation, RuleEvaluator, RuleFault};
