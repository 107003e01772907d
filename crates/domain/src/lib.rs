//! Pathwise domain - rules, templates and the pathway validation engine.
//!
//! Pure and synchronous: no I/O, no logging, no shared state. Callers load
//! rules and templates, hand them in by reference and get typed results back.

pub mod aggregates;
pub mod common;
pub mod entities;
pub mod error;
pub mod evaluation;
pub mod ids;
pub mod templates;
pub mod value_objects;

// Re-export aggregates
pub use aggregates::{Rule, RuleDefinitionError, RuleTemplate, TemplateDefinitionError};

// Re-export entities (explicit list in entities/mod.rs)
pub use entities::{
    Action, ActionConfigError, ActionPayload, ActionRecord, ActionType, Condition,
    ConditionConfigError, ConditionKind, ConditionOperator, ConditionRecord, ConditionType,
    CountComparison, FixAction, LengthComparison, LengthScope, ParameterRules, ParameterType,
    Presence, SelectionMatch, TemplateParameter,
};

pub use error::DomainError;

// Re-export the evaluation engine
pub use evaluation::{
    evaluate_condition, evaluate_rule, resolve, validate_pathway, Bucket, ConditionEvaluator,
    ConditionFault, CustomConditionHost, DiagnosticKind, FixDirective, NoCustomHost,
    PathwayValidator, PrecomputedCustomResults, ResolvedAction, ResolvedMessage, RuleEvaluation,
    RuleEvaluator, ValidationResult,
};

// Re-export ID types
pub use ids::{FandomId, RuleId, TemplateId};

// Re-export template operations
pub use templates::{
    instantiate, merge_defaults, validate_parameters, InstantiatedRule, InstantiationError,
    InstantiationTarget, ParameterError, ParameterErrorType, ParameterMap,
};

// Re-export value objects (explicit list in value_objects/mod.rs)
pub use value_objects::{LogicOperator, Pathway, RuleName, Severity, TemplateName};
