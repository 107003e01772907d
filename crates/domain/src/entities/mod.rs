//! Entities - the building blocks rules and templates are assembled from

mod action;
mod condition;
mod template_parameter;

pub use action::{
    Action, ActionConfigError, ActionPayload, ActionRecord, ActionType, FixAction,
};
pub use condition::{
    Condition, ConditionConfigError, ConditionKind, ConditionOperator, ConditionRecord,
    ConditionType, CountComparison, LengthComparison, LengthScope, Presence, SelectionMatch,
};
pub use template_parameter::{ParameterRules, ParameterType, TemplateParameter};
