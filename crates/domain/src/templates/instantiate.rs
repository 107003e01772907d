//! Template instantiation - turn a template and parameter values into a rule

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::parameters::{merge_defaults, ParameterError, ParameterErrorType, ParameterMap};
use super::placeholders::{scan, substitute, SlotArena};
use crate::aggregates::{Rule, RuleTemplate, TemplateDefinitionError};
use crate::ids::{FandomId, RuleId, TemplateId};

/// Identity of the rule being generated.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantiationTarget {
    pub rule_id: RuleId,
    pub fandom_id: FandomId,
}

impl InstantiationTarget {
    /// Target with a freshly generated rule id.
    pub fn for_fandom(fandom_id: FandomId) -> Self {
        Self {
            rule_id: RuleId::generate(),
            fandom_id,
        }
    }
}

/// A concrete rule produced from a template, with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstantiatedRule {
    /// Pretty-printed JSON of the substituted rule record.
    pub rule_code: String,
    pub generated_rule: Rule,
    pub template_id: TemplateId,
    /// Final parameter values, defaults included.
    pub parameters: ParameterMap,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstantiationError {
    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("Template is inactive: {0}")]
    TemplateInactive(TemplateId),

    #[error("Template definition is inconsistent ({} problem(s))", .0.len())]
    InvalidTemplate(Vec<TemplateDefinitionError>),

    #[error("{} invalid parameter(s)", .0.len())]
    InvalidParameters(Vec<ParameterError>),

    #[error("Template produced an invalid rule: {0}")]
    InvalidGeneratedRule(String),
}

impl InstantiationError {
    /// Flatten into the parameter-error list callers render.
    pub fn into_parameter_errors(self) -> Vec<ParameterError> {
        match self {
            Self::InvalidParameters(errors) => errors,
            Self::TemplateNotFound(id) => vec![ParameterError::new(
                "template",
                ParameterErrorType::NotFound,
                format!("Template '{}' does not exist", id),
            )],
            Self::TemplateInactive(id) => vec![ParameterError::new(
                "template",
                ParameterErrorType::Inactive,
                format!("Template '{}' is not active", id),
            )],
            Self::InvalidTemplate(problems) => problems
                .iter()
                .map(|problem| {
                    ParameterError::new(
                        "template",
                        ParameterErrorType::InvalidValue,
                        problem.to_string(),
                    )
                })
                .collect(),
            Self::InvalidGeneratedRule(reason) => vec![ParameterError::new(
                "template",
                ParameterErrorType::InvalidValue,
                reason,
            )],
        }
    }
}

/// Instantiate `template` with the caller's parameter values.
///
/// The template's definition is re-checked first, so a template that never
/// went through a save (a hand-edited file, say) is still refused. Defaults
/// are merged and every value validated before anything is
/// substituted. The substituted record gets the target's `id` and `name`
/// when the skeleton leaves them out, and always the target's `fandomId`.
/// The generated rule is parsed and definition-checked, so a result never
/// carries a configuration error.
///
/// # Errors
///
/// `TemplateInactive` for a deactivated template, `InvalidTemplate` for an
/// inconsistent definition, `InvalidParameters` with
/// the full error list, or `InvalidGeneratedRule` if the substituted record
/// is not a valid rule.
pub fn instantiate(
    template: &RuleTemplate,
    supplied: &ParameterMap,
    target: InstantiationTarget,
) -> Result<InstantiatedRule, InstantiationError> {
    if !template.is_active() {
        return Err(InstantiationError::TemplateInactive(template.id().clone()));
    }
    template
        .check_definition()
        .map_err(InstantiationError::InvalidTemplate)?;

    let values = merge_defaults(template.parameters(), supplied);
    let errors = template.validate_parameters(&values);
    if !errors.is_empty() {
        return Err(InstantiationError::InvalidParameters(errors));
    }

    let arena = SlotArena::from_parameters(template.parameters(), &values);
    let mut record = substitute(template.template_code(), &arena).map_err(|name| {
        InstantiationError::InvalidGeneratedRule(format!("unresolved placeholder '{}'", name))
    })?;
    let leftover = scan(&record);
    if !leftover.is_empty() {
        return Err(InstantiationError::InvalidGeneratedRule(format!(
            "placeholder tokens remain after substitution: {}",
            leftover.tokens().join(", ")
        )));
    }

    let Value::Object(fields) = &mut record else {
        return Err(InstantiationError::InvalidGeneratedRule(
            "template_code is not a rule object".to_string(),
        ));
    };
    fields
        .entry("id")
        .or_insert_with(|| Value::String(target.rule_id.to_string()));
    fields
        .entry("name")
        .or_insert_with(|| Value::String(template.name().to_string()));
    fields.insert(
        "fandomId".to_string(),
        Value::String(target.fandom_id.to_string()),
    );

    let rule_code = serde_json::to_string_pretty(&record)
        .map_err(|e| InstantiationError::InvalidGeneratedRule(e.to_string()))?;
    let generated_rule: Rule = serde_json::from_value(record)
        .map_err(|e| InstantiationError::InvalidGeneratedRule(e.to_string()))?;
    generated_rule.validate_definition().map_err(|errors| {
        InstantiationError::InvalidGeneratedRule(
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    })?;

    Ok(InstantiatedRule {
        rule_code,
        generated_rule,
        template_id: template.id().clone(),
        parameters: values,
    })
}
