//! RuleTemplate aggregate - a parameterized rule skeleton
//!
//! A template is checked for consistency when it is built, so every template
//! that reaches instantiation has exactly one declared parameter per
//! placeholder and no unused parameters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::entities::TemplateParameter;
use crate::ids::TemplateId;
use crate::templates::{
    placeholders, validate_parameters, validate_value, ParameterError, ParameterMap,
};
use crate::value_objects::TemplateName;

fn default_active() -> bool {
    true
}

/// A parameterized rule skeleton.
///
/// `template_code` is a rule record (see [`crate::Rule`]) whose strings may
/// contain `{{PARAM_NAME}}` tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTemplate {
    id: TemplateId,
    name: TemplateName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    parameters: Vec<TemplateParameter>,
    template_code: Value,
    #[serde(default = "default_active", alias = "isActive")]
    is_active: bool,
    #[serde(default, alias = "usageCount")]
    usage_count: u64,
}

impl RuleTemplate {
    /// Build a template and run its definition check.
    ///
    /// # Errors
    ///
    /// Returns every [`TemplateDefinitionError`] found.
    pub fn new(
        id: TemplateId,
        name: TemplateName,
        category: impl Into<String>,
        parameters: Vec<TemplateParameter>,
        template_code: Value,
    ) -> Result<Self, Vec<TemplateDefinitionError>> {
        let template = Self {
            id,
            name,
            description: None,
            category: category.into(),
            parameters,
            template_code,
            is_active: true,
            usage_count: 0,
        };
        template.check_definition()?;
        Ok(template)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    pub fn name(&self) -> &TemplateName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn parameters(&self) -> &[TemplateParameter] {
        &self.parameters
    }

    pub fn template_code(&self) -> &Value {
        &self.template_code
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn record_usage(&mut self) {
        self.usage_count = self.usage_count.saturating_add(1);
    }

    // =========================================================================
    // Definition Check
    // =========================================================================

    /// Save-time consistency check.
    ///
    /// Placeholders and declared parameters must match one-to-one, parameter
    /// names must be unique, `pattern` rules must compile and defaults must
    /// pass their own parameter's rules.
    pub fn check_definition(&self) -> Result<(), Vec<TemplateDefinitionError>> {
        let mut errors = Vec::new();

        if !self.template_code.is_object() {
            errors.push(TemplateDefinitionError::SkeletonNotObject);
        }

        let scan = placeholders::scan(&self.template_code);
        for token in &scan.malformed {
            errors.push(TemplateDefinitionError::MalformedPlaceholder(token.clone()));
        }

        let mut seen = HashSet::new();
        for parameter in &self.parameters {
            if !seen.insert(parameter.name.as_str()) {
                errors.push(TemplateDefinitionError::DuplicateParameter(
                    parameter.name.clone(),
                ));
            }
        }

        for name in &scan.names {
            if !seen.contains(name.as_str()) {
                errors.push(TemplateDefinitionError::UndeclaredPlaceholder(name.clone()));
            }
        }

        for parameter in &self.parameters {
            if !scan.contains(&parameter.name) {
                errors.push(TemplateDefinitionError::UnusedParameter(
                    parameter.name.clone(),
                ));
            }
            if let Some(pattern) = &parameter.validation_rules.pattern {
                if let Err(e) = regex::Regex::new(pattern) {
                    errors.push(TemplateDefinitionError::InvalidPattern {
                        parameter: parameter.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
            if let Some(default) = &parameter.default_value {
                let problems = validate_value(parameter, default);
                if !problems.is_empty() {
                    errors.push(TemplateDefinitionError::InvalidDefault {
                        parameter: parameter.name.clone(),
                        problems,
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

    /// Validate caller-supplied values against this template's parameters.
    /// Defaults must already be merged.
    pub fn validate_parameters(&self, values: &ParameterMap) -> Vec<ParameterError> {
        validate_parameters(&self.parameters, values)
    }
}

/// A template definition problem found at save time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateDefinitionError {
    #[error("template_code must be a rule object")]
    SkeletonNotObject,

    #[error("placeholder '{0}' is not a valid parameter reference")]
    MalformedPlaceholder(String),

    #[error("placeholder '{{{{{0}}}}}' has no declared parameter")]
    UndeclaredPlaceholder(String),

    #[error("parameter '{0}' is never referenced by template_code")]
    UnusedParameter(String),

    #[error("parameter '{0}' is declared more than once")]
    DuplicateParameter(String),

    #[error("parameter '{parameter}' has a pattern that does not compile: {reason}")]
    InvalidPattern { parameter: String, reason: String },

    #[error("default value of parameter '{parameter}' is invalid: {}", join_problems(.problems))]
    InvalidDefault {
        parameter: String,
        problems: Vec<ParameterError>,
    },
}

fn join_problems(problems: &[ParameterError]) -> String {
    problems
        .iter()
        .map(|p| p.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
