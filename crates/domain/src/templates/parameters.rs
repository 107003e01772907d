//! Template parameter validation
//!
//! All problems are collected rather than stopping at the first, so a caller
//! can show every bad parameter at once.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::placeholders::contains_placeholder;
use crate::common::{json_equal, json_type_name};
use crate::entities::{ParameterType, TemplateParameter};

/// Parameter values keyed by parameter name.
pub type ParameterMap = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterErrorType {
    RequiredMissing,
    UnknownParameter,
    TypeMismatch,
    MinLength,
    MaxLength,
    PatternMismatch,
    MinValue,
    MaxValue,
    InvalidValue,
    /// The referenced template does not exist.
    NotFound,
    /// The referenced template is deactivated.
    Inactive,
}

impl ParameterErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredMissing => "required_missing",
            Self::UnknownParameter => "unknown_parameter",
            Self::TypeMismatch => "type_mismatch",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::PatternMismatch => "pattern_mismatch",
            Self::MinValue => "min_value",
            Self::MaxValue => "max_value",
            Self::InvalidValue => "invalid_value",
            Self::NotFound => "not_found",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ParameterErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem with one parameter, in the wire shape callers render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterError {
    pub parameter_name: String,
    pub error_type: ParameterErrorType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_format: Option<String>,
}

impl ParameterError {
    pub fn new(
        parameter_name: impl Into<String>,
        error_type: ParameterErrorType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            error_type,
            message: message.into(),
            received_value: None,
            expected_format: None,
        }
    }

    pub fn with_received(mut self, value: &Value) -> Self {
        self.received_value = Some(value.clone());
        self
    }

    pub fn with_expected(mut self, format: impl Into<String>) -> Self {
        self.expected_format = Some(format.into());
        self
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.parameter_name, self.error_type, self.message)
    }
}

/// Fill in `default_value` for optional parameters the caller left out.
///
/// Required parameters never take their default; leaving one out is a
/// `required_missing` error.
pub fn merge_defaults(parameters: &[TemplateParameter], supplied: &ParameterMap) -> ParameterMap {
    let mut merged = supplied.clone();
    for parameter in parameters {
        if parameter.required || merged.contains_key(&parameter.name) {
            continue;
        }
        if let Some(default) = &parameter.default_value {
            merged.insert(parameter.name.clone(), default.clone());
        }
    }
    merged
}

/// Validate parameter values against their declarations.
///
/// Errors come out in three passes: missing required parameters, then
/// undeclared ones, then type and rule violations per declared parameter.
/// An empty result means the values are valid.
pub fn validate_parameters(
    parameters: &[TemplateParameter],
    values: &ParameterMap,
) -> Vec<ParameterError> {
    let mut errors = Vec::new();

    for parameter in parameters.iter().filter(|p| p.required) {
        if !values.contains_key(&parameter.name) {
            errors.push(
                ParameterError::new(
                    &parameter.name,
                    ParameterErrorType::RequiredMissing,
                    format!("Required parameter '{}' is missing", parameter.name),
                )
                .with_expected(parameter.expected_format()),
            );
        }
    }

    for name in values.keys() {
        if !parameters.iter().any(|p| &p.name == name) {
            errors.push(ParameterError::new(
                name,
                ParameterErrorType::UnknownParameter,
                format!("Parameter '{}' is not declared by this template", name),
            ));
        }
    }

    for parameter in parameters {
        if let Some(value) = values.get(&parameter.name) {
            errors.extend(validate_value(parameter, value));
        }
    }

    errors
}

/// Check one value against one parameter's type and validation rules.
pub fn validate_value(parameter: &TemplateParameter, value: &Value) -> Vec<ParameterError> {
    let name = parameter.name.as_str();
    let rules = &parameter.validation_rules;
    let error = |error_type: ParameterErrorType, message: String| {
        ParameterError::new(name, error_type, message)
            .with_received(value)
            .with_expected(parameter.expected_format())
    };

    if !parameter.param_type.matches(value) {
        return vec![error(
            ParameterErrorType::TypeMismatch,
            format!(
                "Parameter '{}' must be of type {}, got {}",
                name,
                parameter.param_type,
                json_type_name(value)
            ),
        )];
    }

    let mut errors = Vec::new();

    if contains_placeholder(value) {
        errors.push(error(
            ParameterErrorType::InvalidValue,
            format!("Parameter '{}' must not contain placeholder tokens", name),
        ));
    }

    match (parameter.param_type, value) {
        (ParameterType::String, Value::String(text)) => {
            let length = text.chars().count();
            if let Some(min) = rules.min_length {
                if length < min {
                    errors.push(error(
                        ParameterErrorType::MinLength,
                        format!("Parameter '{}' must be at least {} characters", name, min),
                    ));
                }
            }
            if let Some(max) = rules.max_length {
                if length > max {
                    errors.push(error(
                        ParameterErrorType::MaxLength,
                        format!("Parameter '{}' must be at most {} characters", name, max),
                    ));
                }
            }
            if let Some(pattern) = &rules.pattern {
                match regex::Regex::new(pattern) {
                    Ok(re) if re.is_match(text) => {}
                    Ok(_) => errors.push(error(
                        ParameterErrorType::PatternMismatch,
                        format!("Parameter '{}' does not match pattern {}", name, pattern),
                    )),
                    Err(e) => errors.push(error(
                        ParameterErrorType::PatternMismatch,
                        format!("Parameter '{}' has an unusable pattern: {}", name, e),
                    )),
                }
            }
        }
        (ParameterType::Number, Value::Number(number)) => {
            let n = number.as_f64().unwrap_or(f64::NAN);
            if let Some(min) = rules.min_value {
                if n.is_nan() || n < min {
                    errors.push(error(
                        ParameterErrorType::MinValue,
                        format!("Parameter '{}' must be at least {}", name, min),
                    ));
                }
            }
            if let Some(max) = rules.max_value {
                if n.is_nan() || n > max {
                    errors.push(error(
                        ParameterErrorType::MaxValue,
                        format!("Parameter '{}' must be at most {}", name, max),
                    ));
                }
            }
        }
        _ => {}
    }

    if let Some(allowed) = &rules.allowed_values {
        if !allowed.iter().any(|candidate| json_equal(candidate, value)) {
            errors.push(error(
                ParameterErrorType::InvalidValue,
                format!("Parameter '{}' is not one of the allowed values", name),
            ));
        }
    }

    errors
}
