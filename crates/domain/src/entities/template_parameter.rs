//! Template parameter declarations

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON type a template parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific constraints on a parameter value.
///
/// Length and pattern rules apply to strings, value bounds to numbers and
/// `allowed_values` to any type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

impl ParameterRules {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Human-readable summary of the constraints, reported back to callers
    /// as the expected format of a rejected value.
    pub fn describe(&self, param_type: ParameterType) -> String {
        let mut parts = vec![param_type.as_str().to_string()];
        if let Some(min) = self.min_length {
            parts.push(format!("min length {}", min));
        }
        if let Some(max) = self.max_length {
            parts.push(format!("max length {}", max));
        }
        if let Some(pattern) = &self.pattern {
            parts.push(format!("pattern {}", pattern));
        }
        if let Some(min) = self.min_value {
            parts.push(format!(">= {}", min));
        }
        if let Some(max) = self.max_value {
            parts.push(format!("<= {}", max));
        }
        if let Some(allowed) = &self.allowed_values {
            let rendered: Vec<String> = allowed.iter().map(Value::to_string).collect();
            parts.push(format!("one of [{}]", rendered.join(", ")));
        }
        parts.join(", ")
    }
}

/// A named, typed slot in a rule template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "ParameterRules::is_empty")]
    pub validation_rules: ParameterRules,
}

impl TemplateParameter {
    pub fn new(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            description: None,
            default_value: None,
            validation_rules: ParameterRules::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_rules(mut self, rules: ParameterRules) -> Self {
        self.validation_rules = rules;
        self
    }

    pub fn expected_format(&self) -> String {
        self.validation_rules.describe(self.param_type)
    }
}
