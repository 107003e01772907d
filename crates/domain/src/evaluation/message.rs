//! Resolved messages - the entries of a validation result

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregates::Rule;
use crate::ids::RuleId;
use crate::value_objects::{RuleName, Severity};

/// A fired action (or diagnostic) tagged with the rule it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMessage {
    pub rule_id: RuleId,
    pub rule_name: RuleName,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResolvedMessage {
    pub fn new(rule: &Rule, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            rule_id: rule.id().clone(),
            rule_name: rule.name().clone(),
            message: message.into(),
            severity,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = (!data.is_empty()).then_some(Value::Object(data));
        self
    }

    /// A warning about a soft failure during evaluation.
    ///
    /// `data.diagnostic` names the kind; `detail` entries are merged
    /// alongside it.
    pub fn diagnostic(
        rule: &Rule,
        kind: DiagnosticKind,
        message: impl Into<String>,
        detail: Map<String, Value>,
    ) -> Self {
        let mut data = detail;
        data.insert(
            "diagnostic".to_string(),
            Value::String(kind.as_str().to_string()),
        );
        Self::new(rule, message, Severity::Warning).with_data(data)
    }
}

/// Soft failures reported in `ValidationResult::diagnostics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    InvalidRegex,
    UnansweredCustomRule,
    UnknownFixAction,
    SupersededAutoFix,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRegex => "invalid-regex",
            Self::UnansweredCustomRule => "unanswered-custom-rule",
            Self::UnknownFixAction => "unknown-fix-action",
            Self::SupersededAutoFix => "superseded-auto-fix",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
