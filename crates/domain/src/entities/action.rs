//! Action entity - an effect triggered when a rule's conditions hold

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::DomainError;
use crate::value_objects::Severity;

/// Kind of effect an action has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    ValidationError,
    ValidationWarning,
    ValidationInfo,
    Suggestion,
    AutoFix,
    BlockSubmission,
    CustomAction,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation-error",
            Self::ValidationWarning => "validation-warning",
            Self::ValidationInfo => "validation-info",
            Self::Suggestion => "suggestion",
            Self::AutoFix => "auto-fix",
            Self::BlockSubmission => "block-submission",
            Self::CustomAction => "custom-action",
        }
    }

    /// Severity used when a record does not state one.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::ValidationError | Self::BlockSubmission => Severity::Error,
            Self::ValidationWarning | Self::AutoFix => Severity::Warning,
            Self::ValidationInfo | Self::Suggestion | Self::CustomAction => Severity::Info,
        }
    }

    /// User-facing action types must carry a message.
    pub fn requires_message(&self) -> bool {
        matches!(
            self,
            Self::ValidationError | Self::ValidationWarning | Self::ValidationInfo | Self::Suggestion
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directives an `auto-fix` action may carry in `data.fixAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixAction {
    AddTag,
    RemoveTag,
    ReplaceTag,
    AddWarning,
    UpdateSelection,
}

impl FixAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddTag => "add-tag",
            Self::RemoveTag => "remove-tag",
            Self::ReplaceTag => "replace-tag",
            Self::AddWarning => "add-warning",
            Self::UpdateSelection => "update-selection",
        }
    }
}

impl fmt::Display for FixAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add-tag" => Ok(Self::AddTag),
            "remove-tag" => Ok(Self::RemoveTag),
            "replace-tag" => Ok(Self::ReplaceTag),
            "add-warning" => Ok(Self::AddWarning),
            "update-selection" => Ok(Self::UpdateSelection),
            other => Err(DomainError::parse(format!("Unknown fix action: {}", other))),
        }
    }
}

/// Typed view of the parts of `data` the engine itself interprets.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload {
    /// validation-error / -warning / -info: message only
    Notice,
    Suggestion {
        suggested_tags: Vec<String>,
    },
    /// The raw `fixAction` string. It is checked against [`FixAction`] when
    /// the action is resolved, so an unknown directive degrades instead of
    /// failing the whole rule.
    AutoFix {
        fix_action: Option<String>,
    },
    BlockSubmission {
        allow_override: bool,
    },
    Custom,
}

/// An effect triggered when a rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActionRecord", into = "ActionRecord")]
pub struct Action {
    action_type: ActionType,
    severity: Severity,
    message: String,
    payload: ActionPayload,
    /// Full `data` object as supplied, passed through to resolved messages.
    data: Map<String, Value>,
    condition_group: Option<String>,
}

impl Action {
    /// Create an action with the type's default severity and no data.
    ///
    /// # Errors
    ///
    /// Returns `ActionConfigError::MissingMessage` if the type requires a
    /// message and `message` is blank.
    pub fn new(
        action_type: ActionType,
        message: impl Into<String>,
    ) -> Result<Self, ActionConfigError> {
        Self::try_from(ActionRecord {
            action_type,
            severity: None,
            message: message.into(),
            data: None,
            condition_group: None,
        })
    }

    pub fn error(message: impl Into<String>) -> Result<Self, ActionConfigError> {
        Self::new(ActionType::ValidationError, message)
    }

    pub fn warning(message: impl Into<String>) -> Result<Self, ActionConfigError> {
        Self::new(ActionType::ValidationWarning, message)
    }

    pub fn info(message: impl Into<String>) -> Result<Self, ActionConfigError> {
        Self::new(ActionType::ValidationInfo, message)
    }

    pub fn suggestion(
        message: impl Into<String>,
        suggested_tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, ActionConfigError> {
        let tags: Vec<Value> = suggested_tags
            .into_iter()
            .map(|t| Value::String(t.into()))
            .collect();
        let mut data = Map::new();
        data.insert("suggestedTags".to_string(), Value::Array(tags));
        Self::try_from(ActionRecord {
            action_type: ActionType::Suggestion,
            severity: None,
            message: message.into(),
            data: Some(Value::Object(data)),
            condition_group: None,
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn for_group(mut self, group: impl Into<String>) -> Self {
        self.condition_group = Some(group.into());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn payload(&self) -> &ActionPayload {
        &self.payload
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn condition_group(&self) -> Option<&str> {
        self.condition_group.as_deref()
    }
}

// =============================================================================
// Wire Record
// =============================================================================

/// Flat JSON form of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionConfigError {
    #[error("action type '{0}' requires a non-empty message")]
    MissingMessage(ActionType),

    #[error("invalid data for action type '{action_type}': {reason}")]
    InvalidData {
        action_type: ActionType,
        reason: String,
    },
}

impl TryFrom<ActionRecord> for Action {
    type Error = ActionConfigError;

    fn try_from(record: ActionRecord) -> Result<Self, Self::Error> {
        let ActionRecord {
            action_type,
            severity,
            message,
            data,
            condition_group,
        } = record;

        if action_type.requires_message() && message.trim().is_empty() {
            return Err(ActionConfigError::MissingMessage(action_type));
        }

        let invalid = |reason: &str| ActionConfigError::InvalidData {
            action_type,
            reason: reason.to_string(),
        };
        let data = match data {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(invalid("data must be an object")),
        };

        let payload = match action_type {
            ActionType::ValidationError
            | ActionType::ValidationWarning
            | ActionType::ValidationInfo => ActionPayload::Notice,
            ActionType::Suggestion => {
                let suggested_tags = match data.get("suggestedTags") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| invalid("suggestedTags must be an array of strings"))?,
                    Some(_) => return Err(invalid("suggestedTags must be an array of strings")),
                };
                ActionPayload::Suggestion { suggested_tags }
            }
            ActionType::AutoFix => ActionPayload::AutoFix {
                fix_action: data
                    .get("fixAction")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            ActionType::BlockSubmission => ActionPayload::BlockSubmission {
                allow_override: match data.get("allowOverride") {
                    None | Some(Value::Null) => false,
                    Some(Value::Bool(flag)) => *flag,
                    Some(_) => return Err(invalid("allowOverride must be a boolean")),
                },
            },
            ActionType::CustomAction => ActionPayload::Custom,
        };

        Ok(Self {
            action_type,
            severity: severity.unwrap_or_else(|| action_type.default_severity()),
            message,
            payload,
            data,
            condition_group: condition_group.filter(|g| !g.trim().is_empty()),
        })
    }
}

impl From<Action> for ActionRecord {
    fn from(action: Action) -> Self {
        Self {
            action_type: action.action_type,
            severity: Some(action.severity),
            message: action.message,
            data: (!action.data.is_empty()).then_some(Value::Object(action.data)),
            condition_group: action.condition_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Action, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    #[test]
    fn user_facing_actions_need_a_message() {
        let err = parse(json!({"type": "validation-error", "severity": "error"})).unwrap_err();
        assert!(err.contains("requires a non-empty message"));
        assert!(parse(json!({"type": "suggestion", "message": "   "})).is_err());
        assert!(Action::error("").is_err());
    }

    #[test]
    fn auto_fix_and_block_do_not_need_a_message() {
        let fix = parse(json!({"type": "auto-fix", "data": {"fixAction": "remove-tag", "tag": "x"}}))
            .unwrap();
        assert_eq!(
            fix.payload(),
            &ActionPayload::AutoFix {
                fix_action: Some("remove-tag".to_string())
            }
        );
        assert_eq!(fix.severity(), Severity::Warning);

        let block = parse(json!({"type": "block-submission", "data": {"allowOverride": true}}))
            .unwrap();
        assert_eq!(
            block.payload(),
            &ActionPayload::BlockSubmission {
                allow_override: true
            }
        );
        assert_eq!(block.severity(), Severity::Error);
    }

    #[test]
    fn explicit_severity_wins_over_default() {
        let action = parse(json!({
            "type": "validation-warning", "severity": "error", "message": "careful",
        }))
        .unwrap();
        assert_eq!(action.severity(), Severity::Error);
    }

    #[test]
    fn suggested_tags_are_typed() {
        let action = Action::suggestion("Try adding fluff", ["fluff", "hurt/comfort"]).unwrap();
        assert_eq!(
            action.payload(),
            &ActionPayload::Suggestion {
                suggested_tags: vec!["fluff".to_string(), "hurt/comfort".to_string()]
            }
        );

        assert!(parse(json!({
            "type": "suggestion", "message": "m", "data": {"suggestedTags": [1, 2]},
        }))
        .is_err());
    }

    #[test]
    fn data_must_be_an_object() {
        let err = parse(json!({"type": "custom-action", "data": [1]})).unwrap_err();
        assert!(err.contains("data must be an object"));
    }

    #[test]
    fn fix_action_parses_known_directives() {
        assert_eq!("replace-tag".parse::<FixAction>().unwrap(), FixAction::ReplaceTag);
        assert!("teleport".parse::<FixAction>().is_err());
    }

    #[test]
    fn record_round_trip() {
        let source = json!({
            "type": "validation-error",
            "severity": "error",
            "message": "conflict",
            "conditionGroup": "ships",
        });
        let action = parse(source.clone()).unwrap();
        assert_eq!(action.condition_group(), Some("ships"));
        assert_eq!(serde_json::to_value(&action).unwrap(), source);
    }
}
