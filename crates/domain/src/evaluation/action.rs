//! Action Resolver - turn a fired action into a message with provenance

use serde_json::{Map, Value};

use super::message::{DiagnosticKind, ResolvedMessage};
use crate::aggregates::Rule;
use crate::entities::{Action, ActionPayload, ActionType, FixAction};
use crate::value_objects::Severity;

/// Which list of the validation result a message belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Errors,
    Warnings,
    Suggestions,
}

impl Bucket {
    /// `suggestion` actions are always suggestions; everything else goes by
    /// severity.
    pub fn for_action(action_type: ActionType, severity: Severity) -> Self {
        if action_type == ActionType::Suggestion {
            return Self::Suggestions;
        }
        match severity {
            Severity::Error => Self::Errors,
            Severity::Warning => Self::Warnings,
            Severity::Info => Self::Suggestions,
        }
    }
}

/// A known auto-fix directive and the thing it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDirective {
    pub action: FixAction,
    /// `data.tag`, `data.fromTag`, `data.selectionKey` or `data.targetTag`,
    /// whichever comes first. Directives without a subject never conflict.
    pub subject: Option<String>,
}

const FIX_SUBJECT_KEYS: [&str; 4] = ["tag", "fromTag", "selectionKey", "targetTag"];

impl FixDirective {
    fn from_data(action: FixAction, data: &Map<String, Value>) -> Self {
        let subject = FIX_SUBJECT_KEYS
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        Self { action, subject }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAction {
    pub message: ResolvedMessage,
    pub bucket: Bucket,
    pub fix: Option<FixDirective>,
    /// Set when the action had to be degraded.
    pub diagnostic: Option<ResolvedMessage>,
}

/// Resolve one fired action of `rule`.
///
/// An `auto-fix` whose `fixAction` is missing or unknown is degraded to a
/// plain warning and reported. A blank message falls back to the rule name.
pub fn resolve(action: &Action, rule: &Rule) -> ResolvedAction {
    let text = if action.message().trim().is_empty() {
        rule.name().to_string()
    } else {
        action.message().to_string()
    };

    let mut severity = action.severity();
    let mut fix = None;
    let mut diagnostic = None;

    if let ActionPayload::AutoFix { fix_action } = action.payload() {
        match fix_action.as_deref().map(str::parse::<FixAction>) {
            Some(Ok(known)) => fix = Some(FixDirective::from_data(known, action.data())),
            unknown => {
                severity = Severity::Warning;
                let received = fix_action.as_deref().unwrap_or("<missing>");
                let mut detail = Map::new();
                detail.insert(
                    "fixAction".to_string(),
                    fix_action.clone().map(Value::String).unwrap_or(Value::Null),
                );
                let reason = match unknown {
                    Some(Err(e)) => e.to_string(),
                    _ => "no fixAction given".to_string(),
                };
                diagnostic = Some(ResolvedMessage::diagnostic(
                    rule,
                    DiagnosticKind::UnknownFixAction,
                    format!(
                        "Auto-fix '{}' degraded to a warning: {}",
                        received, reason
                    ),
                    detail,
                ));
            }
        }
    }

    ResolvedAction {
        message: ResolvedMessage::new(rule, text, severity).with_data(action.data().clone()),
        bucket: Bucket::for_action(action.action_type(), severity),
        fix,
        diagnostic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ActionRecord;
    use crate::ids::{FandomId, RuleId};
    use crate::value_objects::RuleName;
    use serde_json::json;

    fn rule() -> Rule {
        Rule::new(
            RuleId::new("r1").unwrap(),
            RuleName::new("Ship conflict").unwrap(),
            FandomId::new("hp").unwrap(),
        )
    }

    fn action(value: Value) -> Action {
        let record: ActionRecord = serde_json::from_value(value).unwrap();
        Action::try_from(record).unwrap()
    }

    #[test]
    fn attaches_provenance_and_data() {
        let resolved = resolve(
            &Action::suggestion("Try fluff", ["fluff"]).unwrap(),
            &rule(),
        );
        assert_eq!(resolved.message.rule_id.as_str(), "r1");
        assert_eq!(resolved.message.rule_name.as_str(), "Ship conflict");
        assert_eq!(resolved.message.message, "Try fluff");
        assert_eq!(resolved.message.data, Some(json!({"suggestedTags": ["fluff"]})));
        assert_eq!(resolved.bucket, Bucket::Suggestions);
        assert!(resolved.diagnostic.is_none());
    }

    #[test]
    fn buckets_follow_severity() {
        let error = resolve(&Action::error("x").unwrap(), &rule());
        let warning = resolve(&Action::warning("x").unwrap(), &rule());
        let info = resolve(&Action::info("x").unwrap(), &rule());
        let loud_suggestion = resolve(
            &Action::suggestion("x", ["a"])
                .unwrap()
                .with_severity(Severity::Error),
            &rule(),
        );
        assert_eq!(error.bucket, Bucket::Errors);
        assert_eq!(warning.bucket, Bucket::Warnings);
        assert_eq!(info.bucket, Bucket::Suggestions);
        assert_eq!(loud_suggestion.bucket, Bucket::Suggestions);
    }

    #[test]
    fn known_fix_action_yields_directive() {
        let resolved = resolve(
            &action(json!({
                "type": "auto-fix",
                "message": "Replace the tag",
                "data": {"fixAction": "replace-tag", "fromTag": "drarry", "toTag": "harry/draco"},
            })),
            &rule(),
        );
        assert_eq!(
            resolved.fix,
            Some(FixDirective {
                action: FixAction::ReplaceTag,
                subject: Some("drarry".to_string())
            })
        );
        assert_eq!(resolved.bucket, Bucket::Warnings);
    }

    #[test]
    fn unknown_fix_action_degrades_to_warning() {
        let resolved = resolve(
            &action(json!({
                "type": "auto-fix",
                "severity": "error",
                "message": "Teleport the tag",
                "data": {"fixAction": "teleport-tag"},
            })),
            &rule(),
        );
        assert_eq!(resolved.message.severity, Severity::Warning);
        assert_eq!(resolved.bucket, Bucket::Warnings);
        assert!(resolved.fix.is_none());
        let diagnostic = resolved.diagnostic.unwrap();
        assert_eq!(
            diagnostic.data.unwrap()["diagnostic"],
            json!("unknown-fix-action")
        );
    }

    #[test]
    fn blank_message_falls_back_to_rule_name() {
        let resolved = resolve(&action(json!({"type": "block-submission"})), &rule());
        assert_eq!(resolved.message.message, "Ship conflict");
        assert_eq!(resolved.bucket, Bucket::Errors);
    }
}
