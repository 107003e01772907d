//! Template use cases: save a template definition, instantiate it into a rule.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use pathwise_domain::{
    instantiate, FandomId, InstantiatedRule, InstantiationError, InstantiationTarget,
    ParameterMap, RuleId, RuleTemplate, TemplateDefinitionError, TemplateId,
};

use crate::infrastructure::config::EngineLimits;
use crate::infrastructure::ports::{ClockPort, RepoError, RuleRepo, TemplateRepo};

/// Everything needed to generate one rule from a template.
#[derive(Debug, Clone)]
pub struct InstantiateRequest {
    pub template_id: TemplateId,
    pub fandom_id: FandomId,
    /// Id for the generated rule; generated when absent.
    pub rule_id: Option<RuleId>,
    pub parameters: ParameterMap,
}

/// A stored rule generated from a template.
#[derive(Debug, Clone, Serialize)]
pub struct InstantiationReport {
    #[serde(flatten)]
    pub instantiated: InstantiatedRule,
    /// Template usage after this instantiation.
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateUseCaseError {
    #[error("Template definition is inconsistent ({} problem(s))", .0.len())]
    InvalidDefinition(Vec<TemplateDefinitionError>),
    #[error("{count} parameters supplied, the limit is {limit}")]
    TooManyParameters { count: usize, limit: usize },
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Template operations.
pub struct TemplateOps {
    templates: Arc<dyn TemplateRepo>,
    rules: Arc<dyn RuleRepo>,
    clock: Arc<dyn ClockPort>,
    limits: EngineLimits,
}

impl TemplateOps {
    pub fn new(
        templates: Arc<dyn TemplateRepo>,
        rules: Arc<dyn RuleRepo>,
        clock: Arc<dyn ClockPort>,
        limits: EngineLimits,
    ) -> Self {
        Self {
            templates,
            rules,
            clock,
            limits,
        }
    }

    /// Check a template definition and store it. Inconsistent templates are
    /// never persisted.
    pub async fn save(&self, template: RuleTemplate) -> Result<RuleTemplate, TemplateUseCaseError> {
        if let Err(problems) = template.check_definition() {
            tracing::warn!(
                template_id = %template.id(),
                problems = problems.len(),
                "Rejected inconsistent template"
            );
            return Err(TemplateUseCaseError::InvalidDefinition(problems));
        }

        self.templates.save(&template).await?;
        tracing::info!(
            template_id = %template.id(),
            parameters = template.parameters().len(),
            "Template saved"
        );
        Ok(template)
    }

    /// Generate a rule from a stored template, store it and count the use.
    pub async fn instantiate(
        &self,
        request: InstantiateRequest,
    ) -> Result<InstantiationReport, TemplateUseCaseError> {
        let count = request.parameters.len();
        if count > self.limits.max_template_parameters {
            tracing::warn!(
                template_id = %request.template_id,
                count,
                limit = self.limits.max_template_parameters,
                "Parameter limit exceeded"
            );
            return Err(TemplateUseCaseError::TooManyParameters {
                count,
                limit: self.limits.max_template_parameters,
            });
        }

        let template = self
            .templates
            .get(&request.template_id)
            .await?
            .ok_or_else(|| InstantiationError::TemplateNotFound(request.template_id.clone()))?;
        tracing::debug!(template_id = %request.template_id, "Loaded template");

        let target = match request.rule_id {
            Some(rule_id) => InstantiationTarget {
                rule_id,
                fandom_id: request.fandom_id,
            },
            None => InstantiationTarget::for_fandom(request.fandom_id),
        };

        let instantiated = instantiate(&template, &request.parameters, target).inspect_err(|e| {
            tracing::warn!(template_id = %request.template_id, error = %e, "Instantiation rejected");
        })?;

        self.rules.save(&instantiated.generated_rule).await?;
        let usage_count = self.templates.record_usage(&request.template_id).await?;
        tracing::info!(
            template_id = %request.template_id,
            rule_id = %instantiated.generated_rule.id(),
            fandom_id = %instantiated.generated_rule.fandom_id(),
            usage_count,
            "Template instantiated"
        );

        Ok(InstantiationReport {
            instantiated,
            usage_count,
            created_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, MockRuleRepo, MockTemplateRepo};
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn template(active: bool) -> RuleTemplate {
        serde_json::from_value::<RuleTemplate>(json!({
            "id": "tpl-forbid",
            "name": "Forbid tag",
            "parameters": [
                {"name": "tag", "type": "string", "required": true,
                 "validation_rules": {"min_length": 2}},
            ],
            "template_code": {
                "conditions": [{"type": "tag-exists", "target": "{{tag}}", "operator": "exists"}],
                "actions": [{"type": "validation-error", "message": "{{tag}} is not allowed"}],
            },
        }))
        .unwrap()
        .with_active(active)
    }

    fn params(value: Value) -> ParameterMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn request(parameters: Value) -> InstantiateRequest {
        InstantiateRequest {
            template_id: TemplateId::new("tpl-forbid").unwrap(),
            fandom_id: FandomId::new("hp").unwrap(),
            rule_id: Some(RuleId::new("generated").unwrap()),
            parameters: params(parameters),
        }
    }

    fn clock() -> Arc<dyn ClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(fixed_time);
        Arc::new(clock)
    }

    fn ops(templates: MockTemplateRepo, rules: MockRuleRepo) -> TemplateOps {
        TemplateOps::new(
            Arc::new(templates),
            Arc::new(rules),
            clock(),
            EngineLimits::default(),
        )
    }

    mod save {
        use super::*;

        #[tokio::test]
        async fn consistent_template_is_stored() {
            let mut templates = MockTemplateRepo::new();
            templates
                .expect_save()
                .withf(|t| t.id().as_str() == "tpl-forbid")
                .times(1)
                .returning(|_| Ok(()));

            let saved = ops(templates, MockRuleRepo::new())
                .save(template(true))
                .await
                .unwrap();
            assert_eq!(saved.id().as_str(), "tpl-forbid");
        }

        #[tokio::test]
        async fn inconsistent_template_is_never_stored() {
            let broken: RuleTemplate = serde_json::from_value(json!({
                "id": "tpl-broken",
                "name": "Broken",
                "parameters": [{"name": "unused", "type": "string"}],
                "template_code": {
                    "conditions": [{"type": "tag-exists", "target": "{{missing}}", "operator": "exists"}],
                },
            }))
            .unwrap();
            let mut templates = MockTemplateRepo::new();
            templates.expect_save().never();

            let err = ops(templates, MockRuleRepo::new())
                .save(broken)
                .await
                .unwrap_err();
            let TemplateUseCaseError::InvalidDefinition(problems) = err else {
                panic!("expected a definition error, got {:?}", err);
            };
            assert!(problems.contains(&TemplateDefinitionError::UndeclaredPlaceholder(
                "missing".to_string()
            )));
            assert!(problems.contains(&TemplateDefinitionError::UnusedParameter(
                "unused".to_string()
            )));
        }
    }

    mod instantiate {
        use super::*;

        #[tokio::test]
        async fn generated_rule_is_stored_and_usage_counted() {
            let mut templates = MockTemplateRepo::new();
            templates
                .expect_get()
                .returning(|_| Ok(Some(template(true))));
            templates
                .expect_record_usage()
                .times(1)
                .returning(|_| Ok(4));
            let mut rules = MockRuleRepo::new();
            rules
                .expect_save()
                .withf(|rule| rule.id().as_str() == "generated" && rule.fandom_id().as_str() == "hp")
                .times(1)
                .returning(|_| Ok(()));

            let report = ops(templates, rules)
                .instantiate(request(json!({"tag": "harry/hermione"})))
                .await
                .unwrap();

            assert_eq!(report.usage_count, 4);
            assert_eq!(report.created_at, fixed_time());
            assert!(!report.instantiated.rule_code.contains("{{"));
            let value = serde_json::to_value(&report).unwrap();
            assert_eq!(value["template_id"], "tpl-forbid");
            assert_eq!(value["parameters"], json!({"tag": "harry/hermione"}));
        }

        #[tokio::test]
        async fn missing_template_is_not_found() {
            let mut templates = MockTemplateRepo::new();
            templates.expect_get().returning(|_| Ok(None));

            let err = ops(templates, MockRuleRepo::new())
                .instantiate(request(json!({"tag": "xy"})))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                TemplateUseCaseError::Instantiation(InstantiationError::TemplateNotFound(_))
            ));
        }

        #[tokio::test]
        async fn inactive_template_stores_nothing() {
            let mut templates = MockTemplateRepo::new();
            templates
                .expect_get()
                .returning(|_| Ok(Some(template(false))));
            templates.expect_record_usage().never();
            let mut rules = MockRuleRepo::new();
            rules.expect_save().never();

            let err = ops(templates, rules)
                .instantiate(request(json!({"tag": "xy"})))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                TemplateUseCaseError::Instantiation(InstantiationError::TemplateInactive(_))
            ));
        }

        #[tokio::test]
        async fn bad_parameters_store_nothing() {
            let mut templates = MockTemplateRepo::new();
            templates
                .expect_get()
                .returning(|_| Ok(Some(template(true))));
            let mut rules = MockRuleRepo::new();
            rules.expect_save().never();

            let err = ops(templates, rules)
                .instantiate(request(json!({"tag": "x", "extra": 1})))
                .await
                .unwrap_err();
            let TemplateUseCaseError::Instantiation(InstantiationError::InvalidParameters(errors)) =
                err
            else {
                panic!("expected parameter errors, got {:?}", err);
            };
            assert_eq!(errors.len(), 2);
        }

        #[tokio::test]
        async fn too_many_parameters_are_rejected_before_lookup() {
            let ops = TemplateOps::new(
                Arc::new(MockTemplateRepo::new()),
                Arc::new(MockRuleRepo::new()),
                clock(),
                EngineLimits {
                    max_template_parameters: 1,
                    ..EngineLimits::default()
                },
            );

            let err = ops
                .instantiate(request(json!({"tag": "xy", "more": "z"})))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                TemplateUseCaseError::TooManyParameters { count: 2, limit: 1 }
            ));
        }
    }
}
