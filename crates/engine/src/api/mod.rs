//! API layer - turns request envelopes into use-case calls and responses.

use pathwise_shared::{EngineRequest, ErrorCode, ResponseResult};

use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::{InstantiateRequest, TemplateUseCaseError, ValidatePathwayError};

/// Parse a raw request document and answer it.
pub async fn handle_json(app: &App, input: &str) -> ResponseResult {
    match EngineRequest::from_json(input) {
        Ok(request) => handle_request(app, request).await,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected unreadable request");
            ResponseResult::error(ErrorCode::BadRequest, e.to_string())
        }
    }
}

/// Answer one request.
pub async fn handle_request(app: &App, request: EngineRequest) -> ResponseResult {
    let kind = request.kind();
    tracing::debug!(request = kind, "Handling request");

    let response = match request {
        EngineRequest::ValidatePathway {
            pathway,
            custom_results,
        } => app
            .use_cases
            .validation
            .execute(&pathway, &custom_results)
            .await
            .map(ResponseResult::success)
            .unwrap_or_else(ResponseResult::from),
        EngineRequest::TestRule {
            rule_id,
            pathway,
            custom_results,
        } => app
            .use_cases
            .validation
            .test_rule(&rule_id, &pathway, &custom_results)
            .await
            .map(ResponseResult::success)
            .unwrap_or_else(ResponseResult::from),
        EngineRequest::SaveTemplate { template } => app
            .use_cases
            .templates
            .save(template)
            .await
            .map(ResponseResult::success)
            .unwrap_or_else(ResponseResult::from),
        EngineRequest::InstantiateTemplate {
            template_id,
            fandom_id,
            rule_id,
            parameters,
        } => app
            .use_cases
            .templates
            .instantiate(InstantiateRequest {
                template_id,
                fandom_id,
                rule_id,
                parameters,
            })
            .await
            .map(ResponseResult::success)
            .unwrap_or_else(ResponseResult::from),
    };

    if let ResponseResult::Error { code, message, .. } = &response {
        tracing::info!(request = kind, code = ?code, message = %message, "Request failed");
    }
    response
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidatePathwayError> for ResponseResult {
    fn from(error: ValidatePathwayError) -> Self {
        match error {
            ValidatePathwayError::TooManyPathwayItems { .. }
            | ValidatePathwayError::TooManyRules { .. } => {
                ResponseResult::error(ErrorCode::LimitExceeded, error.to_string())
            }
            ValidatePathwayError::RuleNotFound(_) => {
                ResponseResult::error(ErrorCode::NotFound, error.to_string())
            }
            ValidatePathwayError::Repo(e) => repo_error(e),
        }
    }
}

impl From<TemplateUseCaseError> for ResponseResult {
    fn from(error: TemplateUseCaseError) -> Self {
        match error {
            TemplateUseCaseError::InvalidDefinition(problems) => ResponseResult::from(problems),
            TemplateUseCaseError::TooManyParameters { .. } => {
                ResponseResult::error(ErrorCode::LimitExceeded, error.to_string())
            }
            TemplateUseCaseError::Instantiation(e) => ResponseResult::from(e),
            TemplateUseCaseError::Repo(e) => repo_error(e),
        }
    }
}

fn repo_error(error: RepoError) -> ResponseResult {
    let code = if error.is_not_found() {
        ErrorCode::NotFound
    } else {
        tracing::error!(error = %error, "Repository failure");
        ErrorCode::InternalError
    };
    ResponseResult::error(code, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::config::EngineLimits;
    use crate::infrastructure::json_store::JsonFileStore;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn app(dir: &tempfile::TempDir) -> App {
        let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
        let clock = Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        App::with_store(store, clock, EngineLimits::default())
    }

    async fn call(app: &App, request: Value) -> Value {
        let response = handle_json(app, &request.to_string()).await;
        serde_json::to_value(response).unwrap()
    }

    fn template() -> Value {
        json!({
            "id": "tpl-ship-conflict",
            "name": "Ship conflict",
            "category": "relationships",
            "parameters": [
                {"name": "ship", "type": "string", "required": true},
                {"name": "rival", "type": "string", "required": true},
            ],
            "template_code": {
                "conditions": [
                    {"type": "tag-exists", "target": "{{ship}}", "operator": "exists"},
                    {"type": "tag-exists", "target": "{{rival}}", "operator": "exists"},
                ],
                "actions": [
                    {"type": "validation-error", "message": "{{ship}} conflicts with {{rival}}"},
                ],
            },
        })
    }

    #[tokio::test]
    async fn template_round_trip_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir).await;

        let saved = call(&app, json!({"type": "saveTemplate", "template": template()})).await;
        assert_eq!(saved["status"], "success");

        let generated = call(
            &app,
            json!({
                "type": "instantiateTemplate",
                "templateId": "tpl-ship-conflict",
                "fandomId": "hp",
                "ruleId": "hp-drarry-vs-hinny",
                "parameters": {"ship": "harry/draco", "rival": "harry/ginny"},
            }),
        )
        .await;
        assert_eq!(generated["status"], "success");
        assert_eq!(generated["data"]["usage_count"], 1);

        let validated = call(
            &app,
            json!({
                "type": "validatePathway",
                "pathway": {"fandomId": "hp", "tags": ["harry/draco", "harry/ginny"]},
            }),
        )
        .await;
        assert_eq!(validated["data"]["isValid"], false);
        assert_eq!(
            validated["data"]["errors"][0]["message"],
            "harry/draco conflicts with harry/ginny"
        );
        assert_eq!(validated["data"]["appliedRules"], json!(["hp-drarry-vs-hinny"]));
    }

    #[tokio::test]
    async fn taxonomy_errors_map_to_codes() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir).await;

        let missing_rule = call(
            &app,
            json!({"type": "testRule", "ruleId": "nope", "pathway": {"fandomId": "hp"}}),
        )
        .await;
        assert_eq!(missing_rule["code"], "not_found");

        let missing_template = call(
            &app,
            json!({"type": "instantiateTemplate", "templateId": "nope", "fandomId": "hp"}),
        )
        .await;
        assert_eq!(missing_template["code"], "not_found");
        assert_eq!(missing_template["details"][0]["error_type"], "not_found");

        let mut broken = template();
        broken["parameters"][1]["name"] = json!("unused");
        let rejected = call(&app, json!({"type": "saveTemplate", "template": broken})).await;
        assert_eq!(rejected["code"], "validation_error");
    }

    #[tokio::test]
    async fn unreadable_request_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir).await;

        let response = handle_json(&app, "{not json").await;
        assert_eq!(response.error_code(), Some(ErrorCode::BadRequest));
    }
}
