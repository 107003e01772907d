//! Response envelope returned for every engine request
//!
//! Domain taxonomy errors (not-found, inactive, parameter and definition
//! errors) map onto [`ErrorCode`]s here so every caller renders them the
//! same way.

use serde::{Deserialize, Serialize};

use pathwise_domain::{InstantiationError, TemplateDefinitionError};

// =============================================================================
// Response Result
// =============================================================================

/// Result of a request operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseResult {
    /// Operation succeeded
    Success {
        /// Optional data payload (varies by request type)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },

    /// Operation failed
    Error {
        /// Error classification code
        code: ErrorCode,
        /// Human-readable error message
        message: String,
        /// Additional error details (optional)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<serde_json::Value>,
    },

    /// Unknown response type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ResponseResult {
    /// Create a success response with data
    pub fn success<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => ResponseResult::Success { data: Some(data) },
            Err(e) => ResponseResult::error(
                ErrorCode::InternalError,
                format!("Failed to serialize response: {}", e),
            ),
        }
    }

    /// Create a success response without data
    pub fn success_empty() -> Self {
        ResponseResult::Success { data: None }
    }

    /// Create an error response
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ResponseResult::Error {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an error response with details
    pub fn error_with_details<T: Serialize>(
        code: ErrorCode,
        message: impl Into<String>,
        details: T,
    ) -> Self {
        ResponseResult::Error {
            code,
            message: message.into(),
            details: serde_json::to_value(details).ok(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseResult::Error { .. })
    }

    /// The error code, if this is an error response.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ResponseResult::Error { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // === Client Errors ===
    /// Request was malformed or invalid
    BadRequest,
    /// Referenced rule or template does not exist
    NotFound,
    /// Referenced template is deactivated
    Inactive,
    /// Request data failed validation
    ValidationError,
    /// Request exceeds a configured limit
    LimitExceeded,

    // === Server Errors ===
    /// Internal error, including storage failures
    InternalError,

    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Taxonomy Conversions
// =============================================================================

impl From<InstantiationError> for ResponseResult {
    fn from(error: InstantiationError) -> Self {
        let code = match &error {
            InstantiationError::TemplateNotFound(_) => ErrorCode::NotFound,
            InstantiationError::TemplateInactive(_) => ErrorCode::Inactive,
            InstantiationError::InvalidTemplate(_)
            | InstantiationError::InvalidParameters(_)
            | InstantiationError::InvalidGeneratedRule(_) => ErrorCode::ValidationError,
        };
        let message = error.to_string();
        ResponseResult::error_with_details(code, message, error.into_parameter_errors())
    }
}

impl From<Vec<TemplateDefinitionError>> for ResponseResult {
    fn from(errors: Vec<TemplateDefinitionError>) -> Self {
        let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
        ResponseResult::error_with_details(
            ErrorCode::ValidationError,
            "Template definition is inconsistent",
            problems,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathwise_domain::{ParameterError, ParameterErrorType, TemplateId};
    use serde_json::json;

    #[test]
    fn success_serializes_with_status_tag() {
        let value = serde_json::to_value(ResponseResult::success(json!({"isValid": true}))).unwrap();
        assert_eq!(value, json!({"status": "success", "data": {"isValid": true}}));

        let empty = serde_json::to_value(ResponseResult::success_empty()).unwrap();
        assert_eq!(empty, json!({"status": "success"}));
    }

    #[test]
    fn unknown_status_deserializes_to_unknown() {
        let result: ResponseResult = serde_json::from_value(json!({"status": "pending"})).unwrap();
        assert!(matches!(result, ResponseResult::Unknown));
        assert!(!result.is_success());
        assert!(!result.is_error());
    }

    #[test]
    fn inactive_template_maps_to_inactive_code() {
        let id = TemplateId::new("tpl-1").unwrap();
        let result = ResponseResult::from(InstantiationError::TemplateInactive(id));
        assert_eq!(result.error_code(), Some(ErrorCode::Inactive));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["code"], json!("inactive"));
        assert_eq!(value["details"][0]["parameter_name"], json!("template"));
        assert_eq!(value["details"][0]["error_type"], json!("inactive"));
    }

    #[test]
    fn parameter_errors_are_listed_in_details() {
        let errors = vec![
            ParameterError::new("a", ParameterErrorType::RequiredMissing, "a is required"),
            ParameterError::new("b", ParameterErrorType::MinLength, "b is too short"),
        ];
        let result = ResponseResult::from(InstantiationError::InvalidParameters(errors));
        let ResponseResult::Error { code, details, .. } = result else {
            panic!("expected an error");
        };
        assert_eq!(code, ErrorCode::ValidationError);
        assert_eq!(details.unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn definition_errors_render_their_messages() {
        let result = ResponseResult::from(vec![TemplateDefinitionError::UnusedParameter(
            "severity".to_string(),
        )]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["details"],
            json!(["parameter 'severity' is never referenced by template_code"])
        );
    }
}
