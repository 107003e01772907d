//! Request envelopes accepted by the engine
//!
//! Every request is one JSON object tagged by `type`:
//!
//! ```json
//! {"type": "validatePathway", "pathway": {"fandomId": "hp", "tags": ["harry/draco"]}}
//! ```

use serde::{Deserialize, Serialize};

use pathwise_domain::{
    FandomId, ParameterMap, Pathway, PrecomputedCustomResults, RuleId, RuleTemplate, TemplateId,
};

// =============================================================================
// Engine Request
// =============================================================================

/// A single call into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineRequest {
    /// Validate a pathway against every rule of its fandom.
    ValidatePathway {
        pathway: Pathway,
        /// Answers for `custom-rule` conditions, keyed by expression.
        #[serde(default, skip_serializing_if = "PrecomputedCustomResults::is_empty")]
        custom_results: PrecomputedCustomResults,
    },

    /// Evaluate one rule, active or not, against a pathway.
    TestRule {
        rule_id: RuleId,
        pathway: Pathway,
        #[serde(default, skip_serializing_if = "PrecomputedCustomResults::is_empty")]
        custom_results: PrecomputedCustomResults,
    },

    /// Check a template definition and store it.
    SaveTemplate { template: RuleTemplate },

    /// Generate and store a concrete rule from a template.
    InstantiateTemplate {
        template_id: TemplateId,
        fandom_id: FandomId,
        /// Id for the generated rule; a fresh one is generated when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rule_id: Option<RuleId>,
        #[serde(default)]
        parameters: ParameterMap,
    },
}

impl EngineRequest {
    /// Parse a request document.
    pub fn from_json(input: &str) -> Result<Self, RequestError> {
        if input.trim().is_empty() {
            return Err(RequestError::Empty);
        }
        serde_json::from_str(input).map_err(|e| RequestError::Malformed(e.to_string()))
    }

    /// The wire tag of this request, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidatePathway { .. } => "validatePathway",
            Self::TestRule { .. } => "testRule",
            Self::SaveTemplate { .. } => "saveTemplate",
            Self::InstantiateTemplate { .. } => "instantiateTemplate",
        }
    }
}

// =============================================================================
// Request Error
// =============================================================================

/// A request that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Request body is empty")]
    Empty,
    #[error("Malformed request: {0}")]
    Malformed(String),
}
