//! Pathway validation use cases.
//!
//! Loads a fandom's rules, enforces the configured input limits and runs the
//! domain validator. Limits live here because the domain validator trusts
//! its inputs to be bounded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use pathwise_domain::{
    FandomId, Pathway, PathwayValidator, PrecomputedCustomResults, RuleEvaluation, RuleId,
    ValidationResult,
};

use crate::infrastructure::config::EngineLimits;
use crate::infrastructure::ports::{ClockPort, RepoError, RuleRepo};

// =============================================================================
// Result Types
// =============================================================================

/// A validation pass over a fandom's rule set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub fandom_id: FandomId,
    pub evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// A single rule tried against a pathway.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTestReport {
    pub rule_id: RuleId,
    pub is_active: bool,
    pub evaluated_at: DateTime<Utc>,
    pub evaluation: RuleEvaluation,
    pub result: ValidationResult,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidatePathwayError {
    #[error("Pathway has {count} tags and plot blocks, the limit is {limit}")]
    TooManyPathwayItems { count: usize, limit: usize },
    #[error("Fandom {fandom_id} has {count} active rules, the limit is {limit}")]
    TooManyRules {
        fandom_id: FandomId,
        count: usize,
        limit: usize,
    },
    #[error("Rule not found: {0}")]
    RuleNotFound(RuleId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

// =============================================================================
// Use Case
// =============================================================================

pub struct ValidatePathway {
    rules: Arc<dyn RuleRepo>,
    clock: Arc<dyn ClockPort>,
    limits: EngineLimits,
}

impl ValidatePathway {
    pub fn new(rules: Arc<dyn RuleRepo>, clock: Arc<dyn ClockPort>, limits: EngineLimits) -> Self {
        Self {
            rules,
            clock,
            limits,
        }
    }

    /// Validate `pathway` against every active rule of its fandom.
    pub async fn execute(
        &self,
        pathway: &Pathway,
        custom_results: &PrecomputedCustomResults,
    ) -> Result<ValidationReport, ValidatePathwayError> {
        self.check_pathway_size(pathway)?;

        let fandom_id = &pathway.fandom_id;
        let rules = self.rules.list_for_fandom(fandom_id).await?;
        tracing::debug!(fandom_id = %fandom_id, rules = rules.len(), "Loaded fandom rules");

        let active = rules.iter().filter(|rule| rule.is_active()).count();
        if active > self.limits.max_rules {
            tracing::warn!(
                fandom_id = %fandom_id,
                active,
                limit = self.limits.max_rules,
                "Rule limit exceeded"
            );
            return Err(ValidatePathwayError::TooManyRules {
                fandom_id: fandom_id.clone(),
                count: active,
                limit: self.limits.max_rules,
            });
        }

        let result = PathwayValidator::new(custom_results).validate_pathway(pathway, &rules);
        log_diagnostics(&result);
        tracing::info!(
            fandom_id = %fandom_id,
            rules_evaluated = result.rules_evaluated,
            applied = result.applied_rules.len(),
            messages = result.message_count(),
            errors = result.errors.len(),
            elapsed_ms = result.execution_time.as_millis() as u64,
            is_valid = result.is_valid,
            "Pathway validated"
        );

        Ok(ValidationReport {
            fandom_id: fandom_id.clone(),
            evaluated_at: self.clock.now(),
            result,
        })
    }

    /// Evaluate one rule against `pathway`.
    ///
    /// The rule runs even when inactive, since the caller asked for it by id.
    pub async fn test_rule(
        &self,
        rule_id: &RuleId,
        pathway: &Pathway,
        custom_results: &PrecomputedCustomResults,
    ) -> Result<RuleTestReport, ValidatePathwayError> {
        self.check_pathway_size(pathway)?;

        let rule = self
            .rules
            .get(rule_id)
            .await?
            .ok_or_else(|| ValidatePathwayError::RuleNotFound(rule_id.clone()))?;
        tracing::debug!(rule_id = %rule_id, active = rule.is_active(), "Loaded rule for test");

        let (evaluation, result) =
            PathwayValidator::new(custom_results).validate_rule(pathway, &rule);
        log_diagnostics(&result);
        tracing::info!(
            rule_id = %rule_id,
            fired = evaluation.fired,
            summary = %evaluation.summary(),
            "Rule tested"
        );

        Ok(RuleTestReport {
            rule_id: rule_id.clone(),
            is_active: rule.is_active(),
            evaluated_at: self.clock.now(),
            evaluation,
            result,
        })
    }

    fn check_pathway_size(&self, pathway: &Pathway) -> Result<(), ValidatePathwayError> {
        let count = pathway.item_count();
        if count > self.limits.max_pathway_items {
            tracing::warn!(
                fandom_id = %pathway.fandom_id,
                count,
                limit = self.limits.max_pathway_items,
                "Pathway size limit exceeded"
            );
            return Err(ValidatePathwayError::TooManyPathwayItems {
                count,
                limit: self.limits.max_pathway_items,
            });
        }
        Ok(())
    }
}

fn log_diagnostics(result: &ValidationResult) {
    for diagnostic in &result.diagnostics {
        tracing::warn!(
            rule_id = %diagnostic.rule_id,
            message = %diagnostic.message,
            "Evaluation diagnostic"
        );
    }
}
