//! Repository port traits for rule and template storage.

use async_trait::async_trait;
use pathwise_domain::{FandomId, Rule, RuleId, RuleTemplate, TemplateId};

use super::error::RepoError;

// =============================================================================
// Rule Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepo: Send + Sync {
    async fn get(&self, id: &RuleId) -> Result<Option<Rule>, RepoError>;
    /// Every rule of the fandom, active or not, in authoring order.
    async fn list_for_fandom(&self, fandom_id: &FandomId) -> Result<Vec<Rule>, RepoError>;
    /// Insert, or replace the rule with the same id.
    async fn save(&self, rule: &Rule) -> Result<(), RepoError>;
}

// =============================================================================
// Template Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepo: Send + Sync {
    async fn get(&self, id: &TemplateId) -> Result<Option<RuleTemplate>, RepoError>;
    async fn save(&self, template: &RuleTemplate) -> Result<(), RepoError>;
    /// Bump the usage counter, returning the new count.
    async fn record_usage(&self, id: &TemplateId) -> Result<u64, RepoError>;
}
