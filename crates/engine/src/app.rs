//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    config::EngineLimits,
    json_store::JsonFileStore,
    ports::{ClockPort, RuleRepo, TemplateRepo},
};
use crate::use_cases::{TemplateOps, ValidatePathway};

/// Main application state.
///
/// Holds the use cases, each built on the repository ports it needs.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub validation: ValidatePathway,
    pub templates: TemplateOps,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        rule_repo: Arc<dyn RuleRepo>,
        template_repo: Arc<dyn TemplateRepo>,
        clock: Arc<dyn ClockPort>,
        limits: EngineLimits,
    ) -> Self {
        let use_cases = UseCases {
            validation: ValidatePathway::new(rule_repo.clone(), clock.clone(), limits),
            templates: TemplateOps::new(template_repo, rule_repo, clock, limits),
        };

        Self { use_cases }
    }

    /// Wire both repository ports to one file store.
    pub fn with_store(store: Arc<JsonFileStore>, clock: Arc<dyn ClockPort>, limits: EngineLimits) -> Self {
        let rule_repo: Arc<dyn RuleRepo> = store.clone();
        let template_repo: Arc<dyn TemplateRepo> = store;
        Self::new(rule_repo, template_repo, clock, limits)
    }
}
