//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Checks its own definition before it can be persisted

pub mod rule;
pub mod rule_template;

pub use rule::{Rule, RuleDefinitionError};
pub use rule_template::{RuleTemplate, TemplateDefinitionError};
