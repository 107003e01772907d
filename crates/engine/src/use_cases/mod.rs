//! Use cases - request orchestration over the repository ports.
//!
//! Each module contains use cases for one area. Use cases load what the
//! domain needs, enforce input limits, call into the domain and log.

pub mod templates;
pub mod validation;

pub use templates::{InstantiateRequest, InstantiationReport, TemplateOps, TemplateUseCaseError};
pub use validation::{RuleTestReport, ValidatePathway, ValidatePathwayError, ValidationReport};
