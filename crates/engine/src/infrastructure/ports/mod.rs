//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Rule and template storage (could swap JSON files -> a database)
//! - Clock (for testing)

mod error;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{RuleRepo, TemplateRepo};

#[cfg(test)]
pub use repos::{MockRuleRepo, MockTemplateRepo};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
