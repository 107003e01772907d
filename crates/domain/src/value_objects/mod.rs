//! Value objects - Immutable objects defined by their attributes

mod logic;
mod names;
mod pathway;
mod severity;

pub use logic::LogicOperator;
pub use names::{RuleName, TemplateName};
pub use pathway::Pathway;
pub use severity::Severity;
