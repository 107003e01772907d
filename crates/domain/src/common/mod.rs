//! Common utility functions shared across the domain modules.
//!
//! Pure functions only - no side effects, no I/O.

pub mod json;

pub use json::{json_equal, json_type_name, scalar_text};
