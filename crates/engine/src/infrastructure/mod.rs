//! Infrastructure implementations.
//!
//! Contains port trait implementations and configuration.

pub mod clock;
pub mod config;
pub mod json_store;
pub mod ports;
