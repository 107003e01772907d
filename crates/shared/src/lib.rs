//! Pathwise Shared - wire types for talking to the engine
//!
//! This crate contains the envelopes exchanged with the engine binary:
//! - Request envelopes (`EngineRequest`), one JSON document per call
//! - The `ResponseResult` / `ErrorCode` response envelope
//! - Conversion of domain taxonomy errors into wire errors
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, thiserror and the domain crate
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Domain vocabulary** - pathways, templates and parameter maps travel in their domain shape

pub mod requests;
pub mod responses;

pub use requests::{EngineRequest, RequestError};
pub use responses::{ErrorCode, ResponseResult};
