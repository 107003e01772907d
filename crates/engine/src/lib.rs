//! Pathwise Engine library.
//!
//! Everything around the pure domain validator: storage, limits, logging and
//! the request/response surface.
//!
//! ## Structure
//!
//! - `use_cases/` - Request orchestration over the repository ports
//! - `infrastructure/` - Ports, the JSON file store, clock and configuration
//! - `api/` - Request envelope dispatch
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
