//! Vitae API Library
//!
//! HTTP handlers, application state and setup for the profile service.

pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
