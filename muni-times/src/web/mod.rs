//! Web layer: serves the latest schedule to displays.
//!
//! Provides an HTML arrival board, a JSON schedule endpoint and control
//! endpoints for the polling monitor.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
