//! Web layer for the bus arrival board.
//!
//! Serves the stop code form and board as HTML, plus JSON endpoints for
//! boards and train alerts.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
