//! Web layer for the seat matrix engine.
//!
//! A JSON API over the core: build a matrix for a train and date, compose
//! routes against it, and check point-to-point seat availability.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
