//! Recipes: a JSON CRUD service for recipe records.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so integration tests can build the router over any store.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;
pub mod templates;
pub mod validation;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
