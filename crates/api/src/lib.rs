//! HTTP API layer for pollbox.
//!
//! - **Endpoints**: poll CRUD, voting and results under `/polls`
//! - **State**: the shared [`AppState`] handed to every handler
//! - **Responses**: the `{"data": ...}` envelope
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod response;
pub mod state;

pub use endpoints::router;
pub use state::AppState;
