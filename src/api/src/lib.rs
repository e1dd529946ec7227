//! HTTP handlers, bearer-token auth, and wire DTOs for the controller's
//! four-endpoint request surface.

pub mod auth;
pub mod dto;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
