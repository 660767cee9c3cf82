//! HTTP boundary for the chat handler.
//!
//! A single fallback handler dispatches on the request path suffix, so the
//! service answers the same whether it is mounted at `/` or behind a stage
//! prefix such as `/prod`.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::{build_router, AppState};
pub use server::{start, ServerHandle};
