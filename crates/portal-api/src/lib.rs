//! # portal-api
//!
//! HTTP surface of the home portal: the axum router, request handlers,
//! DTOs, the caller identity extractor, and the mapping from
//! [`portal_core::AppError`] to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
