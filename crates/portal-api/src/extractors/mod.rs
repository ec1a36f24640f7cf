//! Custom Axum extractors.

pub mod auth;
pub mod body;
pub mod path;

pub use auth::CurrentUser;
pub use body::json_body;
