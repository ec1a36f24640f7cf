//! Typed path parameter helpers.
//!
//! Path segments are taken as strings and parsed here so that bad values
//! produce the portal's JSON error body rather than axum's plain text.

use std::str::FromStr;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{Direction, Page};

/// Parses a page tag from a path segment.
pub fn parse_page(s: &str) -> AppResult<Page> {
    s.parse()
}

/// Parses a movement direction from a path segment.
pub fn parse_direction(s: &str) -> AppResult<Direction> {
    s.parse()
}

/// Parses a numeric id. A segment that is not a number cannot name any
/// row, so it reads as not found.
pub fn parse_id<T: FromStr>(s: &str, what: &str) -> AppResult<T> {
    s.parse()
        .map_err(|_| AppError::not_found(format!("{what} {s} not found")))
}
