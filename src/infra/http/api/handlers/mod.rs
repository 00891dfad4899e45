//! API handlers organized by resource type.
//!
//! Path and body decoding helpers shared by the resource modules live here.

mod dishes;
mod menus;
mod reports;
mod submenus;

pub use dishes::*;
pub use menus::*;
pub use reports::*;
pub use submenus::*;

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use super::error::ApiError;

/// Parse a path segment as an id. A malformed id cannot name an existing entity.
fn parse_id<T: FromStr>(raw: &str, entity: &'static str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(entity))
}

/// Parse the parent id of a create route. A malformed parent is rejected like a missing one.
fn parse_parent_id<T: FromStr>(raw: &str, entity: &'static str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("malformed {entity} id `{raw}`")))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
