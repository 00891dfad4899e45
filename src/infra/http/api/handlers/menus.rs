//! Menu handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::entities::{MenuId, MenuPatch, NewMenu};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

use super::{json_body, parse_id};

pub async fn list_menus(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let menus = state.menus.list(()).await?;
    Ok(Json(menus))
}

pub async fn create_menu(
    State(state): State<ApiState>,
    payload: Result<Json<NewMenu>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = json_body(payload)?;
    let menu = state.menus.create((), input).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

pub async fn get_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let menu_id: MenuId = parse_id(&menu_id, "menu")?;
    let menu = state.menus.get((), menu_id).await?;
    Ok(Json(menu))
}

pub async fn update_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<String>,
    payload: Result<Json<MenuPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let menu_id: MenuId = parse_id(&menu_id, "menu")?;
    let patch = json_body(payload)?;
    let menu = state.menus.update((), menu_id, patch).await?;
    Ok(Json(menu))
}

pub async fn delete_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let menu_id: MenuId = parse_id(&menu_id, "menu")?;
    let menu = state.menus.delete((), menu_id).await?;
    Ok(Json(menu))
}
