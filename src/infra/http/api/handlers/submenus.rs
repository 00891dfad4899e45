//! Submenu handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::entities::{MenuId, NewSubmenu, SubmenuId, SubmenuPatch};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

use super::{json_body, parse_id, parse_parent_id};

fn submenu_path(menu_id: &str, submenu_id: &str) -> Result<(MenuId, SubmenuId), ApiError> {
    Ok((
        parse_id(menu_id, "submenu")?,
        parse_id(submenu_id, "submenu")?,
    ))
}

pub async fn list_submenus(
    State(state): State<ApiState>,
    Path(menu_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let menu_id: MenuId = parse_id(&menu_id, "menu")?;
    let submenus = state.submenus.list(menu_id).await?;
    Ok(Json(submenus))
}

pub async fn create_submenu(
    State(state): State<ApiState>,
    Path(menu_id): Path<String>,
    payload: Result<Json<NewSubmenu>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let menu_id: MenuId = parse_parent_id(&menu_id, "menu")?;
    let input = json_body(payload)?;
    let submenu = state.submenus.create(menu_id, input).await?;
    Ok((StatusCode::CREATED, Json(submenu)))
}

pub async fn get_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (menu_id, submenu_id) = submenu_path(&menu_id, &submenu_id)?;
    let submenu = state.submenus.get(menu_id, submenu_id).await?;
    Ok(Json(submenu))
}

pub async fn update_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(String, String)>,
    payload: Result<Json<SubmenuPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let (menu_id, submenu_id) = submenu_path(&menu_id, &submenu_id)?;
    let patch = json_body(payload)?;
    let submenu = state.submenus.update(menu_id, submenu_id, patch).await?;
    Ok(Json(submenu))
}

pub async fn delete_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (menu_id, submenu_id) = submenu_path(&menu_id, &submenu_id)?;
    let submenu = state.submenus.delete(menu_id, submenu_id).await?;
    Ok(Json(submenu))
}
