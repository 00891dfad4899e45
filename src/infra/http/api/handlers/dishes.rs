//! Dish handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::entities::{DishId, DishPatch, NewDish, SubmenuPath};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

use super::{json_body, parse_id, parse_parent_id};

fn dish_scope(menu_id: &str, submenu_id: &str) -> Result<SubmenuPath, ApiError> {
    Ok(SubmenuPath::new(
        parse_id(menu_id, "dish")?,
        parse_id(submenu_id, "dish")?,
    ))
}

pub async fn list_dishes(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = dish_scope(&menu_id, &submenu_id)?;
    let dishes = state.dishes.list(path).await?;
    Ok(Json(dishes))
}

pub async fn create_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(String, String)>,
    payload: Result<Json<NewDish>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let path = SubmenuPath::new(
        parse_parent_id(&menu_id, "menu")?,
        parse_parent_id(&submenu_id, "submenu")?,
    );
    let input = json_body(payload)?;
    let dish = state.dishes.create(path, input).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

pub async fn get_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = dish_scope(&menu_id, &submenu_id)?;
    let dish_id: DishId = parse_id(&dish_id, "dish")?;
    let dish = state.dishes.get(path, dish_id).await?;
    Ok(Json(dish))
}

pub async fn update_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(String, String, String)>,
    payload: Result<Json<DishPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let path = dish_scope(&menu_id, &submenu_id)?;
    let dish_id: DishId = parse_id(&dish_id, "dish")?;
    let patch = json_body(payload)?;
    let dish = state.dishes.update(path, dish_id, patch).await?;
    Ok(Json(dish))
}

pub async fn delete_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = dish_scope(&menu_id, &submenu_id)?;
    let dish_id: DishId = parse_id(&dish_id, "dish")?;
    let dish = state.dishes.delete(path, dish_id).await?;
    Ok(Json(dish))
}
