//! Report task handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::application::reports::ReportPoll;
use crate::application::seed::SeedFixture;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{ReportTaskCreated, ReportTaskStatus, SeedResponse};
use crate::infra::http::api::state::ApiState;

const REPORT_CONTENT_TYPE: &str = "application/toml; charset=utf-8";

pub async fn submit_report(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let task_id = state.reports.submit().await?;
    Ok((StatusCode::CREATED, Json(ReportTaskCreated { task_id })))
}

pub async fn report_status(
    State(state): State<ApiState>,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    match state.reports.poll(&task_id).await? {
        ReportPoll::Status {
            task_id,
            state: job_state,
        } => Ok(Json(ReportTaskStatus {
            task_id,
            task_status: job_state.as_str(),
        })
        .into_response()),
        ReportPoll::Ready {
            path, file_name, ..
        } => {
            let body = tokio::fs::read(&path)
                .await
                .map_err(|err| ApiError::internal(&err))?;
            let disposition = format!("attachment; filename=\"{file_name}\"");
            Ok((
                [
                    (CONTENT_TYPE, REPORT_CONTENT_TYPE.to_string()),
                    (CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
    }
}

pub async fn add_test_data(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let fixture = SeedFixture::builtin()?;
    let summary = state.seeder.apply(fixture).await?;
    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            detail: "Test data added successfully",
            menus: summary.menus,
            submenus: summary.submenus,
            dishes: summary.dishes,
        }),
    ))
}
