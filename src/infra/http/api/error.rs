use std::error::Error as StdError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::catalog::CatalogError;
use crate::application::error::ErrorReport;
use crate::application::reports::ReportError;
use crate::application::repos::RepoError;
use crate::application::seed::SeedError;

const SOURCE: &str = "infra::http::api";

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>, report: ErrorReport) -> Self {
        Self {
            status,
            detail: detail.into(),
            report,
        }
    }

    pub fn not_found(entity: &str) -> Self {
        let detail = format!("{entity} not found");
        let report = ErrorReport::from_message(SOURCE, StatusCode::NOT_FOUND, detail.clone());
        Self::new(StatusCode::NOT_FOUND, detail, report)
    }

    pub fn bad_request(hint: impl Into<String>) -> Self {
        let report = ErrorReport::from_message(SOURCE, StatusCode::BAD_REQUEST, hint);
        Self::new(StatusCode::BAD_REQUEST, "Bad request", report)
    }

    pub fn internal(error: &dyn StdError) -> Self {
        let report = ErrorReport::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, error);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            report,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            detail: self.detail,
        };
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::InvalidInput { message } => ApiError::bad_request(message),
            other => ApiError::internal(&other),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { entity } => ApiError::not_found(entity),
            CatalogError::ParentMissing { .. } => ApiError::bad_request(err.to_string()),
            CatalogError::Repo(repo) => ApiError::from(repo),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NotFound(_) => ApiError::not_found("report task"),
            ReportError::Repo(repo) => ApiError::from(repo),
            other @ ReportError::Payload { .. } => ApiError::internal(&other),
        }
    }
}

impl From<SeedError> for ApiError {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::Catalog(catalog) => ApiError::from(catalog),
            other => ApiError::internal(&other),
        }
    }
}
