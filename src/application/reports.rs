//! Submission and polling of catalog report jobs.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::jobs::{DataReportJobPayload, enqueue_data_report_job};
use crate::application::repos::{CatalogExportRepo, JobsRepo, RepoError};
use crate::domain::types::{JobState, JobType};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report task `{0}` not found")]
    NotFound(String),
    #[error("report task `{task_id}` carries an unreadable payload: {source}")]
    Payload {
        task_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Outcome of polling a report task.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPoll {
    /// Not finished yet, or finished without producing a file.
    Status { task_id: String, state: JobState },
    Ready {
        task_id: String,
        path: PathBuf,
        file_name: String,
    },
}

#[derive(Clone)]
pub struct DataReportService {
    export: Arc<dyn CatalogExportRepo>,
    jobs: Arc<dyn JobsRepo>,
    directory: PathBuf,
}

impl DataReportService {
    pub fn new(
        export: Arc<dyn CatalogExportRepo>,
        jobs: Arc<dyn JobsRepo>,
        directory: PathBuf,
    ) -> Self {
        Self {
            export,
            jobs,
            directory,
        }
    }

    /// Snapshot the whole catalog and queue it for rendering. Returns the task id.
    pub async fn submit(&self) -> Result<String, ReportError> {
        let rows = self.export.joined_rows().await?;
        let row_count = rows.len();
        let task_id = enqueue_data_report_job(self.jobs.as_ref(), rows).await?;
        info!(
            target = "menuhub::reports",
            task_id = %task_id,
            rows = row_count,
            "data report queued"
        );
        Ok(task_id)
    }

    pub async fn poll(&self, task_id: &str) -> Result<ReportPoll, ReportError> {
        let job = self
            .jobs
            .find_job(task_id)
            .await?
            .filter(|job| job.job_type == JobType::DataReport)
            .ok_or_else(|| ReportError::NotFound(task_id.to_string()))?;

        if job.state != JobState::Done {
            return Ok(ReportPoll::Status {
                task_id: job.id,
                state: job.state,
            });
        }

        let payload: DataReportJobPayload =
            serde_json::from_value(job.payload).map_err(|source| ReportError::Payload {
                task_id: job.id.clone(),
                source,
            })?;
        let file_name = payload.file_name();
        Ok(ReportPoll::Ready {
            task_id: job.id,
            path: self.directory.join(&file_name),
            file_name,
        })
    }
}
