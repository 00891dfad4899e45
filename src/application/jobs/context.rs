use std::{path::PathBuf, sync::Arc};

use apalis::prelude::Error as ApalisError;

/// Shared context passed to the report worker.
#[derive(Clone)]
pub struct ReportWorkerContext {
    /// Directory report files are written to; created on first use.
    pub directory: Arc<PathBuf>,
}

impl ReportWorkerContext {
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convert any error into an [`ApalisError::Failed`].
pub fn job_failed<E>(err: E) -> ApalisError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let boxed: BoxError = Box::new(err);
    ApalisError::Failed(Arc::new(boxed))
}
