mod context;
mod queue;
mod report;

pub use context::{ReportWorkerContext, job_failed};
pub use queue::enqueue_job;
pub use report::{
    DataReportJobPayload, ReportDish, ReportDocument, ReportMenu, ReportSubmenu,
    ReportWriteError, enqueue_data_report_job, process_data_report_job, report_file_name,
};
