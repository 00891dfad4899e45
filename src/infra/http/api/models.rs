use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReportTaskCreated {
    pub task_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReportTaskStatus {
    pub task_id: String,
    pub task_status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub detail: &'static str,
    pub menus: usize,
    pub submenus: usize,
    pub dishes: usize,
}
