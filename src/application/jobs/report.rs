use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use apalis::prelude::{Data, Error as ApalisError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    application::repos::{JobsRepo, RepoError},
    domain::{
        entities::{DishId, JoinedRow, MenuId, SubmenuId},
        price::Price,
        types::JobType,
    },
};

use super::{
    context::{ReportWorkerContext, job_failed},
    queue::enqueue_job,
};

const REPORT_MAX_ATTEMPTS: i32 = 3;
const REPORT_PRIORITY: i32 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataReportJobPayload {
    pub report_id: Uuid,
    pub rows: Vec<JoinedRow>,
}

impl DataReportJobPayload {
    pub fn file_name(&self) -> String {
        report_file_name(self.report_id)
    }
}

pub fn report_file_name(report_id: Uuid) -> String {
    format!("report-{report_id}.toml")
}

pub async fn enqueue_data_report_job<J: JobsRepo + ?Sized>(
    repo: &J,
    rows: Vec<JoinedRow>,
) -> Result<String, RepoError> {
    let payload = DataReportJobPayload {
        report_id: Uuid::new_v4(),
        rows,
    };
    enqueue_job(
        repo,
        JobType::DataReport,
        &payload,
        None,
        REPORT_MAX_ATTEMPTS,
        REPORT_PRIORITY,
    )
    .await
}

pub async fn process_data_report_job(
    payload: DataReportJobPayload,
    context: Data<ReportWorkerContext>,
) -> Result<(), ApalisError> {
    let document = ReportDocument::from_rows(&payload.rows);
    let path = write_report(&context.directory, &payload.file_name(), &document)
        .await
        .map_err(job_failed)?;

    info!(
        target = "menuhub::jobs::report",
        report_id = %payload.report_id,
        menus = document.menus.len(),
        path = %path.display(),
        "data report written"
    );
    Ok(())
}

#[derive(Debug, Error)]
pub enum ReportWriteError {
    #[error("failed to encode report: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

async fn write_report(
    directory: &Path,
    file_name: &str,
    document: &ReportDocument,
) -> Result<PathBuf, ReportWriteError> {
    let body = toml::to_string(document)?;
    tokio::fs::create_dir_all(directory).await?;
    let path = directory.join(file_name);
    tokio::fs::write(&path, body).await?;
    Ok(path)
}

/// The catalog tree as written to the report file. Each level is numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub menus: Vec<ReportMenu>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMenu {
    pub number: usize,
    pub title: String,
    pub description: String,
    pub submenus: Vec<ReportSubmenu>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSubmenu {
    pub number: usize,
    pub title: String,
    pub description: String,
    pub dishes: Vec<ReportDish>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDish {
    pub number: usize,
    pub title: String,
    pub description: String,
    pub price: Price,
}

impl ReportDocument {
    /// Fold flat join rows into the tree, keeping first-seen order.
    pub fn from_rows(rows: &[JoinedRow]) -> Self {
        let mut menus: Vec<ReportMenu> = Vec::new();
        let mut menu_slots: HashMap<MenuId, usize> = HashMap::new();
        let mut submenu_slots: HashMap<SubmenuId, (usize, usize)> = HashMap::new();
        let mut seen_dishes: HashSet<DishId> = HashSet::new();

        for row in rows {
            let menu_slot = *menu_slots.entry(row.menu.id).or_insert_with(|| {
                let number = menus.len() + 1;
                menus.push(ReportMenu {
                    number,
                    title: row.menu.title.clone(),
                    description: row.menu.description.clone(),
                    submenus: Vec::new(),
                });
                menus.len() - 1
            });

            let Some(submenu) = row.submenu.as_ref() else {
                continue;
            };
            let (menu_slot, submenu_slot) =
                *submenu_slots.entry(submenu.id).or_insert_with(|| {
                    let submenus = &mut menus[menu_slot].submenus;
                    let number = submenus.len() + 1;
                    submenus.push(ReportSubmenu {
                        number,
                        title: submenu.title.clone(),
                        description: submenu.description.clone(),
                        dishes: Vec::new(),
                    });
                    (menu_slot, submenus.len() - 1)
                });

            let Some(dish) = row.dish.as_ref() else {
                continue;
            };
            if !seen_dishes.insert(dish.id) {
                continue;
            }
            let dishes = &mut menus[menu_slot].submenus[submenu_slot].dishes;
            let number = dishes.len() + 1;
            dishes.push(ReportDish {
                number,
                title: dish.title.clone(),
                description: dish.description.clone(),
                price: dish.price,
            });
        }

        Self { menus }
    }
}
