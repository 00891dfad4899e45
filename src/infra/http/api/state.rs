use std::sync::Arc;

use crate::application::catalog::{DishService, MenuService, SubmenuService};
use crate::application::reports::DataReportService;
use crate::application::repos::HealthRepo;
use crate::application::seed::CatalogSeeder;

#[derive(Clone)]
pub struct ApiState {
    pub menus: MenuService,
    pub submenus: SubmenuService,
    pub dishes: DishService,
    pub reports: DataReportService,
    pub seeder: CatalogSeeder,
    pub db: Arc<dyn HealthRepo>,
}
