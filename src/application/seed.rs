//! Loading a fixture of menus, submenus and dishes through the catalog services.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::application::catalog::{CatalogError, DishService, MenuService, SubmenuService};
use crate::domain::entities::{NewDish, NewMenu, NewSubmenu, SubmenuPath};

const BUILTIN_FIXTURE: &str = include_str!("../../fixtures/menus.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedFixture {
    pub menus: Vec<SeedMenu>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedMenu {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub submenus: Vec<SeedSubmenu>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSubmenu {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub dishes: Vec<NewDish>,
}

impl SeedFixture {
    /// The sample catalog shipped with the binary.
    pub fn builtin() -> Result<Self, SeedError> {
        Ok(serde_json::from_str(BUILTIN_FIXTURE)?)
    }

    pub async fn from_file(path: &Path) -> Result<Self, SeedError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub menus: usize,
    pub submenus: usize,
    pub dishes: usize,
}

#[derive(Clone)]
pub struct CatalogSeeder {
    menus: MenuService,
    submenus: SubmenuService,
    dishes: DishService,
}

impl CatalogSeeder {
    pub fn new(menus: MenuService, submenus: SubmenuService, dishes: DishService) -> Self {
        Self {
            menus,
            submenus,
            dishes,
        }
    }

    /// Create every entity in the fixture. Existing rows are left alone.
    pub async fn apply(&self, fixture: SeedFixture) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        for menu in fixture.menus {
            let created = self
                .menus
                .create(
                    (),
                    NewMenu {
                        title: menu.title,
                        description: menu.description,
                    },
                )
                .await?;
            summary.menus += 1;

            for submenu in menu.submenus {
                let created_submenu = self
                    .submenus
                    .create(
                        created.id,
                        NewSubmenu {
                            title: submenu.title,
                            description: submenu.description,
                        },
                    )
                    .await?;
                summary.submenus += 1;

                let path = SubmenuPath::new(created.id, created_submenu.id);
                for dish in submenu.dishes {
                    self.dishes.create(path, dish).await?;
                    summary.dishes += 1;
                }
            }
        }

        info!(
            target = "menuhub::seed",
            menus = summary.menus,
            submenus = summary.submenus,
            dishes = summary.dishes,
            "catalog seeded"
        );
        Ok(summary)
    }
}
