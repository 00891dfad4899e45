use async_trait::async_trait;

use crate::{
    application::repos::{CatalogExportRepo, RepoError},
    domain::entities::{
        DishId, DishSummary, JoinedRow, MenuId, MenuSummary, SubmenuId, SubmenuSummary,
    },
};

use super::{PostgresRepositories, map_sqlx_error, util::parse_price};

#[derive(sqlx::FromRow)]
struct JoinedCatalogRow {
    menu_id: i64,
    menu_title: String,
    menu_description: String,
    submenu_id: Option<i64>,
    submenu_title: Option<String>,
    submenu_description: Option<String>,
    dish_id: Option<i64>,
    dish_title: Option<String>,
    dish_description: Option<String>,
    dish_price: Option<String>,
}

impl TryFrom<JoinedCatalogRow> for JoinedRow {
    type Error = RepoError;

    fn try_from(row: JoinedCatalogRow) -> Result<Self, Self::Error> {
        let submenu = match (row.submenu_id, row.submenu_title, row.submenu_description) {
            (Some(id), Some(title), Some(description)) => Some(SubmenuSummary {
                id: SubmenuId(id),
                title,
                description,
            }),
            _ => None,
        };

        let dish = match (row.dish_id, row.dish_title, row.dish_description, row.dish_price) {
            (Some(id), Some(title), Some(description), Some(price)) => Some(DishSummary {
                id: DishId(id),
                title,
                description,
                price: parse_price(&price)?,
            }),
            _ => None,
        };

        Ok(Self {
            menu: MenuSummary {
                id: MenuId(row.menu_id),
                title: row.menu_title,
                description: row.menu_description,
            },
            submenu,
            dish,
        })
    }
}

#[async_trait]
impl CatalogExportRepo for PostgresRepositories {
    async fn joined_rows(&self) -> Result<Vec<JoinedRow>, RepoError> {
        let rows = sqlx::query_as::<_, JoinedCatalogRow>(
            r#"
            SELECT m.id AS menu_id,
                   m.title AS menu_title,
                   m.description AS menu_description,
                   s.id AS submenu_id,
                   s.title AS submenu_title,
                   s.description AS submenu_description,
                   d.id AS dish_id,
                   d.title AS dish_title,
                   d.description AS dish_description,
                   d.price::text AS dish_price
              FROM menus m
              LEFT JOIN submenus s ON s.menu_id = m.id
              LEFT JOIN dishes d ON d.submenu_id = s.id
             ORDER BY m.id, s.id NULLS FIRST, d.id NULLS FIRST
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JoinedRow::try_from).collect()
    }
}
