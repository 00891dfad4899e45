use async_trait::async_trait;
use sqlx::PgExecutor;

use crate::{
    application::{
        catalog::Submenus,
        repos::{CatalogRepo, RepoError},
    },
    domain::entities::{MenuId, NewSubmenu, SubmenuId, SubmenuPatch, SubmenuRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

const SELECT_SUBMENUS_WITH_COUNTS: &str = r#"
    SELECT s.id,
           s.title,
           s.description,
           COUNT(d.id) AS dishes_count
      FROM submenus s
      LEFT JOIN dishes d ON d.submenu_id = s.id
     WHERE s.menu_id = $1
"#;

#[derive(sqlx::FromRow)]
struct SubmenuRow {
    id: i64,
    title: String,
    description: String,
    dishes_count: i64,
}

impl From<SubmenuRow> for SubmenuRecord {
    fn from(row: SubmenuRow) -> Self {
        Self {
            id: SubmenuId(row.id),
            title: row.title,
            description: row.description,
            dishes_count: Some(row.dishes_count),
        }
    }
}

#[derive(sqlx::FromRow)]
struct InsertedSubmenuRow {
    id: i64,
    title: String,
    description: String,
}

async fn find_submenu<'e, E>(
    executor: E,
    menu: MenuId,
    id: SubmenuId,
) -> Result<Option<SubmenuRecord>, RepoError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{SELECT_SUBMENUS_WITH_COUNTS} AND s.id = $2 GROUP BY s.id");
    let row = sqlx::query_as::<_, SubmenuRow>(&sql)
        .bind(menu.get())
        .bind(id.get())
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;
    Ok(row.map(SubmenuRecord::from))
}

#[async_trait]
impl CatalogRepo<Submenus> for PostgresRepositories {
    async fn list(&self, menu: MenuId) -> Result<Vec<SubmenuRecord>, RepoError> {
        let sql = format!("{SELECT_SUBMENUS_WITH_COUNTS} GROUP BY s.id ORDER BY s.id");
        let rows = sqlx::query_as::<_, SubmenuRow>(&sql)
            .bind(menu.get())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(SubmenuRecord::from).collect())
    }

    async fn find(
        &self,
        menu: MenuId,
        id: SubmenuId,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        find_submenu(self.pool(), menu, id).await
    }

    async fn create(
        &self,
        menu: MenuId,
        input: NewSubmenu,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        // Inserts nothing when the menu is missing.
        let row = sqlx::query_as::<_, InsertedSubmenuRow>(
            r#"
            INSERT INTO submenus (menu_id, title, description)
            SELECT m.id, $2, $3
              FROM menus m
             WHERE m.id = $1
            RETURNING id, title, description
            "#,
        )
        .bind(menu.get())
        .bind(input.title)
        .bind(input.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| SubmenuRecord {
            id: SubmenuId(row.id),
            title: row.title,
            description: row.description,
            dishes_count: None,
        }))
    }

    async fn update(
        &self,
        menu: MenuId,
        id: SubmenuId,
        patch: SubmenuPatch,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let Some(mut record) = find_submenu(&mut *tx, menu, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut record);

        let result = sqlx::query(
            "UPDATE submenus SET title = $3, description = $4 WHERE id = $2 AND menu_id = $1",
        )
        .bind(menu.get())
        .bind(id.get())
        .bind(&record.title)
        .bind(&record.description)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(record))
    }

    async fn delete(
        &self,
        menu: MenuId,
        id: SubmenuId,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let Some(record) = find_submenu(&mut *tx, menu, id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM submenus WHERE id = $2 AND menu_id = $1")
            .bind(menu.get())
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(record))
    }
}
