use async_trait::async_trait;
use sqlx::PgExecutor;

use crate::{
    application::{
        catalog::Menus,
        repos::{CatalogRepo, RepoError},
    },
    domain::entities::{MenuId, MenuPatch, MenuRecord, NewMenu},
};

use super::{PostgresRepositories, map_sqlx_error};

const SELECT_MENUS_WITH_COUNTS: &str = r#"
    SELECT m.id,
           m.title,
           m.description,
           COUNT(DISTINCT s.id) AS submenus_count,
           COUNT(d.id) AS dishes_count
      FROM menus m
      LEFT JOIN submenus s ON s.menu_id = m.id
      LEFT JOIN dishes d ON d.submenu_id = s.id
"#;

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: i64,
    title: String,
    description: String,
    submenus_count: i64,
    dishes_count: i64,
}

impl From<MenuRow> for MenuRecord {
    fn from(row: MenuRow) -> Self {
        Self {
            id: MenuId(row.id),
            title: row.title,
            description: row.description,
            submenus_count: Some(row.submenus_count),
            dishes_count: Some(row.dishes_count),
        }
    }
}

#[derive(sqlx::FromRow)]
struct InsertedMenuRow {
    id: i64,
    title: String,
    description: String,
}

async fn find_menu<'e, E>(executor: E, id: MenuId) -> Result<Option<MenuRecord>, RepoError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{SELECT_MENUS_WITH_COUNTS} WHERE m.id = $1 GROUP BY m.id");
    let row = sqlx::query_as::<_, MenuRow>(&sql)
        .bind(id.get())
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;
    Ok(row.map(MenuRecord::from))
}

#[async_trait]
impl CatalogRepo<Menus> for PostgresRepositories {
    async fn list(&self, _scope: ()) -> Result<Vec<MenuRecord>, RepoError> {
        let sql = format!("{SELECT_MENUS_WITH_COUNTS} GROUP BY m.id ORDER BY m.id");
        let rows = sqlx::query_as::<_, MenuRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(MenuRecord::from).collect())
    }

    async fn find(&self, _scope: (), id: MenuId) -> Result<Option<MenuRecord>, RepoError> {
        find_menu(self.pool(), id).await
    }

    async fn create(&self, _scope: (), input: NewMenu) -> Result<Option<MenuRecord>, RepoError> {
        let row = sqlx::query_as::<_, InsertedMenuRow>(
            r#"
            INSERT INTO menus (title, description)
            VALUES ($1, $2)
            RETURNING id, title, description
            "#,
        )
        .bind(input.title)
        .bind(input.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(Some(MenuRecord {
            id: MenuId(row.id),
            title: row.title,
            description: row.description,
            submenus_count: None,
            dishes_count: None,
        }))
    }

    async fn update(
        &self,
        _scope: (),
        id: MenuId,
        patch: MenuPatch,
    ) -> Result<Option<MenuRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let Some(mut record) = find_menu(&mut *tx, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut record);

        let result = sqlx::query("UPDATE menus SET title = $2, description = $3 WHERE id = $1")
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

    async fn delete(&self, _scope: (), id: MenuId) -> Result<Option<MenuRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let Some(record) = find_menu(&mut *tx, id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
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
