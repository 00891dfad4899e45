use std::convert::TryFrom;

use async_trait::async_trait;
use sqlx::PgExecutor;

use crate::{
    application::{
        catalog::Dishes,
        repos::{CatalogRepo, RepoError},
    },
    domain::entities::{DishId, DishPatch, DishRecord, NewDish, SubmenuPath},
};

use super::{PostgresRepositories, map_sqlx_error, util::parse_price};

// Dishes are reachable only through a submenu that belongs to the given menu.
const SELECT_DISHES: &str = r#"
    SELECT d.id,
           d.title,
           d.description,
           d.price::text AS price
      FROM dishes d
      JOIN submenus s ON s.id = d.submenu_id
     WHERE s.menu_id = $1
       AND s.id = $2
"#;

#[derive(sqlx::FromRow)]
struct DishRow {
    id: i64,
    title: String,
    description: String,
    price: String,
}

impl TryFrom<DishRow> for DishRecord {
    type Error = RepoError;

    fn try_from(row: DishRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DishId(row.id),
            title: row.title,
            description: row.description,
            price: parse_price(&row.price)?,
        })
    }
}

async fn find_dish<'e, E>(
    executor: E,
    path: SubmenuPath,
    id: DishId,
) -> Result<Option<DishRecord>, RepoError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{SELECT_DISHES} AND d.id = $3");
    let row = sqlx::query_as::<_, DishRow>(&sql)
        .bind(path.menu_id.get())
        .bind(path.submenu_id.get())
        .bind(id.get())
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;
    row.map(DishRecord::try_from).transpose()
}

#[async_trait]
impl CatalogRepo<Dishes> for PostgresRepositories {
    async fn list(&self, path: SubmenuPath) -> Result<Vec<DishRecord>, RepoError> {
        let sql = format!("{SELECT_DISHES} ORDER BY d.id");
        let rows = sqlx::query_as::<_, DishRow>(&sql)
            .bind(path.menu_id.get())
            .bind(path.submenu_id.get())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        rows.into_iter().map(DishRecord::try_from).collect()
    }

    async fn find(&self, path: SubmenuPath, id: DishId) -> Result<Option<DishRecord>, RepoError> {
        find_dish(self.pool(), path, id).await
    }

    async fn create(
        &self,
        path: SubmenuPath,
        input: NewDish,
    ) -> Result<Option<DishRecord>, RepoError> {
        let row = sqlx::query_as::<_, DishRow>(
            r#"
            INSERT INTO dishes (submenu_id, title, description, price)
            SELECT s.id, $3, $4, $5::numeric
              FROM submenus s
             WHERE s.id = $2
               AND s.menu_id = $1
            RETURNING id, title, description, price::text AS price
            "#,
        )
        .bind(path.menu_id.get())
        .bind(path.submenu_id.get())
        .bind(input.title)
        .bind(input.description)
        .bind(input.price.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DishRecord::try_from).transpose()
    }

    async fn update(
        &self,
        path: SubmenuPath,
        id: DishId,
        patch: DishPatch,
    ) -> Result<Option<DishRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let Some(mut record) = find_dish(&mut *tx, path, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut record);

        let result = sqlx::query(
            "UPDATE dishes SET title = $2, description = $3, price = $4::numeric WHERE id = $1",
        )
        .bind(id.get())
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.price.to_string())
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
        path: SubmenuPath,
        id: DishId,
    ) -> Result<Option<DishRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let Some(record) = find_dish(&mut *tx, path, id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
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
