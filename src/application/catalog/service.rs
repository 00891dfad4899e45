use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{CatalogRepo, RepoError};
use crate::cache::CacheClient;

use super::kind::{Dishes, EntityKind, Menus, Submenus};

const SOURCE: &str = "menuhub::catalog";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("cannot create {entity}: parent not found")]
    ParentMissing { entity: &'static str },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Read-through cached access to one level of the catalog.
///
/// Reads consult the cache first and populate it on a miss. Writes go to the
/// repository and, once committed, drop every affected cache key in a single
/// batch. A failed write leaves the cache untouched.
pub struct CatalogService<K: EntityKind> {
    repo: Arc<dyn CatalogRepo<K>>,
    cache: CacheClient,
    _kind: PhantomData<fn() -> K>,
}

pub type MenuService = CatalogService<Menus>;
pub type SubmenuService = CatalogService<Submenus>;
pub type DishService = CatalogService<Dishes>;

impl<K: EntityKind> Clone for CatalogService<K> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            cache: self.cache.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: EntityKind> CatalogService<K> {
    pub fn new(repo: Arc<dyn CatalogRepo<K>>, cache: CacheClient) -> Self {
        Self {
            repo,
            cache,
            _kind: PhantomData,
        }
    }

    pub async fn list(&self, scope: K::Scope) -> Result<Vec<K::Record>, CatalogError> {
        let key = K::list_key(scope);
        if let Some(records) = self.cache.get::<Vec<K::Record>>(&key).await {
            return Ok(records);
        }

        let records = self.repo.list(scope).await?;
        self.cache.set(&key, &records).await;
        Ok(records)
    }

    pub async fn get(&self, scope: K::Scope, id: K::Id) -> Result<K::Record, CatalogError> {
        let key = K::detail_key(scope, id);
        if let Some(record) = self.cache.get::<K::Record>(&key).await {
            return Ok(record);
        }

        let Some(record) = self.repo.find(scope, id).await? else {
            debug!(target: SOURCE, entity = K::NAME, id = %id, scope = ?scope, "lookup missed");
            return Err(Self::not_found());
        };
        self.cache.set(&key, &record).await;
        Ok(record)
    }

    pub async fn create(
        &self,
        scope: K::Scope,
        input: K::Create,
    ) -> Result<K::Record, CatalogError> {
        let record = self
            .repo
            .create(scope, input)
            .await?
            .ok_or(CatalogError::ParentMissing { entity: K::NAME })?;

        let id = K::id_of(&record);
        self.invalidate(scope, id).await;
        info!(target: SOURCE, entity = K::NAME, id = %id, "created");
        Ok(record)
    }

    pub async fn update(
        &self,
        scope: K::Scope,
        id: K::Id,
        patch: K::Patch,
    ) -> Result<K::Record, CatalogError> {
        let record = self
            .repo
            .update(scope, id, patch)
            .await?
            .ok_or_else(Self::not_found)?;

        self.invalidate(scope, id).await;
        info!(target: SOURCE, entity = K::NAME, id = %id, "updated");
        Ok(record)
    }

    pub async fn delete(&self, scope: K::Scope, id: K::Id) -> Result<K::Record, CatalogError> {
        let record = self
            .repo
            .delete(scope, id)
            .await?
            .ok_or_else(Self::not_found)?;

        self.invalidate(scope, id).await;
        info!(target: SOURCE, entity = K::NAME, id = %id, "deleted");
        Ok(record)
    }

    async fn invalidate(&self, scope: K::Scope, id: K::Id) {
        let keys = K::mutation(scope, id).invalidated_keys();
        self.cache.delete_many(&keys).await;
    }

    fn not_found() -> CatalogError {
        CatalogError::NotFound { entity: K::NAME }
    }
}
