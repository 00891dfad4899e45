//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::catalog::EntityKind;
use crate::domain::entities::{JobRecord, JoinedRow};
use crate::domain::types::JobType;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Storage for one level of the catalog hierarchy.
///
/// Every lookup is scoped by the parent path, so an entity that exists under a
/// different parent reads as absent. Reads and updates return the derived
/// counters; `create` returns a record without them.
#[async_trait]
pub trait CatalogRepo<K: EntityKind>: Send + Sync {
    async fn list(&self, scope: K::Scope) -> Result<Vec<K::Record>, RepoError>;

    async fn find(&self, scope: K::Scope, id: K::Id) -> Result<Option<K::Record>, RepoError>;

    /// `Ok(None)` when the parent in `scope` does not exist.
    async fn create(
        &self,
        scope: K::Scope,
        input: K::Create,
    ) -> Result<Option<K::Record>, RepoError>;

    async fn update(
        &self,
        scope: K::Scope,
        id: K::Id,
        patch: K::Patch,
    ) -> Result<Option<K::Record>, RepoError>;

    /// Removes the entity and its descendants, returning its state just before removal.
    async fn delete(&self, scope: K::Scope, id: K::Id) -> Result<Option<K::Record>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CatalogExportRepo: Send + Sync {
    /// Every menu with its submenus and dishes, ordered by ids.
    async fn joined_rows(&self) -> Result<Vec<JoinedRow>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub job_type: JobType,
    pub payload: serde_json::Value,
    pub run_at: OffsetDateTime,
    pub max_attempts: i32,
    pub priority: i32,
}

#[async_trait]
pub trait JobsRepo: Send + Sync {
    async fn enqueue_job(&self, job: NewJobRecord) -> Result<String, RepoError>;

    async fn find_job(&self, id: &str) -> Result<Option<JobRecord>, RepoError>;
}
