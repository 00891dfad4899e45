//! In-memory repositories shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use menuhub::application::catalog::{
    DishService, Dishes, MenuService, Menus, SubmenuService, Submenus,
};
use menuhub::application::reports::DataReportService;
use menuhub::application::repos::{
    CatalogExportRepo, CatalogRepo, HealthRepo, JobsRepo, NewJobRecord, RepoError,
};
use menuhub::application::seed::CatalogSeeder;
use menuhub::cache::{CacheClient, CacheConfig, CacheError, CacheStore, MemoryCacheStore};
use menuhub::domain::entities::{
    DishId, DishPatch, DishRecord, DishSummary, JobRecord, JoinedRow, MenuId, MenuPatch,
    MenuRecord, MenuSummary, NewDish, NewMenu, NewSubmenu, SubmenuId, SubmenuPatch, SubmenuPath,
    SubmenuRecord, SubmenuSummary,
};
use menuhub::domain::price::Price;
use menuhub::domain::types::JobState;
use menuhub::infra::http::ApiState;

#[derive(Clone)]
struct MenuRow {
    title: String,
    description: String,
}

#[derive(Clone)]
struct SubmenuRow {
    menu_id: i64,
    title: String,
    description: String,
}

#[derive(Clone)]
struct DishRow {
    submenu_id: i64,
    title: String,
    description: String,
    price: Price,
}

#[derive(Default)]
struct CatalogState {
    next_menu: i64,
    next_submenu: i64,
    next_dish: i64,
    next_job: i64,
    menus: BTreeMap<i64, MenuRow>,
    submenus: BTreeMap<i64, SubmenuRow>,
    dishes: BTreeMap<i64, DishRow>,
    jobs: BTreeMap<String, JobRecord>,
}

impl CatalogState {
    fn submenu_ids(&self, menu_id: i64) -> Vec<i64> {
        self.submenus
            .iter()
            .filter(|(_, row)| row.menu_id == menu_id)
            .map(|(id, _)| *id)
            .collect()
    }

    fn dish_count(&self, submenu_id: i64) -> i64 {
        self.dishes
            .values()
            .filter(|row| row.submenu_id == submenu_id)
            .count() as i64
    }

    fn menu_record(&self, id: i64) -> Option<MenuRecord> {
        let row = self.menus.get(&id)?;
        let submenus = self.submenu_ids(id);
        let dishes = submenus.iter().map(|sid| self.dish_count(*sid)).sum();
        Some(MenuRecord {
            id: MenuId(id),
            title: row.title.clone(),
            description: row.description.clone(),
            submenus_count: Some(submenus.len() as i64),
            dishes_count: Some(dishes),
        })
    }

    fn submenu_record(&self, menu_id: MenuId, id: i64) -> Option<SubmenuRecord> {
        let row = self.submenus.get(&id)?;
        if row.menu_id != menu_id.get() {
            return None;
        }
        Some(SubmenuRecord {
            id: SubmenuId(id),
            title: row.title.clone(),
            description: row.description.clone(),
            dishes_count: Some(self.dish_count(id)),
        })
    }

    fn owns_submenu(&self, path: SubmenuPath) -> bool {
        self.menus.contains_key(&path.menu_id.get())
            && self
                .submenus
                .get(&path.submenu_id.get())
                .is_some_and(|row| row.menu_id == path.menu_id.get())
    }

    fn dish_record(&self, path: SubmenuPath, id: i64) -> Option<DishRecord> {
        if !self.owns_submenu(path) {
            return None;
        }
        let row = self.dishes.get(&id)?;
        if row.submenu_id != path.submenu_id.get() {
            return None;
        }
        Some(DishRecord {
            id: DishId(id),
            title: row.title.clone(),
            description: row.description.clone(),
            price: row.price,
        })
    }

    fn remove_submenu(&mut self, id: i64) {
        self.submenus.remove(&id);
        self.dishes.retain(|_, row| row.submenu_id != id);
    }
}

/// Catalog and job storage held in process memory.
#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
    failing: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent call fail with a persistence error.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn set_job_state(&self, id: &str, state: JobState) {
        let mut guard = self.state.lock().unwrap();
        if let Some(job) = guard.jobs.get_mut(id) {
            job.state = state;
        }
    }

    pub fn menu_count(&self) -> usize {
        self.state.lock().unwrap().menus.len()
    }

    pub fn dish_count(&self) -> usize {
        self.state.lock().unwrap().dishes.len()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CatalogState>, RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(self.state.lock().unwrap())
    }
}

#[async_trait]
impl CatalogRepo<Menus> for InMemoryCatalog {
    async fn list(&self, _: ()) -> Result<Vec<MenuRecord>, RepoError> {
        let state = self.lock()?;
        Ok(state
            .menus
            .keys()
            .filter_map(|id| state.menu_record(*id))
            .collect())
    }

    async fn find(&self, _: (), id: MenuId) -> Result<Option<MenuRecord>, RepoError> {
        Ok(self.lock()?.menu_record(id.get()))
    }

    async fn create(&self, _: (), input: NewMenu) -> Result<Option<MenuRecord>, RepoError> {
        let mut state = self.lock()?;
        state.next_menu += 1;
        let id = state.next_menu;
        state.menus.insert(
            id,
            MenuRow {
                title: input.title.clone(),
                description: input.description.clone(),
            },
        );
        Ok(Some(MenuRecord {
            id: MenuId(id),
            title: input.title,
            description: input.description,
            submenus_count: None,
            dishes_count: None,
        }))
    }

    async fn update(
        &self,
        _: (),
        id: MenuId,
        patch: MenuPatch,
    ) -> Result<Option<MenuRecord>, RepoError> {
        let mut state = self.lock()?;
        let Some(mut record) = state.menu_record(id.get()) else {
            return Ok(None);
        };
        patch.apply(&mut record);
        state.menus.insert(
            id.get(),
            MenuRow {
                title: record.title.clone(),
                description: record.description.clone(),
            },
        );
        Ok(Some(record))
    }

    async fn delete(&self, _: (), id: MenuId) -> Result<Option<MenuRecord>, RepoError> {
        let mut state = self.lock()?;
        let Some(record) = state.menu_record(id.get()) else {
            return Ok(None);
        };
        for submenu_id in state.submenu_ids(id.get()) {
            state.remove_submenu(submenu_id);
        }
        state.menus.remove(&id.get());
        Ok(Some(record))
    }
}

#[async_trait]
impl CatalogRepo<Submenus> for InMemoryCatalog {
    async fn list(&self, menu_id: MenuId) -> Result<Vec<SubmenuRecord>, RepoError> {
        let state = self.lock()?;
        Ok(state
            .submenu_ids(menu_id.get())
            .into_iter()
            .filter_map(|id| state.submenu_record(menu_id, id))
            .collect())
    }

    async fn find(
        &self,
        menu_id: MenuId,
        id: SubmenuId,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        Ok(self.lock()?.submenu_record(menu_id, id.get()))
    }

    async fn create(
        &self,
        menu_id: MenuId,
        input: NewSubmenu,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let mut state = self.lock()?;
        if !state.menus.contains_key(&menu_id.get()) {
            return Ok(None);
        }
        state.next_submenu += 1;
        let id = state.next_submenu;
        state.submenus.insert(
            id,
            SubmenuRow {
                menu_id: menu_id.get(),
                title: input.title.clone(),
                description: input.description.clone(),
            },
        );
        Ok(Some(SubmenuRecord {
            id: SubmenuId(id),
            title: input.title,
            description: input.description,
            dishes_count: None,
        }))
    }

    async fn update(
        &self,
        menu_id: MenuId,
        id: SubmenuId,
        patch: SubmenuPatch,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let mut state = self.lock()?;
        let Some(mut record) = state.submenu_record(menu_id, id.get()) else {
            return Ok(None);
        };
        patch.apply(&mut record);
        if let Some(row) = state.submenus.get_mut(&id.get()) {
            row.title = record.title.clone();
            row.description = record.description.clone();
        }
        Ok(Some(record))
    }

    async fn delete(
        &self,
        menu_id: MenuId,
        id: SubmenuId,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let mut state = self.lock()?;
        let Some(record) = state.submenu_record(menu_id, id.get()) else {
            return Ok(None);
        };
        state.remove_submenu(id.get());
        Ok(Some(record))
    }
}

#[async_trait]
impl CatalogRepo<Dishes> for InMemoryCatalog {
    async fn list(&self, path: SubmenuPath) -> Result<Vec<DishRecord>, RepoError> {
        let state = self.lock()?;
        Ok(state
            .dishes
            .keys()
            .filter_map(|id| state.dish_record(path, *id))
            .collect())
    }

    async fn find(&self, path: SubmenuPath, id: DishId) -> Result<Option<DishRecord>, RepoError> {
        Ok(self.lock()?.dish_record(path, id.get()))
    }

    async fn create(
        &self,
        path: SubmenuPath,
        input: NewDish,
    ) -> Result<Option<DishRecord>, RepoError> {
        let mut state = self.lock()?;
        if !state.owns_submenu(path) {
            return Ok(None);
        }
        state.next_dish += 1;
        let id = state.next_dish;
        state.dishes.insert(
            id,
            DishRow {
                submenu_id: path.submenu_id.get(),
                title: input.title.clone(),
                description: input.description.clone(),
                price: input.price,
            },
        );
        Ok(Some(DishRecord {
            id: DishId(id),
            title: input.title,
            description: input.description,
            price: input.price,
        }))
    }

    async fn update(
        &self,
        path: SubmenuPath,
        id: DishId,
        patch: DishPatch,
    ) -> Result<Option<DishRecord>, RepoError> {
        let mut state = self.lock()?;
        let Some(mut record) = state.dish_record(path, id.get()) else {
            return Ok(None);
        };
        patch.apply(&mut record);
        if let Some(row) = state.dishes.get_mut(&id.get()) {
            row.title = record.title.clone();
            row.description = record.description.clone();
            row.price = record.price;
        }
        Ok(Some(record))
    }

    async fn delete(&self, path: SubmenuPath, id: DishId) -> Result<Option<DishRecord>, RepoError> {
        let mut state = self.lock()?;
        let Some(record) = state.dish_record(path, id.get()) else {
            return Ok(None);
        };
        state.dishes.remove(&id.get());
        Ok(Some(record))
    }
}

#[async_trait]
impl CatalogExportRepo for InMemoryCatalog {
    async fn joined_rows(&self) -> Result<Vec<JoinedRow>, RepoError> {
        let state = self.lock()?;
        let mut rows = Vec::new();
        for (menu_id, menu) in &state.menus {
            let menu_summary = MenuSummary {
                id: MenuId(*menu_id),
                title: menu.title.clone(),
                description: menu.description.clone(),
            };
            let submenu_ids = state.submenu_ids(*menu_id);
            if submenu_ids.is_empty() {
                rows.push(JoinedRow {
                    menu: menu_summary.clone(),
                    submenu: None,
                    dish: None,
                });
            }
            for submenu_id in submenu_ids {
                let submenu = &state.submenus[&submenu_id];
                let submenu_summary = SubmenuSummary {
                    id: SubmenuId(submenu_id),
                    title: submenu.title.clone(),
                    description: submenu.description.clone(),
                };
                let dishes: Vec<_> = state
                    .dishes
                    .iter()
                    .filter(|(_, dish)| dish.submenu_id == submenu_id)
                    .collect();
                if dishes.is_empty() {
                    rows.push(JoinedRow {
                        menu: menu_summary.clone(),
                        submenu: Some(submenu_summary.clone()),
                        dish: None,
                    });
                }
                for (dish_id, dish) in dishes {
                    rows.push(JoinedRow {
                        menu: menu_summary.clone(),
                        submenu: Some(submenu_summary.clone()),
                        dish: Some(DishSummary {
                            id: DishId(*dish_id),
                            title: dish.title.clone(),
                            description: dish.description.clone(),
                            price: dish.price,
                        }),
                    });
                }
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl JobsRepo for InMemoryCatalog {
    async fn enqueue_job(&self, job: NewJobRecord) -> Result<String, RepoError> {
        let mut state = self.lock()?;
        state.next_job += 1;
        let id = format!("job-{}", state.next_job);
        state.jobs.insert(
            id.clone(),
            JobRecord {
                id: id.clone(),
                job_type: job.job_type,
                payload: job.payload,
                state: JobState::Pending,
                attempts: 0,
                run_at: job.run_at,
                done_at: None,
                last_error: None,
            },
        );
        Ok(id)
    }

    async fn find_job(&self, id: &str) -> Result<Option<JobRecord>, RepoError> {
        Ok(self.lock()?.jobs.get(id).cloned())
    }
}

#[async_trait]
impl HealthRepo for InMemoryCatalog {
    async fn health_check(&self) -> Result<(), RepoError> {
        self.lock().map(|_| ())
    }
}

/// Store wrapper that records every write and delete it forwards.
pub struct RecordingStore {
    inner: MemoryCacheStore,
    writes: Mutex<Vec<String>>,
    deletes: Mutex<Vec<Vec<String>>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCacheStore::new(&CacheConfig::default()),
            writes: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// One entry per `delete_many` call.
    pub fn deletes(&self) -> Vec<Vec<String>> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.writes.lock().unwrap().len() + self.deletes.lock().unwrap().len()
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.writes.lock().unwrap().push(key.to_string());
        self.inner.set(key, value, ttl).await
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError> {
        self.deletes.lock().unwrap().push(keys.to_vec());
        self.inner.delete_many(keys).await
    }
}

pub fn cache_client(store: Arc<RecordingStore>) -> CacheClient {
    CacheClient::new(store, Duration::from_secs(300))
}

pub fn catalog_services(
    repo: &Arc<InMemoryCatalog>,
    cache: &CacheClient,
) -> (MenuService, SubmenuService, DishService) {
    (
        MenuService::new(repo.clone(), cache.clone()),
        SubmenuService::new(repo.clone(), cache.clone()),
        DishService::new(repo.clone(), cache.clone()),
    )
}

pub fn api_state(repo: &Arc<InMemoryCatalog>, cache: &CacheClient, reports: PathBuf) -> ApiState {
    let (menus, submenus, dishes) = catalog_services(repo, cache);
    ApiState {
        menus: menus.clone(),
        submenus: submenus.clone(),
        dishes: dishes.clone(),
        reports: DataReportService::new(repo.clone(), repo.clone(), reports),
        seeder: CatalogSeeder::new(menus, submenus, dishes),
        db: repo.clone(),
    }
}

pub fn price(text: &str) -> Price {
    text.parse().expect("valid price literal")
}
