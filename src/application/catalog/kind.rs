use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheKey, Mutation};
use crate::domain::entities::{
    DishId, DishPatch, DishRecord, MenuId, MenuPatch, MenuRecord, NewDish, NewMenu, NewSubmenu,
    SubmenuId, SubmenuPatch, SubmenuPath, SubmenuRecord,
};

/// Describes one level of the catalog hierarchy to the generic service.
pub trait EntityKind: Send + Sync + 'static {
    /// Entity name used in error messages.
    const NAME: &'static str;

    /// Parent path that scopes every lookup.
    type Scope: Copy + fmt::Debug + Send + Sync + 'static;
    /// Identifier assigned by the database, unique within its table.
    type Id: Copy + fmt::Display + Send + Sync + 'static;
    /// Stored row as returned to clients and cached.
    type Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Input for creating a new row.
    type Create: Send + 'static;
    /// Partial update; absent fields keep their stored value.
    type Patch: Send + 'static;

    fn id_of(record: &Self::Record) -> Self::Id;

    fn list_key(scope: Self::Scope) -> CacheKey;

    fn detail_key(scope: Self::Scope, id: Self::Id) -> CacheKey;

    fn mutation(scope: Self::Scope, id: Self::Id) -> Mutation;
}

pub enum Menus {}

pub enum Submenus {}

pub enum Dishes {}

impl EntityKind for Menus {
    const NAME: &'static str = "menu";

    type Scope = ();
    type Id = MenuId;
    type Record = MenuRecord;
    type Create = NewMenu;
    type Patch = MenuPatch;

    fn id_of(record: &MenuRecord) -> MenuId {
        record.id
    }

    fn list_key(_: ()) -> CacheKey {
        CacheKey::MenuList
    }

    fn detail_key(_: (), id: MenuId) -> CacheKey {
        CacheKey::Menu(id)
    }

    fn mutation(_: (), id: MenuId) -> Mutation {
        Mutation::Menu(id)
    }
}

impl EntityKind for Submenus {
    const NAME: &'static str = "submenu";

    type Scope = MenuId;
    type Id = SubmenuId;
    type Record = SubmenuRecord;
    type Create = NewSubmenu;
    type Patch = SubmenuPatch;

    fn id_of(record: &SubmenuRecord) -> SubmenuId {
        record.id
    }

    fn list_key(menu: MenuId) -> CacheKey {
        CacheKey::SubmenuList(menu)
    }

    fn detail_key(menu: MenuId, id: SubmenuId) -> CacheKey {
        CacheKey::Submenu(menu, id)
    }

    fn mutation(menu: MenuId, id: SubmenuId) -> Mutation {
        Mutation::Submenu(menu, id)
    }
}

impl EntityKind for Dishes {
    const NAME: &'static str = "dish";

    type Scope = SubmenuPath;
    type Id = DishId;
    type Record = DishRecord;
    type Create = NewDish;
    type Patch = DishPatch;

    fn id_of(record: &DishRecord) -> DishId {
        record.id
    }

    fn list_key(path: SubmenuPath) -> CacheKey {
        CacheKey::DishList(path)
    }

    fn detail_key(path: SubmenuPath, id: DishId) -> CacheKey {
        CacheKey::Dish(path, id)
    }

    fn mutation(path: SubmenuPath, id: DishId) -> Mutation {
        Mutation::Dish(path, id)
    }
}
