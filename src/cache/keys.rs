//! Cache key scheme.
//!
//! Maps a position in the menu → submenu → dish hierarchy to the name of the
//! cached snapshot, and a successful mutation to the keys it makes stale.
//! Counters shown at a level depend on every level below it, so a mutation
//! invalidates its whole ancestor chain plus its own list and detail entries.

use std::fmt;

use crate::domain::entities::{DishId, MenuId, SubmenuId, SubmenuPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MenuList,
    Menu(MenuId),
    SubmenuList(MenuId),
    Submenu(MenuId, SubmenuId),
    DishList(SubmenuPath),
    Dish(SubmenuPath, DishId),
}

impl CacheKey {
    /// Low-cardinality label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::MenuList => "menus_list",
            CacheKey::Menu(_) => "menu",
            CacheKey::SubmenuList(_) => "submenus_list",
            CacheKey::Submenu(..) => "submenu",
            CacheKey::DishList(_) => "dishes_list",
            CacheKey::Dish(..) => "dish",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::MenuList => f.write_str("menus_list"),
            CacheKey::Menu(menu) => write!(f, "menu_{menu}"),
            CacheKey::SubmenuList(menu) => write!(f, "submenus_list_{menu}"),
            CacheKey::Submenu(menu, submenu) => write!(f, "submenu_{menu}_{submenu}"),
            CacheKey::DishList(path) => {
                write!(f, "dishes_list_{}_{}", path.menu_id, path.submenu_id)
            }
            CacheKey::Dish(path, dish) => {
                write!(f, "dish_{}_{}_{dish}", path.menu_id, path.submenu_id)
            }
        }
    }
}

/// A committed create, update, or delete, located by its full hierarchy path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Menu(MenuId),
    Submenu(MenuId, SubmenuId),
    Dish(SubmenuPath, DishId),
}

impl Mutation {
    pub fn invalidated_keys(self) -> Vec<CacheKey> {
        match self {
            Mutation::Menu(menu) => vec![CacheKey::MenuList, CacheKey::Menu(menu)],
            Mutation::Submenu(menu, submenu) => vec![
                CacheKey::MenuList,
                CacheKey::Menu(menu),
                CacheKey::SubmenuList(menu),
                CacheKey::Submenu(menu, submenu),
            ],
            Mutation::Dish(path, dish) => vec![
                CacheKey::MenuList,
                CacheKey::Menu(path.menu_id),
                CacheKey::SubmenuList(path.menu_id),
                CacheKey::Submenu(path.menu_id, path.submenu_id),
                CacheKey::DishList(path),
                CacheKey::Dish(path, dish),
            ],
        }
    }
}
