//! Cached access to the menu → submenu → dish hierarchy.

mod kind;
mod service;

pub use kind::{Dishes, EntityKind, Menus, Submenus};
pub use service::{CatalogError, CatalogService, DishService, MenuService, SubmenuService};
