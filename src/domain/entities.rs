//! Catalog records as they are returned to clients and snapshotted into the cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use super::price::Price;
use super::types::{JobState, JobType};

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.parse().map($name)
            }
        }

        // Identifiers are strings on the wire.
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match RawId::deserialize(deserializer)? {
                    RawId::Text(text) => text.parse().map_err(serde::de::Error::custom),
                    RawId::Number(number) => Ok($name(number)),
                }
            }
        }
    };
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

catalog_id!(
    /// Primary key of a row in `menus`.
    MenuId
);
catalog_id!(
    /// Primary key of a row in `submenus`.
    SubmenuId
);
catalog_id!(
    /// Primary key of a row in `dishes`.
    DishId
);

/// Location of a submenu's children: the submenu and the menu that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmenuPath {
    pub menu_id: MenuId,
    pub submenu_id: SubmenuId,
}

impl SubmenuPath {
    pub fn new(menu_id: MenuId, submenu_id: SubmenuId) -> Self {
        Self {
            menu_id,
            submenu_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: MenuId,
    pub title: String,
    pub description: String,
    /// `None` when the record did not come through the counting query (e.g. right after create).
    pub submenus_count: Option<i64>,
    pub dishes_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmenuRecord {
    pub id: SubmenuId,
    pub title: String,
    pub description: String,
    pub dishes_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishRecord {
    pub id: DishId,
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSubmenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDish {
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MenuPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubmenuPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DishPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

/// Replace `current` when `candidate` carries a non-empty value.
fn merge_text(current: &mut String, candidate: Option<String>) {
    if let Some(value) = candidate.filter(|value| !value.is_empty()) {
        *current = value;
    }
}

impl MenuPatch {
    pub fn apply(self, record: &mut MenuRecord) {
        merge_text(&mut record.title, self.title);
        merge_text(&mut record.description, self.description);
    }
}

impl SubmenuPatch {
    pub fn apply(self, record: &mut SubmenuRecord) {
        merge_text(&mut record.title, self.title);
        merge_text(&mut record.description, self.description);
    }
}

impl DishPatch {
    pub fn apply(self, record: &mut DishRecord) {
        merge_text(&mut record.title, self.title);
        merge_text(&mut record.description, self.description);
        if let Some(price) = self.price {
            record.price = price;
        }
    }
}

/// One row of the `menus ⟕ submenus ⟕ dishes` join used as report input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub menu: MenuSummary,
    pub submenu: Option<SubmenuSummary>,
    pub dish: Option<DishSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSummary {
    pub id: MenuId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmenuSummary {
    pub id: SubmenuId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishSummary {
    pub id: DishId,
    pub title: String,
    pub description: String,
    pub price: Price,
}

/// Snapshot of a row in `apalis.jobs`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: String,
    pub job_type: JobType,
    pub payload: serde_json::Value,
    pub state: JobState,
    pub attempts: i32,
    pub run_at: OffsetDateTime,
    pub done_at: Option<OffsetDateTime>,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_strings() {
        let record = MenuRecord {
            id: MenuId(1),
            title: "My menu 1".to_string(),
            description: "My menu description 1".to_string(),
            submenus_count: None,
            dishes_count: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "title": "My menu 1",
                "description": "My menu description 1",
                "submenus_count": null,
                "dishes_count": null,
            })
        );
        let back: MenuRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn patch_skips_missing_and_empty_fields() {
        let mut dish = DishRecord {
            id: DishId(3),
            title: "Soup".to_string(),
            description: "Hot".to_string(),
            price: "4.20".parse().unwrap(),
        };
        DishPatch {
            title: Some(String::new()),
            description: Some("Very hot".to_string()),
            price: None,
        }
        .apply(&mut dish);

        assert_eq!(dish.title, "Soup");
        assert_eq!(dish.description, "Very hot");
        assert_eq!(dish.price.to_string(), "4.20");
    }
}
