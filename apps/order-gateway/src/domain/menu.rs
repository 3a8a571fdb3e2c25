//! Venue menu as reported by the point-of-sale provider.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{MenuItemId, Money};

/// A sellable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// POS identifier.
    pub id: MenuItemId,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price.
    pub price: Money,
}

/// A named group of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    /// Category name.
    pub name: String,
    /// Items in display order.
    pub items: Vec<MenuItem>,
}

/// A venue's full menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Categories in display order.
    pub categories: Vec<MenuCategory>,
}

impl Menu {
    /// Total number of items across all categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// Look up an item by POS identifier.
    #[must_use]
    pub fn find_item(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|item| &item.id == id)
    }
}
