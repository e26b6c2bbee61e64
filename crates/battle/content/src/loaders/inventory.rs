//! Party inventory loader.

use std::path::Path;

use battle_core::{Inventory, ItemId};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Starting inventory structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFile {
    #[serde(default)]
    pub items: Vec<(ItemId, u32)>,
}

/// Loader for the party's starting inventory from RON files.
pub struct InventoryLoader;

impl InventoryLoader {
    /// Load a starting inventory. Repeated item ids add up.
    pub fn load(path: &Path) -> LoadResult<Inventory> {
        let content = read_file(path)?;
        let file: InventoryFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse inventory RON: {}", e))?;

        let mut inventory = Inventory::new();
        for (item, count) in file.items {
            inventory.add(item, count);
        }
        Ok(inventory)
    }
}
