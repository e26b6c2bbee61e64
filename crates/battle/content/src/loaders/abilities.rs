//! Ability catalog loader.

use std::path::Path;

use battle_core::{Ability, AbilityCatalog};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Ability catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityFile {
    pub abilities: Vec<Ability>,
}

/// Loader for ability catalogs from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    /// Load an ability catalog from a RON file.
    ///
    /// Fails on duplicate ids so a typo cannot silently replace an entry.
    pub fn load(path: &Path) -> LoadResult<AbilityCatalog> {
        let content = read_file(path)?;
        let file: AbilityFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;

        let mut catalog = AbilityCatalog::new();
        for ability in file.abilities {
            let id = ability.id;
            if catalog.insert(ability).is_some() {
                anyhow::bail!("Duplicate ability id {} in {}", id, path.display());
            }
        }

        Ok(catalog)
    }
}
