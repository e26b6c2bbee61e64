//! Content factory for building encounters from data files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use battle_core::{AbilityCatalog, BattleConfig, Inventory, ParticipantTemplate, Roster};

use crate::loaders::{
    AbilityLoader, ConfigLoader, EncounterLoader, EncounterDef, InventoryLoader, LoadResult,
    ParticipantLoader,
};

/// Content factory that loads all encounter content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── abilities.ron
/// ├── participants.ron
/// ├── inventory.ron
/// └── encounters/
///     └── forest_ambush.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load the ability catalog from `abilities.ron`.
    pub fn load_abilities(&self) -> LoadResult<AbilityCatalog> {
        AbilityLoader::load(&self.data_dir.join("abilities.ron"))
    }

    /// Load participant templates from `participants.ron`.
    pub fn load_participants(&self) -> LoadResult<BTreeMap<String, ParticipantTemplate>> {
        ParticipantLoader::load(&self.data_dir.join("participants.ron"))
    }

    /// Load the party's starting inventory from `inventory.ron`.
    pub fn load_inventory(&self) -> LoadResult<Inventory> {
        InventoryLoader::load(&self.data_dir.join("inventory.ron"))
    }

    /// Load an encounter line-up from `encounters/{name}.ron`.
    pub fn load_encounter(&self, name: &str) -> LoadResult<EncounterDef> {
        let path = self.data_dir.join("encounters").join(format!("{}.ron", name));
        EncounterLoader::load(&path)
    }

    /// Loads abilities and participants, checks skill references, and
    /// assembles the roster of encounter `name`.
    pub fn load_roster(&self, name: &str) -> LoadResult<(AbilityCatalog, Roster)> {
        let catalog = self.load_abilities()?;
        let templates = self.load_participants()?;
        ParticipantLoader::validate_skills(&templates, &catalog)?;
        let roster = self.load_encounter(name)?.assemble(&templates)?;
        Ok((catalog, roster))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{PartyStore, Side};

    fn bundled() -> ContentFactory {
        ContentFactory::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_content_loads() {
        let factory = bundled();
        factory.load_config().unwrap();

        let (catalog, roster) = factory.load_roster("forest_ambush").unwrap();
        assert!(!catalog.is_empty());
        assert!(roster.living_count(Side::Hostile) > 0);
        assert!(roster.living_count(Side::Party) > 0);

        let inventory = factory.load_inventory().unwrap();
        for ability in catalog.items() {
            let item = ability.item().unwrap();
            assert!(inventory.item_true_count(item) > 0, "no stock for {}", ability.name);
        }
    }
}
