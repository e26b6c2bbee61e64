//! Content loaders for reading encounter data from files.

pub mod abilities;
pub mod config;
pub mod encounter;
pub mod factory;
pub mod inventory;
pub mod participants;

pub use abilities::AbilityLoader;
pub use config::ConfigLoader;
pub use encounter::{EncounterLoader, EncounterDef};
pub use factory::ContentFactory;
pub use inventory::InventoryLoader;
pub use participants::ParticipantLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// Writes `content` to `name` inside a fresh temp dir.
    pub(crate) fn write_fixture(name: &str, content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }
}
