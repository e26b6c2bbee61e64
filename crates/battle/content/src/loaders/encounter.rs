//! Encounter line-up loader.
//!
//! An encounter names which participant templates take part on each side.
//! Hostiles are added to the roster first, so they come first in roster
//! order (and in tie-breaks between equally fast participants).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use battle_core::{ParticipantKind, ParticipantTemplate, Roster, Side};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Line-up of one encounter, referring to participant templates by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterDef {
    pub name: String,
    pub hostiles: Vec<String>,
    pub party: Vec<String>,
}

impl EncounterDef {
    /// Builds the roster from `templates`.
    ///
    /// Every key must exist and sit on the side it is listed under.
    pub fn assemble(&self, templates: &BTreeMap<String, ParticipantTemplate>) -> LoadResult<Roster> {
        if self.hostiles.is_empty() || self.party.is_empty() {
            anyhow::bail!("Encounter '{}' needs at least one participant per side", self.name);
        }

        let mut roster = Roster::new();
        let line_up = self
            .hostiles
            .iter()
            .map(|key| (key, Side::Hostile))
            .chain(self.party.iter().map(|key| (key, Side::Party)));

        for (key, side) in line_up {
            let template = templates
                .get(key)
                .ok_or_else(|| anyhow::anyhow!("Encounter '{}' refers to unknown participant '{}'", self.name, key))?;
            if template.kind.side() != side {
                anyhow::bail!(
                    "Encounter '{}' lists '{}' under {} but it is {}",
                    self.name,
                    key,
                    side,
                    side_label(&template.kind)
                );
            }
            roster
                .add(template.clone())
                .with_context(|| format!("Failed to add '{}' to encounter '{}'", key, self.name))?;
        }

        Ok(roster)
    }
}

fn side_label(kind: &ParticipantKind) -> &'static str {
    match kind {
        ParticipantKind::Player { .. } => "a player",
        ParticipantKind::Hostile { .. } => "a hostile",
    }
}

/// Loader for encounter line-ups from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    pub fn load(path: &Path) -> LoadResult<EncounterDef> {
        let content = read_file(path)?;
        let encounter: EncounterDef = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))?;
        Ok(encounter)
    }
}
