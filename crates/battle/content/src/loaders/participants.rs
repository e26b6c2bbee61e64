//! Participant template loader.

use std::collections::BTreeMap;
use std::path::Path;

use battle_core::{AbilityCatalog, ParticipantTemplate};

use crate::loaders::{LoadResult, read_file};

/// Loader for participant templates from RON files.
pub struct ParticipantLoader;

impl ParticipantLoader {
    /// Load participant templates from a RON file.
    ///
    /// RON format: `Vec<(String, ParticipantTemplate)>`, keyed by a content id
    /// that encounters refer to.
    pub fn load(path: &Path) -> LoadResult<BTreeMap<String, ParticipantTemplate>> {
        let content = read_file(path)?;
        let raw: Vec<(String, ParticipantTemplate)> = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse participant catalog RON: {}", e))?;

        let mut templates = BTreeMap::new();
        for (key, template) in raw {
            if templates.insert(key.clone(), template).is_some() {
                anyhow::bail!("Duplicate participant '{}' in {}", key, path.display());
            }
        }
        Ok(templates)
    }

    /// Checks that every skill a template lists exists in `catalog`.
    pub fn validate_skills(
        templates: &BTreeMap<String, ParticipantTemplate>,
        catalog: &AbilityCatalog,
    ) -> LoadResult<()> {
        for (key, template) in templates {
            for &skill in template.kind.skills() {
                let ability = catalog.get(skill).ok_or_else(|| {
                    anyhow::anyhow!("Participant '{}' lists unknown skill {}", key, skill)
                })?;
                if ability.item().is_some() {
                    anyhow::bail!(
                        "Participant '{}' lists item ability {} as a skill",
                        key,
                        skill
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::tests::write_fixture;
    use battle_core::{
        Ability, AbilityId, AbilityKind, EffectKey, ItemId, ParticipantKind, SkillCategory,
        TargetType,
    };

    const TEMPLATES: &str = r#"
[
    ("knight", (
        name: "Knight",
        kind: Player(skills: [AbilityId(1)]),
        hp: 120,
        sp: 10,
        stats: (attack: 18, defense: 12, evasion: 4, agility: 9),
    )),
    ("slime", (
        name: "Slime",
        kind: Hostile(skills: [AbilityId(1)], loot: (experience: 3, drops: [(ItemId(1), 1)])),
        hp: 30,
        stats: (attack: 6, defense: 2, evasion: 0, agility: 5),
        attack_points: [
            (name: "Core", defense_modifier: -2),
            (name: "Jelly", evasion_modifier: 5),
        ],
    )),
]
"#;

    fn catalog_with(kind: AbilityKind) -> AbilityCatalog {
        [Ability {
            id: AbilityId(1),
            name: "Strike".into(),
            kind,
            warmup_ms: 0,
            cooldown_ms: 0,
            target_type: TargetType::Foe,
            effect: EffectKey::from("strike"),
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn loads_keyed_templates() {
        let (_dir, path) = write_fixture("participants.ron", TEMPLATES);
        let templates = ParticipantLoader::load(&path).unwrap();

        assert_eq!(templates.len(), 2);
        let slime = &templates["slime"];
        assert_eq!(slime.sp, 0);
        assert_eq!(slime.attack_points.len(), 2);
        assert_eq!(slime.attack_points[0].defense_modifier, -2);
        match &slime.kind {
            ParticipantKind::Hostile { loot, .. } => {
                assert_eq!(loot.experience, 3);
                assert_eq!(loot.drops, vec![(ItemId(1), 1)]);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(templates["knight"].attack_points.is_empty());
    }

    #[test]
    fn skill_references_are_validated() {
        let (_dir, path) = write_fixture("participants.ron", TEMPLATES);
        let templates = ParticipantLoader::load(&path).unwrap();

        let skills = catalog_with(AbilityKind::Skill {
            category: SkillCategory::Attack,
            sp_cost: 0,
        });
        assert!(ParticipantLoader::validate_skills(&templates, &skills).is_ok());

        let err = ParticipantLoader::validate_skills(&templates, &AbilityCatalog::new()).unwrap_err();
        assert!(err.to_string().contains("unknown skill"));

        let items = catalog_with(AbilityKind::Item { item: ItemId(1) });
        assert!(ParticipantLoader::validate_skills(&templates, &items).is_err());
    }
}
