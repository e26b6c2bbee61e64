use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::command::CommandCategory;
use crate::store::ItemId;
use crate::target::TargetType;

/// Identifier of an ability definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u32);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

/// Name under which an effect routine is registered.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EffectKey(String);

impl EffectKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EffectKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for EffectKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillCategory {
    Attack,
    Defend,
    Support,
}

/// Skill or item use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKind {
    Skill { category: SkillCategory, sp_cost: u32 },
    /// Items cost no SP; they consume one unit of `item` from the party store.
    Item { item: ItemId },
}

/// Complete ability definition, usually loaded from data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub id: AbilityId,
    pub name: String,
    pub kind: AbilityKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub warmup_ms: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown_ms: u32,
    pub target_type: TargetType,
    pub effect: EffectKey,
}

impl Ability {
    pub fn sp_cost(&self) -> u32 {
        match self.kind {
            AbilityKind::Skill { sp_cost, .. } => sp_cost,
            AbilityKind::Item { .. } => 0,
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        match self.kind {
            AbilityKind::Item { item } => Some(item),
            AbilityKind::Skill { .. } => None,
        }
    }

    /// Command menu category this ability is listed under.
    pub fn category(&self) -> CommandCategory {
        match self.kind {
            AbilityKind::Skill { category, .. } => match category {
                SkillCategory::Attack => CommandCategory::Attack,
                SkillCategory::Defend => CommandCategory::Defend,
                SkillCategory::Support => CommandCategory::Support,
            },
            AbilityKind::Item { .. } => CommandCategory::Item,
        }
    }
}

/// Shared handle to an ability definition.
pub type AbilityRef = Arc<Ability>;

/// Id-indexed store of every ability available in an encounter.
#[derive(Clone, Debug, Default)]
pub struct AbilityCatalog {
    abilities: BTreeMap<AbilityId, AbilityRef>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an ability, returning the previous definition.
    pub fn insert(&mut self, ability: Ability) -> Option<AbilityRef> {
        self.abilities.insert(ability.id, Arc::new(ability))
    }

    pub fn get(&self, id: AbilityId) -> Option<&AbilityRef> {
        self.abilities.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityRef> {
        self.abilities.values()
    }

    /// Abilities that use items, in id order.
    pub fn items(&self) -> impl Iterator<Item = &AbilityRef> {
        self.iter().filter(|ability| ability.item().is_some())
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl FromIterator<Ability> for AbilityCatalog {
    fn from_iter<I: IntoIterator<Item = Ability>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for ability in iter {
            catalog.insert(ability);
        }
        catalog
    }
}
