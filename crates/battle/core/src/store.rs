//! Party inventory boundary.
//!
//! The party-wide store is shared by every player participant's command
//! session. Items carry two counters:
//!
//! - **true count**: what the party actually owns
//! - **available count**: true count minus outstanding reservations
//!
//! A selection reserves (available − 1); a successful execution consumes
//! (true − 1); a discarded request releases (available + 1). Every update
//! happens inside one tick's sequential processing, so several sessions
//! queued in the same tick window see consistent availability without locks.

use std::collections::BTreeMap;

use crate::error::BattleError;
use crate::participant::Participant;

/// Identifier of an item definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Rewards carried by a hostile participant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loot {
    #[cfg_attr(feature = "serde", serde(default))]
    pub experience: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub drops: Vec<(ItemId, u32)>,
}

impl Loot {
    /// Folds another loot bundle into this one.
    pub fn merge(&mut self, other: &Loot) {
        self.experience = self.experience.saturating_add(other.experience);
        for &(item, count) in &other.drops {
            match self.drops.iter_mut().find(|(existing, _)| *existing == item) {
                Some((_, total)) => *total += count,
                None => self.drops.push((item, count)),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.experience == 0 && self.drops.is_empty()
    }
}

/// Store operations the combat core needs. Called by command sessions and the
/// action executor only.
///
/// Resource points are kept on each participant; the default accessors read
/// and spend that balance. A store with a shared pool overrides both.
pub trait PartyStore: Send {
    fn get_resource_points(&self, participant: &Participant) -> u32 {
        participant.resource_points()
    }

    /// Deducts `amount` resource points, failing without change when short.
    fn spend(&mut self, participant: &mut Participant, amount: u32) -> Result<(), BattleError> {
        participant.spend(amount)
    }

    fn item_true_count(&self, item: ItemId) -> u32;

    fn item_available_count(&self, item: ItemId) -> u32;

    /// Takes one unit out of the available count.
    fn reserve_item(&mut self, item: ItemId) -> Result<(), BattleError>;

    /// Returns a reservation to the available count.
    fn release_item(&mut self, item: ItemId);

    /// Removes one reserved unit from the true count.
    fn consume_item(&mut self, item: ItemId) -> Result<(), BattleError>;

    fn grant_loot(&mut self, loot: &Loot);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStock {
    pub true_count: u32,
    pub available: u32,
}

/// In-memory [`PartyStore`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    stock: BTreeMap<ItemId, ItemStock>,
    experience: u64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: ItemId, count: u32) -> Self {
        self.add(item, count);
        self
    }

    pub fn add(&mut self, item: ItemId, count: u32) {
        let stock = self.stock.entry(item).or_default();
        stock.true_count = stock.true_count.saturating_add(count);
        stock.available = stock.available.saturating_add(count);
    }

    pub fn stock(&self, item: ItemId) -> ItemStock {
        self.stock.get(&item).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, ItemStock)> + '_ {
        self.stock.iter().map(|(id, stock)| (*id, *stock))
    }

    /// Experience accumulated through granted loot.
    pub fn experience(&self) -> u64 {
        self.experience
    }
}

impl PartyStore for Inventory {
    fn item_true_count(&self, item: ItemId) -> u32 {
        self.stock(item).true_count
    }

    fn item_available_count(&self, item: ItemId) -> u32 {
        self.stock(item).available
    }

    fn reserve_item(&mut self, item: ItemId) -> Result<(), BattleError> {
        match self.stock.get_mut(&item) {
            Some(stock) if stock.available > 0 => {
                stock.available -= 1;
                Ok(())
            }
            _ => Err(BattleError::InsufficientResource {
                required: 1,
                available: 0,
            }),
        }
    }

    fn release_item(&mut self, item: ItemId) {
        if let Some(stock) = self.stock.get_mut(&item) {
            stock.available = (stock.available + 1).min(stock.true_count);
        }
    }

    fn consume_item(&mut self, item: ItemId) -> Result<(), BattleError> {
        match self.stock.get_mut(&item) {
            Some(stock) if stock.true_count > 0 => {
                stock.true_count -= 1;
                stock.available = stock.available.min(stock.true_count);
                Ok(())
            }
            _ => Err(BattleError::InsufficientResource {
                required: 1,
                available: 0,
            }),
        }
    }

    fn grant_loot(&mut self, loot: &Loot) {
        self.experience += loot.experience as u64;
        for &(item, count) in &loot.drops {
            self.add(item, count);
        }
    }
}
