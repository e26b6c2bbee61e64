use crate::participant::ParticipantId;
use crate::store::PartyStore;
use crate::target::TargetDescriptor;

use super::{Ability, AbilityRef};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequestStatus {
    #[default]
    Pending,
    Executed,
    Discarded,
}

/// A participant's commitment to use one ability on one target.
///
/// Built by a command session or the AI, then fixed except for its target,
/// which the executor may re-resolve once if the original went stale.
/// Item requests own one reservation in the party store from creation until
/// they are executed or discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRequest {
    source: ParticipantId,
    target: TargetDescriptor,
    ability: AbilityRef,
    status: RequestStatus,
}

impl ActionRequest {
    pub fn new(source: ParticipantId, target: TargetDescriptor, ability: AbilityRef) -> Self {
        Self {
            source,
            target,
            ability,
            status: RequestStatus::Pending,
        }
    }

    pub fn source(&self) -> ParticipantId {
        self.source
    }

    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    pub fn ability(&self) -> &Ability {
        &self.ability
    }

    pub fn ability_ref(&self) -> &AbilityRef {
        &self.ability
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub(crate) fn retarget(&mut self, target: TargetDescriptor) {
        self.target = target;
    }

    pub(crate) fn mark_executed(&mut self) {
        self.status = RequestStatus::Executed;
    }

    /// Drops a pending request, returning its item reservation to the store.
    ///
    /// Returns `false` if the request was no longer pending.
    pub(crate) fn discard(&mut self, store: &mut dyn PartyStore) -> bool {
        if !self.is_pending() {
            return false;
        }
        if let Some(item) = self.ability.item() {
            store.release_item(item);
        }
        self.status = RequestStatus::Discarded;
        tracing::debug!(source = %self.source, ability = %self.ability.id, "request discarded");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::ability::tests::create_test_item;
    use crate::store::{Inventory, ItemId};

    #[test]
    fn discard_releases_reservation_once() {
        let potion = ItemId(1);
        let mut store = Inventory::new().with_item(potion, 1);
        store.reserve_item(potion).unwrap();

        let target = TargetDescriptor::Actor {
            actor: ParticipantId(0),
        };
        let mut request =
            ActionRequest::new(ParticipantId(0), target, Arc::new(create_test_item(1, potion)));

        assert!(request.discard(&mut store));
        assert_eq!(request.status(), RequestStatus::Discarded);
        assert_eq!(store.item_available_count(potion), 1);
        assert_eq!(store.item_true_count(potion), 1);

        assert!(!request.discard(&mut store));
        assert_eq!(store.item_available_count(potion), 1);
    }
}
