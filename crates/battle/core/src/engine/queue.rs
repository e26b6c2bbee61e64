use std::collections::VecDeque;

use crate::participant::ParticipantId;

/// FIFO of participant handles with set semantics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnQueue {
    ids: VecDeque<ParticipantId>,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless already queued. Returns whether it was added.
    pub fn push_unique(&mut self, id: ParticipantId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push_back(id);
        true
    }

    /// Removes `id` wherever it is. Returns whether it was queued.
    pub fn remove(&mut self, id: ParticipantId) -> bool {
        match self.ids.iter().position(|&queued| queued == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn front(&self) -> Option<ParticipantId> {
        self.ids.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<ParticipantId> {
        self.ids.pop_front()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
