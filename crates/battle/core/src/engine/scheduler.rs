//! Ready-queue scheduling.
//!
//! The ready queue head is the only participant allowed to act. Each tick
//! the scheduler looks at the head: a `Ready` head is promoted to `Acting`
//! (the only place that promotion happens), an `Acting` head keeps the
//! queue waiting, and any other head is stale and popped.

use crate::participant::{ParticipantId, ParticipantState, Roster};

use super::queue::TurnQueue;

/// What the orchestrator should do with the ready queue this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerStep {
    /// Nothing is ready.
    Empty,
    /// The head is `Ready` and must be promoted to `Acting`.
    Promote(ParticipantId),
    /// The head is already `Acting`.
    Acting(ParticipantId),
}

#[derive(Clone, Debug, Default)]
pub struct TurnScheduler {
    ready: TurnQueue,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a participant enters `Ready`.
    pub fn notify_ready(&mut self, id: ParticipantId) {
        if self.ready.push_unique(id) {
            tracing::debug!(participant = %id, queued = self.ready.len(), "ready queue push");
        }
    }

    pub fn remove(&mut self, id: ParticipantId) {
        if self.ready.remove(id) {
            tracing::debug!(participant = %id, "ready queue remove");
        }
    }

    pub fn clear(&mut self) {
        self.ready.clear();
    }

    pub fn queue(&self) -> &TurnQueue {
        &self.ready
    }

    /// Inspects the head, popping stale entries until one is `Ready` or
    /// `Acting` or the queue runs dry.
    pub fn advance(&mut self, roster: &Roster) -> SchedulerStep {
        while let Some(head) = self.ready.front() {
            match roster.get(head).map(|p| p.state()) {
                Some(ParticipantState::Ready) => return SchedulerStep::Promote(head),
                Some(ParticipantState::Acting) => return SchedulerStep::Acting(head),
                state => {
                    tracing::debug!(participant = %head, ?state, "stale ready queue head popped");
                    self.ready.pop_front();
                }
            }
        }
        SchedulerStep::Empty
    }
}
