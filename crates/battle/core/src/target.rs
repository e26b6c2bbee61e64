//! Target selection and validation.
//!
//! [`TargetResolver`] is stateless: every operation is a pure function of the
//! roster and a [`TargetDescriptor`]. Descriptors hold participant handles,
//! never references, so a descriptor can outlive its target's death. Code
//! that is about to use a descriptor checks [`TargetResolver::is_valid`] and
//! re-resolves through [`TargetResolver::initial`] when it fails.

use crate::error::BattleError;
use crate::participant::{ParticipantId, Roster, Side};

/// Which kind of target an ability accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetType {
    SelfPoint,
    AllyPoint,
    FoePoint,
    SelfActor,
    Ally,
    Foe,
    AllAllies,
    AllFoes,
}

/// Shape of the descriptor a target type produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetScope {
    AttackPoint,
    Actor,
    Party,
}

impl TargetType {
    pub const fn scope(self) -> TargetScope {
        match self {
            TargetType::SelfPoint | TargetType::AllyPoint | TargetType::FoePoint => {
                TargetScope::AttackPoint
            }
            TargetType::SelfActor | TargetType::Ally | TargetType::Foe => TargetScope::Actor,
            TargetType::AllAllies | TargetType::AllFoes => TargetScope::Party,
        }
    }

    /// Whether the target comes from the user's own roster.
    pub const fn targets_allies(self) -> bool {
        !matches!(
            self,
            TargetType::FoePoint | TargetType::Foe | TargetType::AllFoes
        )
    }

    /// Self-only types never cycle to another actor.
    pub const fn is_self(self) -> bool {
        matches!(self, TargetType::SelfPoint | TargetType::SelfActor)
    }
}

/// Resolved target of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetDescriptor {
    AttackPoint { actor: ParticipantId, point: usize },
    Actor { actor: ParticipantId },
    Party { side: Side },
}

impl TargetDescriptor {
    /// The single actor this descriptor names, if any.
    pub fn actor(&self) -> Option<ParticipantId> {
        match *self {
            TargetDescriptor::AttackPoint { actor, .. } | TargetDescriptor::Actor { actor } => {
                Some(actor)
            }
            TargetDescriptor::Party { .. } => None,
        }
    }

    pub fn references(&self, id: ParticipantId) -> bool {
        self.actor() == Some(id)
    }

    pub fn scope(&self) -> TargetScope {
        match self {
            TargetDescriptor::AttackPoint { .. } => TargetScope::AttackPoint,
            TargetDescriptor::Actor { .. } => TargetScope::Actor,
            TargetDescriptor::Party { .. } => TargetScope::Party,
        }
    }

    fn with_actor(&self, actor: ParticipantId) -> Self {
        match self {
            TargetDescriptor::AttackPoint { .. } => TargetDescriptor::AttackPoint { actor, point: 0 },
            TargetDescriptor::Actor { .. } => TargetDescriptor::Actor { actor },
            party @ TargetDescriptor::Party { .. } => *party,
        }
    }
}

/// Cycling direction for target selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Stateless target selection over a roster.
pub struct TargetResolver;

impl TargetResolver {
    /// Picks the default target for `user` and `target_type`.
    ///
    /// Actor-bearing types take the first living member of the relevant
    /// roster (the user itself for self types) at attack point 0; party types
    /// bind the whole roster. Returns `None` when nothing valid exists.
    pub fn initial(
        roster: &Roster,
        user: ParticipantId,
        target_type: TargetType,
    ) -> Option<TargetDescriptor> {
        let user_side = roster.get(user)?.side();
        let side = if target_type.targets_allies() {
            user_side
        } else {
            user_side.opposite()
        };

        let descriptor = match target_type.scope() {
            TargetScope::Party => TargetDescriptor::Party { side },
            scope => {
                let actor = if target_type.is_self() {
                    user
                } else {
                    roster.living(side).next()?.id()
                };
                if scope == TargetScope::AttackPoint {
                    TargetDescriptor::AttackPoint { actor, point: 0 }
                } else {
                    TargetDescriptor::Actor { actor }
                }
            }
        };

        Self::is_valid(roster, &descriptor).then_some(descriptor)
    }

    /// Steps to the next/previous actor on the current actor's side, with
    /// wraparound. Dead members are skipped when `require_valid` is set. The
    /// attack point resets to 0 on actor change. Party descriptors, and
    /// descriptors with no other eligible actor, are returned unchanged.
    pub fn cycle_actor(
        roster: &Roster,
        current: &TargetDescriptor,
        direction: Direction,
        require_valid: bool,
    ) -> TargetDescriptor {
        let Some(actor) = current.actor() else {
            return *current;
        };
        let Some(side) = roster.get(actor).map(|p| p.side()) else {
            return *current;
        };

        let members = roster.side_ids(side);
        let Some(start) = members.iter().position(|&id| id == actor) else {
            return *current;
        };

        let len = members.len();
        for step in 1..len {
            let index = match direction {
                Direction::Forward => (start + step) % len,
                Direction::Backward => (start + len - step) % len,
            };
            let candidate = members[index];
            if !require_valid || roster.is_alive(candidate) {
                return current.with_actor(candidate);
            }
        }
        *current
    }

    /// Steps through the current actor's attack points with wraparound.
    /// A no-op for actors with a single point and for non-point descriptors.
    pub fn cycle_point(
        roster: &Roster,
        current: &TargetDescriptor,
        direction: Direction,
    ) -> TargetDescriptor {
        let TargetDescriptor::AttackPoint { actor, point } = *current else {
            return *current;
        };
        let Some(count) = roster.get(actor).map(|p| p.attack_points().len()) else {
            return *current;
        };
        if count <= 1 {
            return *current;
        }

        let point = match direction {
            Direction::Forward => (point + 1) % count,
            Direction::Backward => (point + count - 1) % count,
        };
        TargetDescriptor::AttackPoint { actor, point }
    }

    pub fn is_valid(roster: &Roster, descriptor: &TargetDescriptor) -> bool {
        match *descriptor {
            TargetDescriptor::AttackPoint { actor, point } => roster
                .get(actor)
                .is_some_and(|p| p.is_alive() && point < p.attack_points().len()),
            TargetDescriptor::Actor { actor } => roster.is_alive(actor),
            TargetDescriptor::Party { side } => roster.living_count(side) > 0,
        }
    }

    /// Returns `descriptor` if still valid, otherwise a fresh default target.
    pub fn revalidate(
        roster: &Roster,
        user: ParticipantId,
        target_type: TargetType,
        descriptor: &TargetDescriptor,
    ) -> Result<TargetDescriptor, BattleError> {
        if Self::is_valid(roster, descriptor) {
            return Ok(*descriptor);
        }
        let resolved = Self::initial(roster, user, target_type).ok_or(BattleError::NoValidTarget)?;
        tracing::debug!(
            %user,
            stale = ?descriptor,
            ?resolved,
            "target re-resolved"
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::tests::create_test_template;
    use crate::participant::AttackPoint;

    fn roster_with(hostiles: usize, players: usize) -> (Roster, Vec<ParticipantId>, Vec<ParticipantId>) {
        let mut roster = Roster::new();
        let foes = (0..hostiles)
            .map(|i| roster.add(create_test_template(&format!("foe{i}"), true, 10)).unwrap())
            .collect();
        let party = (0..players)
            .map(|i| roster.add(create_test_template(&format!("hero{i}"), false, 10)).unwrap())
            .collect();
        (roster, foes, party)
    }

    fn kill(roster: &mut Roster, id: ParticipantId) {
        let p = roster.get_mut(id).unwrap();
        p.take_damage(u32::MAX);
    }

    #[test]
    fn initial_picks_first_living_foe() {
        let (mut roster, foes, party) = roster_with(3, 1);
        kill(&mut roster, foes[0]);

        let target = TargetResolver::initial(&roster, party[0], TargetType::FoePoint).unwrap();
        assert_eq!(target, TargetDescriptor::AttackPoint {
            actor: foes[1],
            point: 0
        });
    }

    #[test]
    fn initial_for_self_and_party() {
        let (roster, _, party) = roster_with(2, 2);
        assert_eq!(
            TargetResolver::initial(&roster, party[1], TargetType::SelfActor),
            Some(TargetDescriptor::Actor { actor: party[1] })
        );
        assert_eq!(
            TargetResolver::initial(&roster, party[0], TargetType::AllFoes),
            Some(TargetDescriptor::Party { side: Side::Hostile })
        );
    }

    #[test]
    fn initial_fails_when_side_is_wiped() {
        let (mut roster, foes, party) = roster_with(2, 1);
        for id in foes {
            kill(&mut roster, id);
        }
        assert_eq!(TargetResolver::initial(&roster, party[0], TargetType::Foe), None);
        assert_eq!(TargetResolver::initial(&roster, party[0], TargetType::AllFoes), None);
    }

    #[test]
    fn cycle_actor_wraps_around_full_roster() {
        let (roster, foes, _) = roster_with(4, 1);
        let start = TargetDescriptor::Actor { actor: foes[2] };

        for direction in [Direction::Forward, Direction::Backward] {
            let mut current = start;
            for _ in 0..foes.len() {
                current = TargetResolver::cycle_actor(&roster, &current, direction, true);
            }
            assert_eq!(current, start);
        }
    }

    #[test]
    fn cycle_actor_skips_dead_members() {
        let (mut roster, foes, _) = roster_with(4, 1);
        kill(&mut roster, foes[1]);
        let start = TargetDescriptor::Actor { actor: foes[0] };

        let mut current = start;
        let living = roster.living_count(Side::Hostile);
        for _ in 0..living {
            current = TargetResolver::cycle_actor(&roster, &current, Direction::Forward, true);
            assert_ne!(current.actor(), Some(foes[1]));
        }
        assert_eq!(current, start);

        // Without the validity requirement the dead member is reachable.
        let next = TargetResolver::cycle_actor(&roster, &start, Direction::Forward, false);
        assert_eq!(next.actor(), Some(foes[1]));
    }

    #[test]
    fn cycle_actor_resets_attack_point() {
        let (roster, foes, _) = roster_with(2, 1);
        let start = TargetDescriptor::AttackPoint {
            actor: foes[0],
            point: 3,
        };
        assert_eq!(
            TargetResolver::cycle_actor(&roster, &start, Direction::Forward, true),
            TargetDescriptor::AttackPoint {
                actor: foes[1],
                point: 0
            }
        );
    }

    #[test]
    fn cycle_point_wraps_and_ignores_single_point_actors() {
        let mut roster = Roster::new();
        let mut template = create_test_template("drake", true, 10);
        template.attack_points = vec![
            AttackPoint::new("Head"),
            AttackPoint::new("Wing"),
            AttackPoint::new("Tail"),
        ];
        let drake = roster.add(template).unwrap();
        let slime = roster.add(create_test_template("slime", true, 10)).unwrap();

        let at = |actor, point| TargetDescriptor::AttackPoint { actor, point };
        assert_eq!(
            TargetResolver::cycle_point(&roster, &at(drake, 2), Direction::Forward),
            at(drake, 0)
        );
        assert_eq!(
            TargetResolver::cycle_point(&roster, &at(drake, 0), Direction::Backward),
            at(drake, 2)
        );
        assert_eq!(
            TargetResolver::cycle_point(&roster, &at(slime, 0), Direction::Forward),
            at(slime, 0)
        );
    }

    #[test]
    fn validity_rules() {
        let (mut roster, foes, _) = roster_with(2, 1);
        assert!(TargetResolver::is_valid(&roster, &TargetDescriptor::AttackPoint {
            actor: foes[0],
            point: 0
        }));
        assert!(!TargetResolver::is_valid(&roster, &TargetDescriptor::AttackPoint {
            actor: foes[0],
            point: 1
        }));

        kill(&mut roster, foes[0]);
        assert!(!TargetResolver::is_valid(&roster, &TargetDescriptor::Actor {
            actor: foes[0]
        }));
        assert!(TargetResolver::is_valid(&roster, &TargetDescriptor::Party {
            side: Side::Hostile
        }));
        kill(&mut roster, foes[1]);
        assert!(!TargetResolver::is_valid(&roster, &TargetDescriptor::Party {
            side: Side::Hostile
        }));
    }

    #[test]
    fn revalidate_moves_off_dead_target() {
        let (mut roster, foes, party) = roster_with(2, 1);
        let stale = TargetDescriptor::Actor { actor: foes[0] };
        kill(&mut roster, foes[0]);

        let fresh = TargetResolver::revalidate(&roster, party[0], TargetType::Foe, &stale).unwrap();
        assert_eq!(fresh, TargetDescriptor::Actor { actor: foes[1] });

        kill(&mut roster, foes[1]);
        assert_eq!(
            TargetResolver::revalidate(&roster, party[0], TargetType::Foe, &stale),
            Err(BattleError::NoValidTarget)
        );
    }
}
