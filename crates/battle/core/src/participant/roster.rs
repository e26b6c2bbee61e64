use crate::config::BattleConfig;
use crate::error::BattleError;

use super::{Participant, ParticipantId, ParticipantTemplate, Side};

/// Arena owning every participant of an encounter.
///
/// Participants are never removed; a dead participant keeps its handle so
/// in-flight descriptors can detect it instead of dangling.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a participant, returning its handle.
    pub fn add(&mut self, template: ParticipantTemplate) -> Result<ParticipantId, BattleError> {
        let side = template.kind.side();
        if self.side(side).count() >= BattleConfig::MAX_PARTICIPANTS_PER_SIDE {
            return Err(BattleError::CapacityExceeded { side });
        }
        let id = ParticipantId(self.participants.len() as u32);
        self.participants.push(Participant::new(id, template));
        Ok(id)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.participants.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().map(Participant::id)
    }

    /// Members of one side in roster order, dead included.
    pub fn side(&self, side: Side) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.side() == side)
    }

    pub fn side_ids(&self, side: Side) -> Vec<ParticipantId> {
        self.side(side).map(Participant::id).collect()
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &Participant> {
        self.side(side).filter(|p| p.is_alive())
    }

    pub fn living_count(&self, side: Side) -> usize {
        self.living(side).count()
    }

    pub fn is_alive(&self, id: ParticipantId) -> bool {
        self.get(id).is_some_and(Participant::is_alive)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Computes every participant's idle window relative to the slowest one.
    ///
    /// `idle = base_idle_time * speed * slowest_agility / agility`, so the
    /// slowest participant gets exactly the scaled base time and faster ones
    /// proportionally less. Must run once every participant is in the roster.
    pub fn assign_idle_durations(&mut self, config: &BattleConfig) {
        let Some(slowest) = self.participants.iter().map(|p| p.stats.agility.max(1)).min() else {
            return;
        };

        let scaled_base = config.scaled(config.base_idle_time_ms) as u64;
        for participant in &mut self.participants {
            let agility = participant.stats.agility.max(1) as u64;
            let idle = scaled_base * slowest as u64 / agility;
            participant.set_idle_duration(idle as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleSpeed;
    use crate::participant::tests::create_test_template;

    #[test]
    fn faster_participants_idle_less() {
        let mut roster = Roster::new();
        let slow = roster.add(create_test_template("slow", false, 10)).unwrap();
        let mid = roster.add(create_test_template("mid", true, 20)).unwrap();
        let fast = roster.add(create_test_template("fast", true, 40)).unwrap();

        let config = BattleConfig::default()
            .with_base_idle_time(4_000)
            .with_speed(BattleSpeed::Slow);
        roster.assign_idle_durations(&config);

        let idle = |id| roster.get(id).unwrap().idle_duration();
        assert_eq!(idle(slow), 6_000);
        assert_eq!(idle(mid), 3_000);
        assert_eq!(idle(fast), 1_500);
        assert!(idle(fast) < idle(mid) && idle(mid) < idle(slow));
    }

    #[test]
    fn zero_agility_is_treated_as_one() {
        let mut roster = Roster::new();
        let a = roster.add(create_test_template("a", false, 0)).unwrap();
        let b = roster.add(create_test_template("b", true, 2)).unwrap();
        roster.assign_idle_durations(&BattleConfig::default().with_base_idle_time(1_000));
        assert_eq!(roster.get(a).unwrap().idle_duration(), 1_000);
        assert_eq!(roster.get(b).unwrap().idle_duration(), 500);
    }

    #[test]
    fn side_capacity_is_enforced() {
        let mut roster = Roster::new();
        for i in 0..BattleConfig::MAX_PARTICIPANTS_PER_SIDE {
            roster
                .add(create_test_template(&format!("foe{i}"), true, 10))
                .unwrap();
        }
        assert_eq!(
            roster.add(create_test_template("extra", true, 10)),
            Err(BattleError::CapacityExceeded { side: Side::Hostile })
        );
        assert!(roster.add(create_test_template("hero", false, 10)).is_ok());
    }
}
