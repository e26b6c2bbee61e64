//! Minimal hostile decision making.
//!
//! Decisions are a small priority selector: children are tried in order and
//! the first one that succeeds leaves its request on the context. The default
//! tree prefers an affordable attack skill and falls back to any affordable
//! skill. Every tick completes immediately; there is no running state.

use crate::action::{AbilityCatalog, AbilityKind, ActionRequest, SkillCategory};
use crate::participant::{ParticipantId, Roster};
use crate::target::TargetResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failure,
}

/// Blackboard handed to every node.
pub struct AiContext<'a> {
    pub roster: &'a Roster,
    pub catalog: &'a AbilityCatalog,
    pub actor: ParticipantId,
    pub decision: Option<ActionRequest>,
}

pub trait AiNode: Send + Sync {
    fn tick(&self, ctx: &mut AiContext<'_>) -> Status;
}

/// Tries children in order until one succeeds.
pub struct Selector {
    children: Vec<Box<dyn AiNode>>,
}

impl Selector {
    pub fn new(children: Vec<Box<dyn AiNode>>) -> Self {
        Self { children }
    }
}

impl AiNode for Selector {
    fn tick(&self, ctx: &mut AiContext<'_>) -> Status {
        for child in &self.children {
            if child.tick(ctx) == Status::Success {
                return Status::Success;
            }
        }
        Status::Failure
    }
}

/// Picks the first affordable skill, optionally limited to one category,
/// whose default target resolves.
pub struct UseSkill {
    category: Option<SkillCategory>,
}

impl UseSkill {
    pub fn of(category: SkillCategory) -> Self {
        Self {
            category: Some(category),
        }
    }

    pub fn any() -> Self {
        Self { category: None }
    }
}

impl AiNode for UseSkill {
    fn tick(&self, ctx: &mut AiContext<'_>) -> Status {
        let Some(actor) = ctx.roster.get(ctx.actor) else {
            return Status::Failure;
        };

        for &id in actor.kind().skills() {
            let Some(ability) = ctx.catalog.get(id) else {
                continue;
            };
            let AbilityKind::Skill { category, sp_cost } = ability.kind else {
                continue;
            };
            if self.category.is_some_and(|wanted| wanted != category) || sp_cost > actor.resource_points() {
                continue;
            }
            if let Some(target) = TargetResolver::initial(ctx.roster, ctx.actor, ability.target_type) {
                ctx.decision = Some(ActionRequest::new(ctx.actor, target, ability.clone()));
                return Status::Success;
            }
        }
        Status::Failure
    }
}

/// Decision stub for hostile participants.
pub struct HostileAi {
    root: Box<dyn AiNode>,
}

impl HostileAi {
    pub fn new(root: Box<dyn AiNode>) -> Self {
        Self { root }
    }

    /// Builds a request for `actor`, or `None` if nothing is usable.
    pub fn decide(
        &self,
        roster: &Roster,
        catalog: &AbilityCatalog,
        actor: ParticipantId,
    ) -> Option<ActionRequest> {
        let mut ctx = AiContext {
            roster,
            catalog,
            actor,
            decision: None,
        };
        match self.root.tick(&mut ctx) {
            Status::Success => ctx.decision,
            Status::Failure => None,
        }
    }
}

impl Default for HostileAi {
    fn default() -> Self {
        Self::new(Box::new(Selector::new(vec![
            Box::new(UseSkill::of(SkillCategory::Attack)),
            Box::new(UseSkill::any()),
        ])))
    }
}

impl std::fmt::Debug for HostileAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostileAi").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ability::tests::create_test_skill;
    use crate::action::AbilityId;
    use crate::participant::tests::create_test_template;
    use crate::participant::ParticipantKind;
    use crate::store::Loot;
    use crate::target::{TargetDescriptor, TargetType};

    fn roster_with_hostile(skills: Vec<AbilityId>, sp: u32) -> (Roster, ParticipantId, ParticipantId) {
        let mut roster = Roster::new();
        let mut template = create_test_template("ogre", true, 10);
        template.sp = sp;
        template.kind = ParticipantKind::Hostile {
            skills,
            loot: Loot::default(),
        };
        let ogre = roster.add(template).unwrap();
        let hero = roster.add(create_test_template("hero", false, 10)).unwrap();
        (roster, ogre, hero)
    }

    fn catalog() -> AbilityCatalog {
        let mut guard = create_test_skill(1, 0, TargetType::SelfActor);
        guard.kind = AbilityKind::Skill {
            category: SkillCategory::Defend,
            sp_cost: 0,
        };
        [
            guard,
            create_test_skill(2, 0, TargetType::Foe),
            create_test_skill(3, 8, TargetType::FoePoint),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn prefers_affordable_attack() {
        let (roster, ogre, hero) = roster_with_hostile(vec![AbilityId(1), AbilityId(3), AbilityId(2)], 5);
        let request = HostileAi::default().decide(&roster, &catalog(), ogre).unwrap();
        assert_eq!(request.ability().id, AbilityId(2));
        assert_eq!(request.target(), &TargetDescriptor::Actor { actor: hero });
    }

    #[test]
    fn falls_back_to_any_skill() {
        let (roster, ogre, _) = roster_with_hostile(vec![AbilityId(3), AbilityId(1)], 5);
        let request = HostileAi::default().decide(&roster, &catalog(), ogre).unwrap();
        assert_eq!(request.ability().id, AbilityId(1));
        assert_eq!(request.target(), &TargetDescriptor::Actor { actor: ogre });
    }

    #[test]
    fn nothing_usable_yields_none() {
        let (roster, ogre, _) = roster_with_hostile(vec![AbilityId(3)], 5);
        assert!(HostileAi::default().decide(&roster, &catalog(), ogre).is_none());
    }
}
