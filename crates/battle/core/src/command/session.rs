use strum::{EnumCount, IntoEnumIterator};

use crate::action::{AbilityCatalog, AbilityRef, ActionRequest};
use crate::error::BattleError;
use crate::participant::{ParticipantId, Roster};
use crate::store::PartyStore;
use crate::target::{Direction, TargetDescriptor, TargetResolver, TargetType};

use super::{CommandCategory, CommandPhase, InputState};

/// Explicit context for a session, borrowed from the orchestrator.
pub struct CommandContext<'a> {
    pub roster: &'a Roster,
    pub catalog: &'a AbilityCatalog,
    pub store: &'a mut dyn PartyStore,
}

/// One row of the ability list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityOption {
    pub ability: AbilityRef,
    /// Shown but not selectable when false.
    pub enabled: bool,
    /// Available count for item rows.
    pub available: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Still selecting.
    Pending,
    /// A request was built; the participant goes to `WarmUp`.
    Submitted(ActionRequest),
    /// Cancelled out of the category menu; the participant leaves the
    /// command queue.
    Withdrawn,
}

/// Per-participant command selection state machine.
///
/// Category, cursors and last target survive between turns; the selected
/// ability and in-progress target are transient and cleared on submit.
#[derive(Clone, Debug)]
pub struct CommandSession {
    owner: ParticipantId,
    phase: CommandPhase,
    category: CommandCategory,
    category_cursor: usize,
    cursors: [usize; CommandCategory::COUNT],
    selected: Option<AbilityRef>,
    target: Option<TargetDescriptor>,
    last_target: Option<TargetDescriptor>,
}

impl CommandSession {
    pub fn new(owner: ParticipantId) -> Self {
        Self {
            owner,
            phase: CommandPhase::Category,
            category: CommandCategory::default(),
            category_cursor: 0,
            cursors: [0; CommandCategory::COUNT],
            selected: None,
            target: None,
            last_target: None,
        }
    }

    /// Starts a new selection, keeping category and target memory.
    pub fn begin(&mut self) {
        self.phase = CommandPhase::Category;
        self.category_cursor = self.category.index();
        self.selected = None;
        self.target = None;
    }

    pub fn owner(&self) -> ParticipantId {
        self.owner
    }

    pub fn phase(&self) -> CommandPhase {
        self.phase
    }

    pub fn category(&self) -> CommandCategory {
        self.category
    }

    /// Highlighted row of the current menu.
    pub fn cursor(&self) -> usize {
        match self.phase {
            CommandPhase::Category => self.category_cursor,
            _ => self.cursors[self.category.index()],
        }
    }

    pub fn selected(&self) -> Option<&AbilityRef> {
        self.selected.as_ref()
    }

    /// Target being chosen, while in the `Target` phase.
    pub fn target(&self) -> Option<&TargetDescriptor> {
        self.target.as_ref()
    }

    pub fn last_target(&self) -> Option<&TargetDescriptor> {
        self.last_target.as_ref()
    }

    /// Ability rows of the current category.
    ///
    /// Skills come from the owner's skill list and are disabled when they
    /// cost more SP than the owner has. Items appear while the party owns
    /// any and are disabled once every unit is reserved.
    pub fn options(
        &self,
        roster: &Roster,
        catalog: &AbilityCatalog,
        store: &dyn PartyStore,
    ) -> Vec<AbilityOption> {
        let Some(owner) = roster.get(self.owner) else {
            return Vec::new();
        };

        if self.category == CommandCategory::Item {
            return catalog
                .items()
                .filter_map(|ability| {
                    let item = ability.item()?;
                    if store.item_true_count(item) == 0 {
                        return None;
                    }
                    let available = store.item_available_count(item);
                    Some(AbilityOption {
                        ability: ability.clone(),
                        enabled: available > 0,
                        available: Some(available),
                    })
                })
                .collect();
        }

        owner
            .kind()
            .skills()
            .iter()
            .filter_map(|&id| catalog.get(id))
            .filter(|ability| ability.category() == self.category)
            .map(|ability| AbilityOption {
                ability: ability.clone(),
                enabled: ability.sp_cost() <= store.get_resource_points(owner),
                available: None,
            })
            .collect()
    }

    fn list(&self, ctx: &CommandContext<'_>) -> Vec<AbilityOption> {
        self.options(ctx.roster, ctx.catalog, &*ctx.store)
    }

    /// Moves the cursor of the category or ability menu, with wraparound.
    pub fn move_cursor(&mut self, ctx: &CommandContext<'_>, direction: Direction) {
        let len = match self.phase {
            CommandPhase::Category => CommandCategory::COUNT,
            CommandPhase::AbilityList => self.list(ctx).len(),
            CommandPhase::Target | CommandPhase::Info => return,
        };
        if len == 0 {
            return;
        }

        let cursor = match self.phase {
            CommandPhase::Category => &mut self.category_cursor,
            _ => &mut self.cursors[self.category.index()],
        };
        *cursor = match direction {
            Direction::Forward => (*cursor + 1) % len,
            Direction::Backward => (*cursor + len - 1) % len,
        };
    }

    /// Advances one phase.
    ///
    /// Fails without changing phase when the highlighted ability is disabled
    /// (`InsufficientResource`) or has no valid target (`NoValidTarget`).
    pub fn confirm(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandOutcome, BattleError> {
        match self.phase {
            CommandPhase::Category => {
                self.category = CommandCategory::iter()
                    .nth(self.category_cursor)
                    .unwrap_or_default();
                self.phase = CommandPhase::AbilityList;
                let len = self.list(ctx).len();
                let cursor = &mut self.cursors[self.category.index()];
                if *cursor >= len {
                    *cursor = 0;
                }
                Ok(CommandOutcome::Pending)
            }
            CommandPhase::AbilityList => {
                self.select_highlighted(ctx)?;
                Ok(CommandOutcome::Pending)
            }
            CommandPhase::Target => self.submit(ctx).map(CommandOutcome::Submitted),
            CommandPhase::Info => Ok(CommandOutcome::Pending),
        }
    }

    /// Steps back one phase; out of `Category` the session is withdrawn.
    pub fn cancel(&mut self) -> CommandOutcome {
        match self.phase {
            CommandPhase::Category => return CommandOutcome::Withdrawn,
            CommandPhase::AbilityList => self.phase = CommandPhase::Category,
            CommandPhase::Target => {
                self.target = None;
                self.selected = None;
                self.phase = CommandPhase::AbilityList;
            }
            CommandPhase::Info => self.phase = CommandPhase::AbilityList,
        }
        CommandOutcome::Pending
    }

    pub fn open_info(&mut self) {
        if self.phase == CommandPhase::AbilityList {
            self.phase = CommandPhase::Info;
        }
    }

    pub fn close_info(&mut self) {
        if self.phase == CommandPhase::Info {
            self.phase = CommandPhase::AbilityList;
        }
    }

    /// Cycles the in-progress target to another actor on the same side.
    pub fn cycle_target_actor(&mut self, roster: &Roster, direction: Direction) {
        let Some(target_type) = self.selected.as_ref().map(|a| a.target_type) else {
            return;
        };
        if target_type.is_self() {
            return;
        }
        if let Some(target) = self.target.as_mut() {
            *target = TargetResolver::cycle_actor(roster, target, direction, true);
        }
    }

    pub fn cycle_target_point(&mut self, roster: &Roster, direction: Direction) {
        if let Some(target) = self.target.as_mut() {
            *target = TargetResolver::cycle_point(roster, target, direction);
        }
    }

    /// Re-validates the in-progress target.
    ///
    /// A stale target is re-resolved; if nothing valid remains the selection
    /// falls back to the ability list and `NoValidTarget` is returned.
    pub fn refresh_target(&mut self, roster: &Roster) -> Result<(), BattleError> {
        if self.phase != CommandPhase::Target {
            return Ok(());
        }
        let (Some(ability), Some(target)) = (self.selected.as_ref(), self.target.as_ref()) else {
            return Ok(());
        };

        match TargetResolver::revalidate(roster, self.owner, ability.target_type, target) {
            Ok(target) => {
                self.target = Some(target);
                Ok(())
            }
            Err(error) => {
                tracing::debug!(owner = %self.owner, "selected target lost");
                self.target = None;
                self.selected = None;
                self.phase = CommandPhase::AbilityList;
                Err(error)
            }
        }
    }

    /// Forgets a participant that left the encounter.
    pub fn forget(&mut self, id: ParticipantId) {
        if self.last_target.is_some_and(|t| t.references(id)) {
            self.last_target = None;
        }
    }

    /// Applies one tick of input.
    pub fn handle_input(
        &mut self,
        ctx: &mut CommandContext<'_>,
        input: InputState,
    ) -> Result<CommandOutcome, BattleError> {
        if input.contains(InputState::CONFIRM) {
            return self.confirm(ctx);
        }
        if input.contains(InputState::CANCEL) {
            return Ok(self.cancel());
        }

        match self.phase {
            CommandPhase::Category => {
                if let Some(direction) = input.vertical() {
                    self.move_cursor(ctx, direction);
                }
            }
            CommandPhase::AbilityList => {
                if input.contains(InputState::RIGHT) {
                    self.open_info();
                } else if let Some(direction) = input.vertical() {
                    self.move_cursor(ctx, direction);
                }
            }
            CommandPhase::Info => {
                if input.contains(InputState::LEFT) {
                    self.close_info();
                }
            }
            CommandPhase::Target => {
                if let Some(direction) = input.vertical() {
                    self.cycle_target_actor(ctx.roster, direction);
                } else if let Some(direction) = input.horizontal() {
                    self.cycle_target_point(ctx.roster, direction);
                }
            }
        }
        Ok(CommandOutcome::Pending)
    }

    fn select_highlighted(&mut self, ctx: &CommandContext<'_>) -> Result<(), BattleError> {
        let options = self.list(ctx);
        let cursor = self.cursors[self.category.index()];
        let Some(option) = options.get(cursor) else {
            return Ok(());
        };

        if !option.enabled {
            let available = match option.available {
                Some(count) => count,
                None => ctx
                    .roster
                    .get(self.owner)
                    .map_or(0, |owner| ctx.store.get_resource_points(owner)),
            };
            let required = if option.available.is_some() {
                1
            } else {
                option.ability.sp_cost()
            };
            return Err(BattleError::InsufficientResource { required, available });
        }

        let ability = option.ability.clone();
        let target = self
            .remembered_target(ctx.roster, ability.target_type)
            .or_else(|| TargetResolver::initial(ctx.roster, self.owner, ability.target_type))
            .ok_or(BattleError::NoValidTarget)?;

        self.selected = Some(ability);
        self.target = Some(target);
        self.phase = CommandPhase::Target;
        Ok(())
    }

    /// Last target, if it still fits an ability of `target_type`.
    fn remembered_target(&self, roster: &Roster, target_type: TargetType) -> Option<TargetDescriptor> {
        let last = self.last_target?;
        let fresh = TargetResolver::initial(roster, self.owner, target_type)?;
        if target_type.is_self() || last.scope() != fresh.scope() {
            return None;
        }
        let same_side = match (last, fresh) {
            (TargetDescriptor::Party { side: a }, TargetDescriptor::Party { side: b }) => a == b,
            _ => {
                let side_of = |t: TargetDescriptor| t.actor().and_then(|id| roster.get(id)).map(|p| p.side());
                side_of(last) == side_of(fresh)
            }
        };
        (same_side && TargetResolver::is_valid(roster, &last)).then_some(last)
    }

    fn submit(&mut self, ctx: &mut CommandContext<'_>) -> Result<ActionRequest, BattleError> {
        self.refresh_target(ctx.roster)?;
        let (Some(ability), Some(target)) = (self.selected.clone(), self.target) else {
            return Err(BattleError::NoValidTarget);
        };

        if let Some(item) = ability.item() {
            if let Err(error) = ctx.store.reserve_item(item) {
                // Another session took the last unit since the list was shown.
                self.target = None;
                self.selected = None;
                self.phase = CommandPhase::AbilityList;
                return Err(error);
            }
        }

        self.last_target = Some(target);
        self.selected = None;
        self.target = None;
        self.phase = CommandPhase::Category;
        tracing::debug!(owner = %self.owner, ability = %ability.id, ?target, "command submitted");
        Ok(ActionRequest::new(self.owner, target, ability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ability::tests::{create_test_item, create_test_skill};
    use crate::action::AbilityId;
    use crate::participant::tests::create_test_template;
    use crate::participant::{ParticipantKind, Side};
    use crate::store::{Inventory, ItemId};

    const POTION: ItemId = ItemId(1);

    struct Fixture {
        roster: Roster,
        catalog: AbilityCatalog,
        store: Inventory,
        heroes: Vec<ParticipantId>,
        foes: Vec<ParticipantId>,
    }

    impl Fixture {
        fn ctx(&mut self) -> CommandContext<'_> {
            CommandContext {
                roster: &self.roster,
                catalog: &self.catalog,
                store: &mut self.store,
            }
        }
    }

    fn create_test_fixture() -> Fixture {
        let catalog: AbilityCatalog = [
            create_test_skill(1, 0, TargetType::FoePoint),
            create_test_skill(2, 5, TargetType::Foe),
            create_test_item(10, POTION),
        ]
        .into_iter()
        .collect();

        let mut roster = Roster::new();
        let foes = (0..2)
            .map(|i| roster.add(create_test_template(&format!("foe{i}"), true, 10)).unwrap())
            .collect();
        let heroes = (0..2)
            .map(|i| {
                let mut template = create_test_template(&format!("hero{i}"), false, 10);
                template.sp = 3;
                template.kind = ParticipantKind::Player {
                    skills: vec![AbilityId(1), AbilityId(2)],
                };
                roster.add(template).unwrap()
            })
            .collect();

        Fixture {
            roster,
            catalog,
            store: Inventory::new().with_item(POTION, 1),
            heroes,
            foes,
        }
    }

    /// Store with one resource pool shared by the whole party.
    struct PooledStore {
        points: u32,
        items: Inventory,
    }

    impl PartyStore for PooledStore {
        fn get_resource_points(&self, _: &crate::participant::Participant) -> u32 {
            self.points
        }

        fn item_true_count(&self, item: ItemId) -> u32 {
            self.items.item_true_count(item)
        }

        fn item_available_count(&self, item: ItemId) -> u32 {
            self.items.item_available_count(item)
        }

        fn reserve_item(&mut self, item: ItemId) -> Result<(), BattleError> {
            self.items.reserve_item(item)
        }

        fn release_item(&mut self, item: ItemId) {
            self.items.release_item(item);
        }

        fn consume_item(&mut self, item: ItemId) -> Result<(), BattleError> {
            self.items.consume_item(item)
        }

        fn grant_loot(&mut self, loot: &crate::store::Loot) {
            self.items.grant_loot(loot);
        }
    }

    fn open_category(session: &mut CommandSession, ctx: &mut CommandContext<'_>, category: CommandCategory) {
        session.begin();
        while session.cursor() != category.index() {
            session.move_cursor(ctx, Direction::Forward);
        }
        session.confirm(ctx).unwrap();
        assert_eq!(session.phase(), CommandPhase::AbilityList);
    }

    #[test]
    fn affordability_is_read_from_the_store() {
        let f = create_test_fixture();
        let mut store = PooledStore {
            points: 5,
            items: Inventory::new(),
        };
        let mut ctx = CommandContext {
            roster: &f.roster,
            catalog: &f.catalog,
            store: &mut store,
        };
        let mut session = CommandSession::new(f.heroes[0]);
        open_category(&mut session, &mut ctx, CommandCategory::Attack);

        let options = session.list(&ctx);
        assert!(options.iter().all(|o| o.enabled));
    }

    #[test]
    fn expensive_skill_is_shown_disabled() {
        let mut f = create_test_fixture();
        let mut session = CommandSession::new(f.heroes[0]);
        let mut ctx = f.ctx();
        open_category(&mut session, &mut ctx, CommandCategory::Attack);

        let options = session.list(&ctx);
        assert_eq!(options.len(), 2);
        assert!(options[0].enabled);
        assert!(!options[1].enabled);

        session.move_cursor(&ctx, Direction::Forward);
        assert_eq!(
            session.confirm(&mut ctx),
            Err(BattleError::InsufficientResource {
                required: 5,
                available: 3
            })
        );
        assert_eq!(session.phase(), CommandPhase::AbilityList);
    }

    #[test]
    fn full_walk_submits_request() {
        let mut f = create_test_fixture();
        let hero = f.heroes[0];
        let foe = f.foes[0];
        let mut session = CommandSession::new(hero);
        let mut ctx = f.ctx();
        open_category(&mut session, &mut ctx, CommandCategory::Attack);

        session.confirm(&mut ctx).unwrap();
        assert_eq!(session.phase(), CommandPhase::Target);
        assert_eq!(
            session.target(),
            Some(&TargetDescriptor::AttackPoint { actor: foe, point: 0 })
        );

        let CommandOutcome::Submitted(request) = session.confirm(&mut ctx).unwrap() else {
            panic!("expected a submitted request");
        };
        assert_eq!(request.source(), hero);
        assert_eq!(request.ability().id, AbilityId(1));
        assert!(request.is_pending());

        // Transient state is cleared; memory is kept.
        assert_eq!(session.phase(), CommandPhase::Category);
        assert!(session.selected().is_none());
        assert_eq!(session.category(), CommandCategory::Attack);
        assert_eq!(session.last_target(), Some(request.target()));
    }

    #[test]
    fn last_target_is_reused() {
        let mut f = create_test_fixture();
        let second = f.foes[1];
        let mut session = CommandSession::new(f.heroes[0]);
        let mut ctx = f.ctx();
        open_category(&mut session, &mut ctx, CommandCategory::Attack);
        session.confirm(&mut ctx).unwrap();
        session.handle_input(&mut ctx, InputState::DOWN).unwrap();
        session.confirm(&mut ctx).unwrap();

        session.begin();
        session.confirm(&mut ctx).unwrap();
        session.confirm(&mut ctx).unwrap();
        assert_eq!(session.target().and_then(|t| t.actor()), Some(second));
    }

    #[test]
    fn item_reservation_is_shared_between_sessions() {
        let mut f = create_test_fixture();
        let mut first = CommandSession::new(f.heroes[0]);
        let mut second = CommandSession::new(f.heroes[1]);
        let mut ctx = f.ctx();

        open_category(&mut first, &mut ctx, CommandCategory::Item);
        first.confirm(&mut ctx).unwrap();
        let CommandOutcome::Submitted(mut request) = first.confirm(&mut ctx).unwrap() else {
            panic!("expected a submitted request");
        };
        assert_eq!(ctx.store.item_available_count(POTION), 0);
        assert_eq!(ctx.store.item_true_count(POTION), 1);

        open_category(&mut second, &mut ctx, CommandCategory::Item);
        let options = second.list(&ctx);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].available, Some(0));
        assert!(!options[0].enabled);
        assert!(second.confirm(&mut ctx).is_err());
        assert_eq!(second.phase(), CommandPhase::AbilityList);

        assert!(request.discard(ctx.store));
        assert_eq!(ctx.store.item_available_count(POTION), 1);
        assert_eq!(ctx.store.item_true_count(POTION), 1);
        assert!(second.list(&ctx)[0].enabled);
    }

    #[test]
    fn cancel_steps_back_and_withdraws() {
        let mut f = create_test_fixture();
        let mut session = CommandSession::new(f.heroes[0]);
        let mut ctx = f.ctx();
        open_category(&mut session, &mut ctx, CommandCategory::Attack);

        session.handle_input(&mut ctx, InputState::RIGHT).unwrap();
        assert_eq!(session.phase(), CommandPhase::Info);
        session.handle_input(&mut ctx, InputState::LEFT).unwrap();
        assert_eq!(session.phase(), CommandPhase::AbilityList);

        session.confirm(&mut ctx).unwrap();
        assert_eq!(session.cancel(), CommandOutcome::Pending);
        assert_eq!(session.phase(), CommandPhase::AbilityList);
        assert!(session.target().is_none());
        assert_eq!(session.cancel(), CommandOutcome::Pending);
        assert_eq!(session.phase(), CommandPhase::Category);
        assert_eq!(session.cancel(), CommandOutcome::Withdrawn);
    }

    #[test]
    fn category_cursor_wraps() {
        let mut f = create_test_fixture();
        let mut session = CommandSession::new(f.heroes[0]);
        let ctx = f.ctx();
        session.move_cursor(&ctx, Direction::Backward);
        assert_eq!(session.cursor(), CommandCategory::Item.index());
        session.move_cursor(&ctx, Direction::Forward);
        assert_eq!(session.cursor(), CommandCategory::Attack.index());
    }

    #[test]
    fn dead_target_is_re_resolved_or_dropped() {
        let mut f = create_test_fixture();
        let (first, second) = (f.foes[0], f.foes[1]);
        let mut session = CommandSession::new(f.heroes[0]);
        {
            let mut ctx = f.ctx();
            open_category(&mut session, &mut ctx, CommandCategory::Attack);
            session.confirm(&mut ctx).unwrap();
        }

        f.roster.get_mut(first).unwrap().take_damage(u32::MAX);
        session.refresh_target(&f.roster).unwrap();
        assert_eq!(session.target().and_then(|t| t.actor()), Some(second));

        f.roster.get_mut(second).unwrap().take_damage(u32::MAX);
        assert_eq!(f.roster.living_count(Side::Hostile), 0);
        assert_eq!(session.refresh_target(&f.roster), Err(BattleError::NoValidTarget));
        assert_eq!(session.phase(), CommandPhase::AbilityList);
    }
}
