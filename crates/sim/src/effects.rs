//! Built-in effect routines referenced by the bundled content.
//!
//! Damage is deterministic: the source's effective attack minus half the
//! target's defense at the chosen attack point, never below 1.

use battle_core::{EffectContext, EffectError, EffectRegistry, StatKind, StatusEffectKind};

const HEAL_AMOUNT: u32 = 40;
const POTION_AMOUNT: u32 = 60;
const STUN_DURATION_MS: u32 = 1_500;

pub fn builtin_effects() -> EffectRegistry {
    EffectRegistry::new()
        .with("strike", strike)
        .with("heal", heal)
        .with("guard", guard)
        .with("stun", stun)
        .with("potion", potion)
}

fn damage_targets(ctx: &mut EffectContext<'_>, percent: u32) -> Result<u32, EffectError> {
    let targets = ctx.target_ids();
    if targets.is_empty() {
        return Err(EffectError::new("no living target"));
    }

    let attack = ctx.source().map_or(0, |p| p.effective(StatKind::Attack));
    let point = ctx.target_point();
    let mut total = 0;
    for id in targets {
        let defense = ctx.participant(id).map_or(0, |p| p.defense_at(point));
        let amount = (attack.saturating_sub(defense / 2) * percent / 100).max(1);
        total += ctx.damage(id, amount);
    }
    Ok(total)
}

fn restore_targets(ctx: &mut EffectContext<'_>, amount: u32) -> Result<(), EffectError> {
    let targets = ctx.target_ids();
    if targets.is_empty() {
        return Err(EffectError::new("no living target"));
    }
    for id in targets {
        ctx.heal(id, amount);
    }
    Ok(())
}

fn strike(ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
    let dealt = damage_targets(ctx, 100)?;
    tracing::debug!(source = %ctx.source_id(), dealt, "strike");
    Ok(())
}

fn heal(ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
    restore_targets(ctx, HEAL_AMOUNT)
}

fn potion(ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
    restore_targets(ctx, POTION_AMOUNT)
}

fn guard(ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
    let source = ctx.source_id();
    ctx.change_status(source, StatusEffectKind::Fortify, 1);
    Ok(())
}

/// Half damage plus a short stun on every target.
fn stun(ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
    damage_targets(ctx, 50)?;
    for id in ctx.target_ids() {
        ctx.change_status_for(id, StatusEffectKind::Stun, 1, STUN_DURATION_MS);
    }
    Ok(())
}
