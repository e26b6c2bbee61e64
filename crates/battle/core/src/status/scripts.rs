use crate::error::EffectError;
use crate::participant::Participant;

use super::{Intensity, StatusEffectKind};

/// External callbacks run when a status effect is applied or removed.
///
/// Scripts run after the table has changed. Their errors are logged by the
/// caller and never roll the table change back.
pub trait StatusScripts: Send + Sync {
    /// Called when an effect is created or strengthened.
    fn on_apply(
        &self,
        _participant: &mut Participant,
        _kind: StatusEffectKind,
        _intensity: Intensity,
    ) -> Result<(), EffectError> {
        Ok(())
    }

    /// Called when an effect reaches neutral and leaves the table.
    fn on_remove(
        &self,
        _participant: &mut Participant,
        _kind: StatusEffectKind,
    ) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Scripts that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScripts;

impl StatusScripts for NoScripts {}
