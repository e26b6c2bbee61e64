use bitflags::bitflags;

bitflags! {
    /// Buttons pressed this tick, already debounced by the input collaborator.
    ///
    /// Several flags may be set at once; a command session handles `CONFIRM`
    /// first, then `CANCEL`, then directions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InputState: u8 {
        const CONFIRM = 1 << 0;
        const CANCEL  = 1 << 1;
        const UP      = 1 << 2;
        const DOWN    = 1 << 3;
        const LEFT    = 1 << 4;
        const RIGHT   = 1 << 5;
    }
}

impl InputState {
    /// Vertical direction pressed this tick, `UP` winning over `DOWN`.
    pub fn vertical(self) -> Option<crate::target::Direction> {
        if self.contains(Self::UP) {
            Some(crate::target::Direction::Backward)
        } else if self.contains(Self::DOWN) {
            Some(crate::target::Direction::Forward)
        } else {
            None
        }
    }

    /// Horizontal direction pressed this tick, `LEFT` winning over `RIGHT`.
    pub fn horizontal(self) -> Option<crate::target::Direction> {
        if self.contains(Self::LEFT) {
            Some(crate::target::Direction::Backward)
        } else if self.contains(Self::RIGHT) {
            Some(crate::target::Direction::Forward)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Direction;

    #[test]
    fn directions_resolve_with_priority() {
        assert_eq!(InputState::empty().vertical(), None);
        assert_eq!(InputState::DOWN.vertical(), Some(Direction::Forward));
        assert_eq!((InputState::UP | InputState::DOWN).vertical(), Some(Direction::Backward));
        assert_eq!(InputState::RIGHT.horizontal(), Some(Direction::Forward));
        assert_eq!((InputState::CONFIRM | InputState::LEFT).horizontal(), Some(Direction::Backward));
    }
}
