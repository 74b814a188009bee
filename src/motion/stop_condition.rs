//! Move stop conditions.

use bitflags::bitflags;

use crate::error::MotionError;

bitflags! {
    /// Events that may end a move before its duration runs out.
    ///
    /// Bit values match the bus protocol so the raw byte of a received
    /// command converts directly through [`TryFrom<u8>`].
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StopCondition: u8 {
        /// Stop when the limit switch asserts and define that point as home.
        const LIMIT_SWITCH                  = 0x01;
        /// Stop when the sync line asserts.
        const SYNC_LINE                     = 0x02;
        /// With `SYNC_LINE`: report the sync event but run to completion.
        const ENCODER_POSITION_OR_SAFE_STOP = 0x04;
        /// A stall is the expected end of this move.
        const STALL                         = 0x10;
        /// Report a stall once but keep moving.
        const IGNORE_STALLS                 = 0x20;
        /// Stop when the limit switch releases.
        const LIMIT_SWITCH_BACKOFF          = 0x40;
    }
}

impl StopCondition {
    /// Plain move.
    pub const NONE: Self = Self::empty();

    /// Check that the combination is meaningful.
    ///
    /// A move cannot both stop on the limit switch asserting and on it
    /// releasing, and a safe stop cannot be combined with ignoring stalls
    /// since both would let a faulted move run on.
    pub fn validate(self) -> Result<Self, MotionError> {
        let conflicts = [
            Self::LIMIT_SWITCH | Self::LIMIT_SWITCH_BACKOFF,
            Self::ENCODER_POSITION_OR_SAFE_STOP | Self::IGNORE_STALLS,
        ];
        if conflicts.iter().any(|pair| self.contains(*pair)) {
            return Err(MotionError::ConflictingStopConditions { bits: self.bits() });
        }
        Ok(self)
    }

    /// Stops on limit switch assertion (homing).
    #[inline]
    pub fn wants_limit_switch(self) -> bool {
        self.contains(Self::LIMIT_SWITCH)
    }

    /// Stops on limit switch release (backoff).
    #[inline]
    pub fn wants_limit_switch_backoff(self) -> bool {
        self.contains(Self::LIMIT_SWITCH_BACKOFF)
    }

    /// Reacts to the sync line.
    #[inline]
    pub fn wants_sync_line(self) -> bool {
        self.contains(Self::SYNC_LINE)
    }

    /// A sync event is reported without truncating the move.
    #[inline]
    pub fn wants_safe_stop(self) -> bool {
        self.contains(Self::ENCODER_POSITION_OR_SAFE_STOP)
    }

    /// A stall ends the move cleanly.
    #[inline]
    pub fn expects_stall(self) -> bool {
        self.contains(Self::STALL)
    }

    /// A stall is only reported.
    #[inline]
    pub fn ignores_stalls(self) -> bool {
        self.contains(Self::IGNORE_STALLS)
    }

    /// Homing and backoff moves run against the limit switch and never
    /// react to stalls.
    #[inline]
    pub fn is_limit_switch_move(self) -> bool {
        self.intersects(Self::LIMIT_SWITCH | Self::LIMIT_SWITCH_BACKOFF)
    }
}

impl TryFrom<u8> for StopCondition {
    type Error = MotionError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_bits(raw)
            .ok_or(MotionError::UnknownStopCondition(raw & !Self::all().bits()))?
            .validate()
    }
}

impl From<StopCondition> for u8 {
    fn from(condition: StopCondition) -> u8 {
        condition.bits()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StopCondition {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StopCondition({=u8:#x})", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        let raw = 0x01 | 0x02 | 0x04 | 0x10 | 0x40;
        assert!(StopCondition::from_bits(raw).is_some());
        assert_eq!(StopCondition::IGNORE_STALLS.bits(), 0x20);
    }

    #[test]
    fn test_unknown_bits_rejected() {
        assert_eq!(
            StopCondition::try_from(0x08),
            Err(MotionError::UnknownStopCondition(0x08))
        );
        assert_eq!(
            StopCondition::try_from(0x81),
            Err(MotionError::UnknownStopCondition(0x80))
        );
    }

    #[test]
    fn test_conflicting_combinations_rejected() {
        assert_eq!(
            StopCondition::try_from(0x41),
            Err(MotionError::ConflictingStopConditions { bits: 0x41 })
        );
        assert!(StopCondition::try_from(0x24).is_err());
        assert!(StopCondition::try_from(0x26).is_err());
    }

    #[test]
    fn test_predicates() {
        let safe_sync = StopCondition::try_from(0x06).unwrap();
        assert!(safe_sync.wants_sync_line());
        assert!(safe_sync.wants_safe_stop());
        assert!(!safe_sync.is_limit_switch_move());

        let stall = StopCondition::STALL | StopCondition::IGNORE_STALLS;
        assert!(stall.validate().is_ok());
        assert!(stall.expects_stall() && stall.ignores_stalls());

        assert!(StopCondition::LIMIT_SWITCH_BACKOFF.is_limit_switch_move());
        assert_eq!(StopCondition::try_from(0), Ok(StopCondition::NONE));
    }
}
