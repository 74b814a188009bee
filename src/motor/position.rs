//! Position confidence tracking.

use bitflags::bitflags;

bitflags! {
    /// Confidence in the absolute position of an axis.
    ///
    /// Persists across moves. Cleared when a stall shows the stepper and
    /// encoder disagree, re-established by homing, backoff or a resync.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PositionFlags: u8 {
        /// The step count matches the physical position.
        const STEPPER_POSITION_OK = 0x01;
        /// The encoder count matches the physical position.
        const ENCODER_POSITION_OK = 0x02;
    }
}

impl PositionFlags {
    /// Step count is trusted.
    #[inline]
    pub fn stepper_ok(self) -> bool {
        self.contains(Self::STEPPER_POSITION_OK)
    }

    /// Encoder count is trusted.
    #[inline]
    pub fn encoder_ok(self) -> bool {
        self.contains(Self::ENCODER_POSITION_OK)
    }
}

impl From<PositionFlags> for u8 {
    fn from(flags: PositionFlags) -> u8 {
        flags.bits()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PositionFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PositionFlags({=u8:#x})", self.bits())
    }
}
