//! Unit types for physical quantities.
//!
//! Keeps tick densities and distances apart at compile time so a stepper
//! ratio cannot be passed where a tolerance is expected.

use core::ops::Mul;

use serde::Deserialize;

/// Linear distance in whole micrometers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Deserialize)]
#[serde(transparent)]
pub struct Micrometers(pub u32);

impl Micrometers {
    /// Create a new Micrometers value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Tick density: stepper microsteps or encoder pulses per micrometer.
///
/// Zero is meaningful for encoders and means the axis has none.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct TicksPerMicrometer(pub f32);

impl TicksPerMicrometer {
    /// No ticks at all.
    pub const ZERO: Self = Self(0.0);

    /// Create a new TicksPerMicrometer value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// True for the zero density.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

/// Ticks spanned by a distance.
impl Mul<Micrometers> for TicksPerMicrometer {
    type Output = f64;

    fn mul(self, rhs: Micrometers) -> Self::Output {
        self.0 as f64 * rhs.0 as f64
    }
}
