//! Fixed-point motion quantities.
//!
//! Velocities and accelerations are signed Q0.31 (a fraction of a step per
//! tick). Positions are Q31.31 in a 64-bit word whose top bit is a guard: an
//! addition that toggles it has left the representable range.

use core::ops::Neg;

/// Number of fractional bits in every fixed-point quantity.
pub const RADIX: u32 = 31;

const ONE: f64 = (1u64 << RADIX) as f64;

/// Lowest integer bit of a Q31.31 position: toggles once per whole step.
const STEP_BIT: i64 = 1 << RADIX;

/// Guard bit of a Q31.31 position.
const GUARD_BIT: u64 = 1 << 63;

/// Signed velocity in steps per tick (Q0.31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepsPerTick(pub i32);

impl StepsPerTick {
    /// Standstill.
    pub const ZERO: Self = Self(0);

    /// Create from a raw Q0.31 value.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw Q0.31 value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Convert from a fractional step count per tick.
    ///
    /// Values outside `(-1.0, 1.0)` saturate.
    #[inline]
    pub fn from_f32(steps_per_tick: f32) -> Self {
        Self((steps_per_tick as f64 * ONE) as i32)
    }

    /// Convert to a fractional step count per tick.
    #[inline]
    pub fn to_f32(self) -> f32 {
        (self.0 as f64 / ONE) as f32
    }

    /// True when moving in the positive direction.
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Apply one tick of acceleration.
    ///
    /// Wraps on overflow; keeping the sum in range is the producer's job.
    #[inline]
    pub const fn accelerate(self, acceleration: StepsPerTickSq) -> Self {
        Self(self.0.wrapping_add(acceleration.0))
    }
}

impl Neg for StepsPerTick {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

/// Signed acceleration in steps per tick squared (Q0.31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepsPerTickSq(pub i32);

impl StepsPerTickSq {
    /// No acceleration.
    pub const ZERO: Self = Self(0);

    /// Create from a raw Q0.31 value.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw Q0.31 value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Convert from a fractional step count per tick squared.
    #[inline]
    pub fn from_f32(steps_per_tick_sq: f32) -> Self {
        Self((steps_per_tick_sq as f64 * ONE) as i32)
    }
}

impl Neg for StepsPerTickSq {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward larger positions.
    Positive,
    /// Toward home. Also used at standstill.
    Negative,
}

impl Direction {
    /// Direction commanded by a velocity.
    #[inline]
    pub fn from_velocity(velocity: StepsPerTick) -> Self {
        if velocity.is_positive() {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }

    /// True for [`Direction::Positive`].
    #[inline]
    pub fn is_positive(self) -> bool {
        self == Direction::Positive
    }
}

/// Absolute motor position in steps (Q31.31 with a guard bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedPosition(pub i64);

impl FixedPosition {
    /// Home.
    pub const ZERO: Self = Self(0);

    /// Largest value below the guard bit.
    ///
    /// Used as the starting point of a homing move when the absolute
    /// position is unknown, so the move can travel its full length downward.
    pub const MAX: Self = Self(0x7FFF_FFFF_FFFF_FFFF);

    /// Create from a raw Q31.31 value.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw Q31.31 value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Create from a whole step count.
    #[inline]
    pub const fn from_steps(steps: u32) -> Self {
        Self((steps as i64) << RADIX)
    }

    /// Convert from a fractional step count.
    #[inline]
    pub fn from_f32(steps: f32) -> Self {
        Self((steps as f64 * ONE) as i64)
    }

    /// Whole steps (the integer part).
    #[inline]
    pub const fn steps(self) -> u32 {
        (self.0 >> RADIX) as u32
    }

    /// Integrate one tick of velocity without checking the guard bit.
    #[inline]
    pub const fn advanced_by(self, velocity: StepsPerTick) -> Self {
        Self(self.0.wrapping_add(velocity.0 as i64))
    }

    /// True when moving from `current` to `future` toggled the guard bit.
    #[inline]
    pub const fn overflowed(current: Self, future: Self) -> bool {
        ((current.0 ^ future.0) as u64) & GUARD_BIT != 0
    }

    /// True when moving from `current` to `future` crossed a whole step.
    ///
    /// Exact for any Q0.31 velocity since at most one step boundary can be
    /// crossed per tick.
    #[inline]
    pub const fn stepped(current: Self, future: Self) -> bool {
        (current.0 ^ future.0) & STEP_BIT != 0
    }
}
