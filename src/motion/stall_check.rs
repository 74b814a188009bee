//! Encoder stall detection.
//!
//! The checker keeps an ideal encoder position that advances in fixed
//! chunks as the stepper moves. Every time the stepper crosses a chunk
//! boundary the caller compares the real encoder reading against the
//! ideal one; a difference larger than one chunk of encoder ticks is a
//! stall. All running counts are Q31.31 so fractional tick densities do
//! not accumulate error.

use super::fixed_point::{Direction, RADIX};
use crate::config::{Micrometers, MotorConfig, TicksPerMicrometer};

const ONE: i64 = 1 << RADIX;

fn to_fixed(value: f64) -> i64 {
    (value * ONE as f64) as i64
}

/// Stepper versus encoder cross-check for one axis.
#[derive(Debug, Clone)]
pub struct StallCheck {
    encoder_tick_per_um: f64,
    stepper_tick_per_um: f64,

    /// Stepper ticks per encoder tick (Q31.31).
    stepper_per_encoder_ratio: i64,

    /// Encoder ticks spanned by the tolerance (Q31.31).
    encoder_step_threshold: i64,
    /// Stepper ticks spanned by the tolerance (Q31.31).
    stepper_step_threshold: i64,

    encoder_ideal_counts: i64,
    stepper_counts: i64,
    next_threshold_positive: i64,
    next_threshold_negative: i64,
}

impl StallCheck {
    /// Create a checker from tick densities and a tolerance.
    ///
    /// An `encoder_tick_per_um` of zero disables the check entirely.
    pub fn new(
        encoder_tick_per_um: TicksPerMicrometer,
        stepper_tick_per_um: TicksPerMicrometer,
        threshold: Micrometers,
    ) -> Self {
        let encoder = encoder_tick_per_um.value() as f64;
        let stepper = stepper_tick_per_um.value() as f64;
        let ratio = if encoder == 0.0 { 0.0 } else { stepper / encoder };

        let mut check = Self {
            encoder_tick_per_um: encoder,
            stepper_tick_per_um: stepper,
            stepper_per_encoder_ratio: to_fixed(ratio),
            encoder_step_threshold: to_fixed(encoder_tick_per_um * threshold),
            stepper_step_threshold: to_fixed(stepper_tick_per_um * threshold),
            encoder_ideal_counts: 0,
            stepper_counts: 0,
            next_threshold_positive: 0,
            next_threshold_negative: 0,
        };
        check.reset_itr_counts(0);
        check
    }

    /// Create a checker for a configured axis.
    pub fn from_config(config: &MotorConfig) -> Self {
        Self::new(
            config.encoder_tick_per_um,
            config.tick_per_um,
            config.stall_threshold_um,
        )
    }

    /// True when the axis has an encoder to check against.
    #[inline]
    pub fn has_encoder(&self) -> bool {
        self.encoder_tick_per_um != 0.0
    }

    /// Re-baseline at an absolute stepper position.
    ///
    /// Uses floating point; call it when the position is re-established,
    /// not on every step.
    pub fn reset_itr_counts(&mut self, stepper_steps: i32) {
        self.stepper_counts = (stepper_steps as i64) << RADIX;
        self.next_threshold_positive = self.stepper_counts + self.stepper_step_threshold;
        self.next_threshold_negative = self.stepper_counts - self.stepper_step_threshold;

        self.encoder_ideal_counts = if self.stepper_tick_per_um == 0.0 {
            0
        } else {
            to_fixed(self.encoder_tick_per_um * stepper_steps as f64 / self.stepper_tick_per_um)
        };
    }

    /// Record one step.
    ///
    /// Returns `true` when the step crossed a tolerance boundary, meaning
    /// [`check_stall_itr`](Self::check_stall_itr) should be consulted.
    /// Always `false` without an encoder.
    pub fn step_itr(&mut self, direction: Direction) -> bool {
        if !self.has_encoder() {
            return false;
        }
        self.stepper_counts += direction.sign() * ONE;
        if self.stepper_counts > self.next_threshold_positive {
            self.next_threshold_positive += self.stepper_step_threshold;
            self.next_threshold_negative += self.stepper_step_threshold;
            self.encoder_ideal_counts += self.encoder_step_threshold;
            return true;
        }
        if self.stepper_counts < self.next_threshold_negative {
            self.next_threshold_positive -= self.stepper_step_threshold;
            self.next_threshold_negative -= self.stepper_step_threshold;
            self.encoder_ideal_counts -= self.encoder_step_threshold;
            return true;
        }
        false
    }

    /// Compare an encoder reading against the ideal position.
    ///
    /// Returns `true` if the position is fine and `false` on a stall.
    /// Always `true` without an encoder.
    pub fn check_stall_itr(&self, encoder_steps: i32) -> bool {
        if !self.has_encoder() {
            return true;
        }
        let diff = (self.encoder_ideal_counts - ((encoder_steps as i64) << RADIX)).abs();
        diff <= self.encoder_step_threshold
    }

    /// Convert an encoder count to the matching whole stepper count.
    pub fn encoder_ticks_to_stepper_ticks(&self, encoder_steps: u32) -> u32 {
        ((self.stepper_per_encoder_ratio as i128 * encoder_steps as i128) >> RADIX) as u32
    }
}
