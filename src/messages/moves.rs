//! Inbound commands: moves and position-resync requests.

use crate::error::Result;
use crate::motion::{StepsPerTick, StepsPerTickSq, StopCondition};

/// Group id of moves that owe no completion report.
pub const NO_GROUP: u8 = 0xFF;

/// One constant-acceleration segment, consumed exactly once by the handler.
///
/// Built with [`MoveBuilder`] so the stop conditions are always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Move {
    message_index: u32,
    duration: u32,
    velocity: StepsPerTick,
    acceleration: StepsPerTickSq,
    group_id: u8,
    seq_id: u8,
    stop_condition: StopCondition,
}

impl Move {
    /// Start building a move with the given correlation id.
    #[inline]
    pub fn builder(message_index: u32) -> MoveBuilder {
        MoveBuilder::new(message_index)
    }

    /// Correlation id echoed in every report about this move.
    #[inline]
    pub fn message_index(&self) -> u32 {
        self.message_index
    }

    /// Number of ticks the move spans.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Velocity before the first tick's acceleration.
    #[inline]
    pub fn velocity(&self) -> StepsPerTick {
        self.velocity
    }

    /// Velocity change per tick.
    #[inline]
    pub fn acceleration(&self) -> StepsPerTickSq {
        self.acceleration
    }

    /// Move group.
    #[inline]
    pub fn group_id(&self) -> u8 {
        self.group_id
    }

    /// Position within the group.
    #[inline]
    pub fn seq_id(&self) -> u8 {
        self.seq_id
    }

    /// Events that may end the move early.
    #[inline]
    pub fn stop_condition(&self) -> StopCondition {
        self.stop_condition
    }

    /// True unless the move belongs to [`NO_GROUP`].
    #[inline]
    pub fn is_reportable(&self) -> bool {
        self.group_id != NO_GROUP
    }
}

/// Builder for [`Move`].
#[derive(Debug, Clone)]
pub struct MoveBuilder {
    message_index: u32,
    duration: u32,
    velocity: StepsPerTick,
    acceleration: StepsPerTickSq,
    group_id: u8,
    seq_id: u8,
    stop_condition: StopCondition,
}

impl MoveBuilder {
    /// Create a new builder for a stationary, unreported move.
    pub fn new(message_index: u32) -> Self {
        Self {
            message_index,
            duration: 0,
            velocity: StepsPerTick::ZERO,
            acceleration: StepsPerTickSq::ZERO,
            group_id: NO_GROUP,
            seq_id: 0,
            stop_condition: StopCondition::NONE,
        }
    }

    /// Set the duration in ticks.
    pub fn duration(mut self, ticks: u32) -> Self {
        self.duration = ticks;
        self
    }

    /// Set the initial velocity.
    pub fn velocity(mut self, velocity: StepsPerTick) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the acceleration.
    pub fn acceleration(mut self, acceleration: StepsPerTickSq) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Place the move in a reporting group.
    pub fn group(mut self, group_id: u8, seq_id: u8) -> Self {
        self.group_id = group_id;
        self.seq_id = seq_id;
        self
    }

    /// Add stop conditions. Repeated calls accumulate.
    pub fn stop_on(mut self, condition: StopCondition) -> Self {
        self.stop_condition |= condition;
        self
    }

    /// Build the move.
    ///
    /// # Errors
    ///
    /// Returns an error if the accumulated stop conditions conflict.
    pub fn build(self) -> Result<Move> {
        let stop_condition = self.stop_condition.validate()?;
        Ok(Move {
            message_index: self.message_index,
            duration: self.duration,
            velocity: self.velocity,
            acceleration: self.acceleration,
            group_id: self.group_id,
            seq_id: self.seq_id,
            stop_condition,
        })
    }
}

/// Request to re-derive the stepper position from the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdatePositionRequest {
    /// Correlation id echoed in the response.
    pub message_index: u32,
}
