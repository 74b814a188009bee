//! Move execution - per-tick fixed-point integration.

use super::fixed_point::{Direction, FixedPosition, StepsPerTick};
use crate::error::MotionError;
use crate::messages::{Ack, AckMessageId, Move};
use crate::motor::PositionFlags;

/// Runtime state of the active move.
#[derive(Debug, Clone)]
pub struct MoveExecutor {
    /// The move being executed.
    command: Move,

    /// Velocity after the last integrated tick.
    velocity: StepsPerTick,

    /// Ticks integrated so far.
    tick_count: u32,

    /// Encoder reading when the move was loaded.
    start_encoder_position: i32,

    /// A safe-stop `condition_met` report was already sent.
    condition_met_reported: bool,

    /// A stall was already handled for this move.
    stall_handled: bool,
}

impl MoveExecutor {
    /// Create a new executor for a freshly dequeued move.
    pub fn new(command: Move, start_encoder_position: i32) -> Self {
        Self {
            command,
            velocity: command.velocity(),
            tick_count: 0,
            start_encoder_position,
            condition_met_reported: false,
            stall_handled: false,
        }
    }

    /// The move being executed.
    #[inline]
    pub fn command(&self) -> &Move {
        &self.command
    }

    /// Current velocity.
    #[inline]
    pub fn velocity(&self) -> StepsPerTick {
        self.velocity
    }

    /// Direction the current velocity points in.
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_velocity(self.velocity)
    }

    /// Ticks integrated so far.
    #[inline]
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// True while the move still has ticks left.
    #[inline]
    pub fn can_step(&self) -> bool {
        self.tick_count < self.command.duration()
    }

    /// Encoder baseline reported in acks.
    #[inline]
    pub fn start_encoder_position(&self) -> i32 {
        self.start_encoder_position
    }

    /// Replace the reported encoder baseline.
    #[inline]
    pub fn set_start_encoder_position(&mut self, value: i32) {
        self.start_encoder_position = value;
    }

    /// Integrate one tick into `position`.
    ///
    /// Returns whether a whole step was crossed. On overflow the position is
    /// left untouched and the tick still counts against the duration.
    pub fn tick(&mut self, position: &mut FixedPosition) -> Result<bool, MotionError> {
        self.tick_count += 1;
        self.velocity = self.velocity.accelerate(self.command.acceleration());

        let old = *position;
        let new = old.advanced_by(self.velocity);
        if FixedPosition::overflowed(old, new) {
            return Err(MotionError::Overflow);
        }
        *position = new;
        Ok(FixedPosition::stepped(old, new))
    }

    /// Record the safe-stop report. Returns `false` if it was already sent.
    pub fn mark_condition_met(&mut self) -> bool {
        !core::mem::replace(&mut self.condition_met_reported, true)
    }

    /// Record stall handling. Returns `false` if it was already handled.
    pub fn mark_stall_handled(&mut self) -> bool {
        !core::mem::replace(&mut self.stall_handled, true)
    }

    /// Build a report for this move.
    pub fn build_ack(
        &self,
        current_position_steps: u32,
        encoder_position: i32,
        position_flags: PositionFlags,
        ack_id: AckMessageId,
    ) -> Ack {
        Ack {
            message_index: self.command.message_index(),
            group_id: self.command.group_id(),
            seq_id: self.command.seq_id(),
            current_position_steps,
            encoder_position,
            position_flags,
            ack_id,
            start_encoder_position: self.start_encoder_position,
        }
    }
}
