//! The motor interrupt handler.
//!
//! One handler exists per axis. [`MotorInterruptHandler::run_interrupt`] is
//! called from the step timer interrupt; it integrates the active move,
//! decides whether to pulse the step line, evaluates stop conditions and
//! reports every terminal event on the status channel. It never blocks and
//! never returns an error: faults become [`ErrorMessage`]s.

use crate::messages::{
    AckMessageId, ErrorCode, ErrorMessage, ErrorSeverity, Move, MoveStatus,
    UpdatePositionRequest, UpdatePositionResponse,
};
use crate::motion::{Direction, FixedPosition, MoveExecutor, StallCheck};
use crate::queue::{IsrReceiver, IsrSender};

use super::hardware::MotorHardware;
use super::position::PositionFlags;
use super::state::HandlerState;

/// Interrupt-driven executor of queued moves.
///
/// Generic over:
/// - `MQ`: inbound move queue
/// - `UQ`: inbound position-resync request queue
/// - `SC`: outbound status channel
/// - `HW`: motor hardware
pub struct MotorInterruptHandler<MQ, UQ, SC, HW>
where
    MQ: IsrReceiver<Move>,
    UQ: IsrReceiver<UpdatePositionRequest>,
    SC: IsrSender<MoveStatus>,
    HW: MotorHardware,
{
    move_queue: MQ,
    update_position_queue: UQ,
    status_queue: SC,
    hardware: HW,
    stall_checker: StallCheck,

    /// The active move, if any.
    executor: Option<MoveExecutor>,

    /// Absolute position with sub-step precision.
    position: FixedPosition,

    position_flags: PositionFlags,

    /// Direction last written to the direction line.
    direction: Option<Direction>,

    in_estop: bool,

    /// Discard one queued move per tick until the queue is empty.
    clear_queue_until_empty: bool,
}

impl<MQ, UQ, SC, HW> MotorInterruptHandler<MQ, UQ, SC, HW>
where
    MQ: IsrReceiver<Move>,
    UQ: IsrReceiver<UpdatePositionRequest>,
    SC: IsrSender<MoveStatus>,
    HW: MotorHardware,
{
    /// Create a handler. The step line is lowered immediately.
    pub fn new(
        move_queue: MQ,
        update_position_queue: UQ,
        status_queue: SC,
        mut hardware: HW,
        stall_checker: StallCheck,
    ) -> Self {
        hardware.unstep();
        Self {
            move_queue,
            update_position_queue,
            status_queue,
            hardware,
            stall_checker,
            executor: None,
            position: FixedPosition::ZERO,
            position_flags: PositionFlags::empty(),
            direction: None,
            in_estop: false,
            clear_queue_until_empty: false,
        }
    }

    /// Run one tick. Call from the step timer interrupt.
    ///
    /// Precedence: pending queue drain, estop, cancel request, then normal
    /// motion.
    pub fn run_interrupt(&mut self) {
        if self.clear_queue_until_empty {
            self.clear_queue_until_empty = self.pop_and_discard_move();
        } else if self.in_estop {
            self.handle_update_position_queue();
            self.in_estop = self.estop_update();
        } else if self.hardware.check_estop_in() {
            warn!("estop asserted");
            self.cancel_and_clear_moves(ErrorCode::EstopDetected, ErrorSeverity::Unrecoverable);
            self.in_estop = true;
        } else if let Some(request) = self.hardware.has_cancel_request() {
            info!("cancel requested");
            self.cancel_and_clear_moves(request.code, request.severity);
            self.hardware.clear_cancel_request();
        } else {
            self.run_normal_interrupt();
        }
    }

    /// Advance the active move and pulse the step line when it crossed a
    /// step. Steps feed the stall checker.
    pub fn run_normal_interrupt(&mut self) {
        if !self.pulse() {
            return;
        }
        self.hardware.step();
        if let Some(direction) = self.direction {
            if self.stall_checker.step_itr(direction) && self.stall_detected() {
                self.position_flags.remove(PositionFlags::STEPPER_POSITION_OK);
                self.handle_stall_during_movement();
            }
        }
        self.hardware.unstep();
    }

    /// Decide whether the step line should pulse this tick.
    ///
    /// Loads a move when idle (without integrating in that tick), checks
    /// stop conditions, integrates, and hands over to the next queued move
    /// without a gap once the active one is exhausted. Resync requests are
    /// served while idle and refused while moving.
    pub fn pulse(&mut self) -> bool {
        if self.executor.is_none() {
            if self.has_move_messages() {
                self.update_move();
                self.handle_update_position_queue_error();
            } else if self.update_position_queue.has_message_isr() {
                self.handle_update_position_queue();
            }
            return false;
        }

        self.handle_update_position_queue_error();
        if self.stop_condition_met() {
            return false;
        }
        if !self.can_step() {
            self.finish_current_move(AckMessageId::CompleteWithoutCondition);
            if !self.has_move_messages() {
                return false;
            }
            self.update_move();
        }
        self.can_step() && self.tick()
    }

    /// Integrate one tick of the active move.
    ///
    /// Returns `true` if a whole step was crossed. An overflow retires the
    /// move with an error report.
    pub fn tick(&mut self) -> bool {
        let Some(executor) = self.executor.as_mut() else {
            return false;
        };
        match executor.tick(&mut self.position) {
            Ok(stepped) => {
                self.update_direction();
                stepped
            }
            Err(_) => {
                self.handle_overflow();
                false
            }
        }
    }

    /// True while a move occupies the active slot.
    #[inline]
    pub fn has_active_move(&self) -> bool {
        self.executor.is_some()
    }

    /// True if a move is waiting in the queue.
    #[inline]
    pub fn has_move_messages(&self) -> bool {
        self.move_queue.has_message_isr()
    }

    /// True while the active move still has ticks left.
    #[inline]
    pub fn can_step(&self) -> bool {
        self.executor.as_ref().is_some_and(|e| e.can_step())
    }

    /// Load the next queued move into the active slot.
    ///
    /// Captures the encoder baseline and sets the direction line. A homing
    /// move on an axis without a trusted position starts from the top of
    /// the range so it can run its full length.
    pub fn update_move(&mut self) {
        let Some(command) = self.move_queue.try_read_isr() else {
            return;
        };
        self.hardware.enable_encoder();
        let baseline = self.hardware.get_encoder_pulses();
        if command.stop_condition().wants_limit_switch() && !self.position_flags.stepper_ok() {
            self.position = FixedPosition::MAX;
        }
        debug!("move {=u32} loaded", command.message_index());
        self.executor = Some(MoveExecutor::new(command, baseline));
        self.update_direction();
    }

    /// Evaluate the stop conditions of the active move.
    ///
    /// Returns `true` if the move was finished by one of them.
    pub fn stop_condition_met(&mut self) -> bool {
        let Some(condition) = self.executor.as_ref().map(|e| e.command().stop_condition()) else {
            return false;
        };
        if condition.wants_limit_switch() && self.homing_stopped() {
            return true;
        }
        if condition.wants_limit_switch_backoff() && self.backed_off() {
            return true;
        }
        if condition.wants_sync_line() && self.sync_triggered(condition.wants_safe_stop()) {
            return true;
        }
        false
    }

    /// Finish a homing move once the limit switch asserts.
    ///
    /// The position becomes zero. The ack carries the flags seen before
    /// the reset. Afterwards the stepper position is trusted and encoder
    /// trust is kept as it was.
    pub fn homing_stopped(&mut self) -> bool {
        if !self.hardware.check_limit_switch() {
            return false;
        }
        let observed = self.position_flags;
        self.position_flags = PositionFlags::empty();
        self.position = FixedPosition::ZERO;
        self.stall_checker.reset_itr_counts(0);
        self.finish_with_flags(AckMessageId::StoppedByCondition, observed);
        self.position_flags = observed | PositionFlags::STEPPER_POSITION_OK;
        true
    }

    /// Finish a backoff move once the limit switch releases.
    ///
    /// Zeroes position and encoder, trusts both again and reports the
    /// encoder distance covered as the start encoder position.
    pub fn backed_off(&mut self) -> bool {
        if self.hardware.check_limit_switch() {
            return false;
        }
        self.position = FixedPosition::ZERO;
        let encoder = self.hardware.get_encoder_pulses();
        if let Some(executor) = self.executor.as_mut() {
            let travelled = executor.start_encoder_position().wrapping_sub(encoder);
            executor.set_start_encoder_position(travelled);
        }
        self.hardware.reset_encoder_pulses();
        self.hardware.disable_encoder();

        self.stall_checker.reset_itr_counts(0);
        self.position_flags.insert(PositionFlags::STEPPER_POSITION_OK);
        if self.stall_checker.has_encoder() {
            self.position_flags.insert(PositionFlags::ENCODER_POSITION_OK);
        }
        self.finish_current_move(AckMessageId::StoppedByCondition);
        true
    }

    /// React to the sync line.
    ///
    /// With `safe_stop` the first assertion is reported as
    /// `condition_met` and the move keeps running; returns `false`.
    pub fn sync_triggered(&mut self, safe_stop: bool) -> bool {
        if !self.hardware.check_sync_in() {
            return false;
        }
        if safe_stop {
            let first = self.executor.as_mut().is_some_and(|e| e.mark_condition_met());
            if first {
                self.report_ack(AckMessageId::ConditionMet, self.position_flags);
            }
            return false;
        }
        self.finish_current_move(AckMessageId::StoppedByCondition);
        true
    }

    /// Compare the encoder against the commanded position.
    pub fn stall_detected(&mut self) -> bool {
        let encoder = self.hardware.get_encoder_pulses();
        !self.stall_checker.check_stall_itr(encoder)
    }

    /// Apply the active move's stall policy.
    ///
    /// Homing and backoff moves ignore stalls. An expected stall stops the
    /// move and drains the queue. An ignored one is reported once as a
    /// warning. Otherwise the move is reported and stopped, and queued moves
    /// still run.
    pub fn handle_stall_during_movement(&mut self) {
        let Some(executor) = self.executor.as_mut() else {
            return;
        };
        let condition = executor.command().stop_condition();
        let message_index = executor.command().message_index();
        if condition.is_limit_switch_move() {
            return;
        }

        if condition.expects_stall() {
            debug!("move {=u32} stopped on stall", message_index);
            self.finish_current_move(AckMessageId::StoppedByCondition);
            self.clear_queue_until_empty = true;
        } else if condition.ignores_stalls() {
            if executor.mark_stall_handled() {
                warn!("stall ignored during move {=u32}", message_index);
                self.send_status(
                    ErrorMessage::new(message_index, ErrorSeverity::Warning, ErrorCode::CollisionDetected)
                        .into(),
                );
            }
        } else {
            warn!("stall during move {=u32}", message_index);
            self.send_status(
                ErrorMessage::new(message_index, ErrorSeverity::Recoverable, ErrorCode::CollisionDetected)
                    .into(),
            );
            self.finish_current_move(AckMessageId::StoppedByCondition);
        }
    }

    /// Steady-state estop handling.
    ///
    /// Reports the release and returns `false` once the line deasserts.
    /// While it stays asserted, every move that arrives is refused with its
    /// own error, one move per tick. A host that keeps queueing during an
    /// estop gets one report per move, so each refusal can be correlated by
    /// `message_index` at the cost of more status traffic.
    pub fn estop_update(&mut self) -> bool {
        if !self.hardware.check_estop_in() {
            info!("estop released");
            self.send_status(
                ErrorMessage::new(0, ErrorSeverity::Warning, ErrorCode::EstopReleased).into(),
            );
            return false;
        }
        if let Some(command) = self.move_queue.try_read_isr() {
            self.send_status(
                ErrorMessage::new(
                    command.message_index(),
                    ErrorSeverity::Unrecoverable,
                    ErrorCode::EstopDetected,
                )
                .into(),
            );
        }
        true
    }

    /// Abandon the active move and everything queued behind it.
    ///
    /// Sends one error carrying the active move's index (0 when idle). No
    /// acks are produced.
    pub fn cancel_and_clear_moves(&mut self, code: ErrorCode, severity: ErrorSeverity) {
        let message_index = self
            .executor
            .take()
            .map(|e| e.command().message_index())
            .unwrap_or(0);
        self.send_status(ErrorMessage::new(message_index, severity, code).into());
        self.clear_queue_until_empty = true;
    }

    /// Retire the active move, acking it with the current flags.
    pub fn finish_current_move(&mut self, ack_id: AckMessageId) {
        self.finish_with_flags(ack_id, self.position_flags);
    }

    /// Serve one pending resync request.
    ///
    /// The position is only rewritten from the encoder when idle and the
    /// encoder is trusted; a response is sent either way.
    pub fn handle_update_position_queue(&mut self) {
        let Some(request) = self.update_position_queue.try_read_isr() else {
            return;
        };
        let mut encoder_pulses = self.hardware.get_encoder_pulses();
        if self.executor.is_none() && self.position_flags.encoder_ok() {
            encoder_pulses = self.address_negative_encoder();
            let steps = self
                .stall_checker
                .encoder_ticks_to_stepper_ticks(encoder_pulses as u32);
            self.position = FixedPosition::from_steps(steps);
            self.stall_checker.reset_itr_counts(steps as i32);
            self.position_flags.insert(PositionFlags::STEPPER_POSITION_OK);
            debug!("position resynced to {=u32} steps", steps);
        }
        let response = UpdatePositionResponse {
            message_index: request.message_index,
            stepper_position_counts: self.position.steps(),
            encoder_pulses,
            position_flags: self.position_flags,
        };
        self.send_status(response.into());
    }

    /// Refuse a resync request that arrives while a move is running.
    pub fn handle_update_position_queue_error(&mut self) {
        if let Some(request) = self.update_position_queue.try_read_isr() {
            self.send_status(
                ErrorMessage::new(request.message_index, ErrorSeverity::Warning, ErrorCode::MotorBusy)
                    .into(),
            );
        }
    }

    /// Clamp a negative encoder reading to zero, in hardware as well.
    pub fn address_negative_encoder(&mut self) -> i32 {
        let pulses = self.hardware.get_encoder_pulses();
        if pulses < 0 {
            self.hardware.reset_encoder_pulses();
            return 0;
        }
        pulses
    }

    /// Drop all queued work and return to home. Task context only.
    pub fn reset(&mut self) {
        while self.move_queue.try_read_isr().is_some() {}
        while self.update_position_queue.try_read_isr().is_some() {}
        self.position = FixedPosition::ZERO;
        self.executor = None;
        self.clear_queue_until_empty = false;
        self.hardware.reset_encoder_pulses();
        self.stall_checker.reset_itr_counts(0);
    }

    /// Energise the motor.
    pub fn start(&mut self) {
        self.hardware.activate_motor();
    }

    /// De-energise the motor.
    pub fn stop(&mut self) {
        self.hardware.deactivate_motor();
    }

    /// What the next tick will do.
    pub fn state(&self) -> HandlerState {
        if self.clear_queue_until_empty {
            HandlerState::Draining
        } else if self.in_estop {
            HandlerState::Estop
        } else if self.executor.is_some() {
            HandlerState::Moving
        } else {
            HandlerState::Idle
        }
    }

    /// Absolute position with sub-step precision.
    #[inline]
    pub fn current_position(&self) -> FixedPosition {
        self.position
    }

    /// Overwrite the position.
    #[inline]
    pub fn set_current_position(&mut self, position: FixedPosition) {
        self.position = position;
    }

    /// The active move, if any.
    #[inline]
    pub fn active_move(&self) -> Option<&MoveExecutor> {
        self.executor.as_ref()
    }

    /// Position confidence.
    #[inline]
    pub fn position_flags(&self) -> PositionFlags {
        self.position_flags
    }

    /// Overwrite the position confidence.
    #[inline]
    pub fn set_position_flags(&mut self, flags: PositionFlags) {
        self.position_flags = flags;
    }

    /// True while the estop is being handled.
    #[inline]
    pub fn in_estop(&self) -> bool {
        self.in_estop
    }

    /// The stall checker.
    #[inline]
    pub fn stall_checker(&self) -> &StallCheck {
        &self.stall_checker
    }

    /// The hardware.
    #[inline]
    pub fn hardware(&self) -> &HW {
        &self.hardware
    }

    /// The hardware, mutably.
    #[inline]
    pub fn hardware_mut(&mut self) -> &mut HW {
        &mut self.hardware
    }

    fn pop_and_discard_move(&mut self) -> bool {
        let _ = self.move_queue.try_read_isr();
        self.has_move_messages()
    }

    fn update_direction(&mut self) {
        let Some(direction) = self.executor.as_ref().map(|e| e.direction()) else {
            return;
        };
        if self.direction != Some(direction) {
            self.hardware.set_direction(direction.is_positive());
            self.direction = Some(direction);
        }
    }

    fn handle_overflow(&mut self) {
        let message_index = self
            .executor
            .as_ref()
            .map(|e| e.command().message_index())
            .unwrap_or(0);
        error!("position overflow during move {=u32}", message_index);
        self.send_status(
            ErrorMessage::new(message_index, ErrorSeverity::Unrecoverable, ErrorCode::Hardware).into(),
        );
        self.finish_current_move(AckMessageId::PositionError);
    }

    fn finish_with_flags(&mut self, ack_id: AckMessageId, flags: PositionFlags) {
        self.report_ack(ack_id, flags);
        self.executor = None;
    }

    fn report_ack(&mut self, ack_id: AckMessageId, flags: PositionFlags) {
        let encoder = self.hardware.get_encoder_pulses();
        let steps = self.position.steps();
        let ack = match &self.executor {
            Some(executor) if executor.command().is_reportable() => {
                executor.build_ack(steps, encoder, flags, ack_id)
            }
            _ => return,
        };
        self.send_status(ack.into());
    }

    fn send_status(&mut self, status: MoveStatus) {
        if self.status_queue.try_write_isr(status).is_err() {
            warn!("status channel full, report dropped");
        }
    }
}
