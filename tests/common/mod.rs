//! Shared test harness: simulated motor hardware plus `heapless::spsc`
//! queues wired to a [`MotorInterruptHandler`].

#![allow(dead_code)]

use heapless::spsc::{Consumer, Producer, Queue};

use motor_control::{
    Ack, CancelRequest, ErrorMessage, ErrorSeverity, Micrometers, MotorHardware,
    MotorInterruptHandler, Move, MoveStatus, StallCheck, StepsPerTick, StepsPerTickSq,
    StopCondition, TaskReceiver, TaskSender, TicksPerMicrometer, UpdatePositionRequest,
    UpdatePositionResponse,
};

pub const MOVE_DEPTH: usize = 16;
pub const RESYNC_DEPTH: usize = 4;
pub const STATUS_DEPTH: usize = 64;

/// Simulated axis.
#[derive(Debug, Default)]
pub struct MockHardware {
    pub limit_switch: bool,
    pub estop: bool,
    pub sync: bool,
    pub encoder: i32,
    /// Advance the encoder by one count per step, like a 1:1 axis that
    /// never slips.
    pub encoder_follows_steps: bool,
    pub encoder_enabled: bool,
    pub cancel: Option<CancelRequest>,

    pub step_high: bool,
    pub step_count: u32,
    /// Net steps taken, signed by the direction line.
    pub net_steps: i64,
    pub forward: Option<bool>,
    pub direction_writes: u32,
    pub active: bool,
}

impl MotorHardware for MockHardware {
    fn step(&mut self) {
        self.step_high = true;
        self.step_count += 1;
        let delta = if self.forward == Some(true) { 1 } else { -1 };
        self.net_steps += delta;
        if self.encoder_follows_steps {
            self.encoder += delta as i32;
        }
    }

    fn unstep(&mut self) {
        self.step_high = false;
    }

    fn set_direction(&mut self, forward: bool) {
        self.forward = Some(forward);
        self.direction_writes += 1;
    }

    fn activate_motor(&mut self) {
        self.active = true;
    }

    fn deactivate_motor(&mut self) {
        self.active = false;
    }

    fn check_limit_switch(&mut self) -> bool {
        self.limit_switch
    }

    fn check_estop_in(&mut self) -> bool {
        self.estop
    }

    fn check_sync_in(&mut self) -> bool {
        self.sync
    }

    fn get_encoder_pulses(&mut self) -> i32 {
        self.encoder
    }

    fn reset_encoder_pulses(&mut self) {
        self.encoder = 0;
    }

    fn enable_encoder(&mut self) {
        self.encoder_enabled = true;
    }

    fn disable_encoder(&mut self) {
        self.encoder_enabled = false;
    }

    fn has_cancel_request(&mut self) -> Option<CancelRequest> {
        self.cancel
    }

    fn request_cancel(&mut self, severity: ErrorSeverity) {
        self.cancel = Some(CancelRequest::stop_requested(severity));
    }

    fn clear_cancel_request(&mut self) {
        self.cancel = None;
    }
}

pub type Handler = MotorInterruptHandler<
    Consumer<'static, Move, MOVE_DEPTH>,
    Consumer<'static, UpdatePositionRequest, RESYNC_DEPTH>,
    Producer<'static, MoveStatus, STATUS_DEPTH>,
    MockHardware,
>;

/// A handler plus the task-side ends of its queues.
pub struct Harness {
    pub handler: Handler,
    pub moves: Producer<'static, Move, MOVE_DEPTH>,
    pub resync: Producer<'static, UpdatePositionRequest, RESYNC_DEPTH>,
    pub status: Consumer<'static, MoveStatus, STATUS_DEPTH>,
}

impl Harness {
    pub fn new(stall: StallCheck) -> Self {
        let (moves, move_rx) = leak_queue::<Move, MOVE_DEPTH>();
        let (resync, resync_rx) = leak_queue::<UpdatePositionRequest, RESYNC_DEPTH>();
        let (status_tx, status) = leak_queue::<MoveStatus, STATUS_DEPTH>();
        let handler =
            MotorInterruptHandler::new(move_rx, resync_rx, status_tx, MockHardware::default(), stall);
        Self {
            handler,
            moves,
            resync,
            status,
        }
    }

    /// Axis without an encoder.
    pub fn without_encoder() -> Self {
        Self::new(stall_check(0.0, 1.0, 10))
    }

    /// 1:1 stepper/encoder axis with the given stall tolerance in µm.
    pub fn with_encoder(threshold_um: u32) -> Self {
        Self::new(stall_check(1.0, 1.0, threshold_um))
    }

    pub fn hw(&mut self) -> &mut MockHardware {
        self.handler.hardware_mut()
    }

    pub fn push(&mut self, command: Move) {
        self.moves.try_write(command).unwrap();
    }

    pub fn request_resync(&mut self, message_index: u32) {
        self.resync
            .try_write(UpdatePositionRequest { message_index })
            .unwrap();
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.handler.run_interrupt();
        }
    }

    /// Run until the handler has no move and nothing queued.
    pub fn run_until_idle(&mut self, limit: usize) -> usize {
        for tick in 0..limit {
            if !self.handler.has_active_move() && !self.handler.has_move_messages() {
                return tick;
            }
            self.handler.run_interrupt();
        }
        panic!("handler still busy after {limit} ticks");
    }

    pub fn drain_status(&mut self) -> Vec<MoveStatus> {
        let mut out = Vec::new();
        while let Some(status) = self.status.try_read() {
            out.push(status);
        }
        out
    }
}

pub fn leak_queue<T, const N: usize>() -> (Producer<'static, T, N>, Consumer<'static, T, N>) {
    let queue: &'static mut Queue<T, N> = Box::leak(Box::new(Queue::new()));
    queue.split()
}

pub fn stall_check(encoder: f32, stepper: f32, threshold_um: u32) -> StallCheck {
    StallCheck::new(
        TicksPerMicrometer(encoder),
        TicksPerMicrometer(stepper),
        Micrometers(threshold_um),
    )
}

/// A reportable constant-velocity move.
pub fn constant_move(index: u32, duration: u32, velocity: f32) -> Move {
    Move::builder(index)
        .duration(duration)
        .velocity(StepsPerTick::from_f32(velocity))
        .group(0, index as u8)
        .build()
        .unwrap()
}

/// A reportable move with stop conditions.
pub fn conditional_move(index: u32, duration: u32, velocity: f32, condition: StopCondition) -> Move {
    Move::builder(index)
        .duration(duration)
        .velocity(StepsPerTick::from_f32(velocity))
        .group(0, index as u8)
        .stop_on(condition)
        .build()
        .unwrap()
}

/// A reportable move starting at rest.
pub fn accelerating_move(index: u32, duration: u32, acceleration: f32) -> Move {
    Move::builder(index)
        .duration(duration)
        .acceleration(StepsPerTickSq::from_f32(acceleration))
        .group(0, index as u8)
        .build()
        .unwrap()
}

pub fn acks(statuses: &[MoveStatus]) -> Vec<Ack> {
    statuses
        .iter()
        .filter_map(|s| match s {
            MoveStatus::Ack(ack) => Some(*ack),
            _ => None,
        })
        .collect()
}

pub fn errors(statuses: &[MoveStatus]) -> Vec<ErrorMessage> {
    statuses
        .iter()
        .filter_map(|s| match s {
            MoveStatus::Error(error) => Some(*error),
            _ => None,
        })
        .collect()
}

pub fn responses(statuses: &[MoveStatus]) -> Vec<UpdatePositionResponse> {
    statuses
        .iter()
        .filter_map(|s| match s {
            MoveStatus::UpdatePosition(response) => Some(*response),
            _ => None,
        })
        .collect()
}
