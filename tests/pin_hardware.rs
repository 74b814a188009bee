//! GPIO back-end checked against embedded-hal pin mocks.

mod common;

use core::sync::atomic::{AtomicI32, Ordering};

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};

use common::{acks, constant_move, leak_queue, stall_check};
use motor_control::error::ConfigError;
use motor_control::motor::NoEncoder;
use motor_control::{
    parse_config, AckMessageId, CancelFlag, ErrorCode, ErrorSeverity, Error, MotorHardware,
    MotorInterruptHandler, Move, MoveStatus, PinMotorHardwareBuilder, TaskReceiver, TaskSender,
    UpdatePositionRequest,
};

fn idle_pin() -> PinMock {
    PinMock::new(&[])
}

// =============================================================================
// Outputs and inputs
// =============================================================================

#[test]
fn outputs_and_inputs_map_to_pins() {
    let step = PinMock::new(&[
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    // Inverted wiring: forward drives the line low.
    let dir = PinMock::new(&[
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ]);
    let enable = PinMock::new(&[
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let limit = PinMock::new(&[PinTransaction::get(PinState::High)]);
    let sync = PinMock::new(&[PinTransaction::get(PinState::Low)]);
    let estop = PinMock::new(&[PinTransaction::get(PinState::Low)]);
    let cancel = CancelFlag::new();

    let mut hw = PinMotorHardwareBuilder::new()
        .step_pin(step)
        .dir_pin(dir)
        .enable_pin(enable)
        .limit_switch(limit)
        .sync_in(sync)
        .estop_in(estop)
        .encoder(NoEncoder)
        .cancel_flag(&cancel)
        .invert_direction(true)
        .build()
        .unwrap();

    hw.step();
    hw.unstep();
    hw.set_direction(true);
    hw.set_direction(false);
    hw.activate_motor();
    hw.deactivate_motor();
    assert!(hw.check_limit_switch());
    assert!(!hw.check_sync_in());
    assert!(!hw.check_estop_in());
    assert_eq!(hw.get_encoder_pulses(), 0);

    let (mut step, mut dir, mut enable, mut limit, mut sync, mut estop, _) = hw.release();
    step.done();
    dir.done();
    enable.done();
    limit.done();
    sync.done();
    estop.done();
}

#[test]
fn shared_encoder_counter() {
    let count = AtomicI32::new(0);
    let cancel = CancelFlag::new();
    let mut hw = PinMotorHardwareBuilder::new()
        .step_pin(idle_pin())
        .dir_pin(idle_pin())
        .enable_pin(idle_pin())
        .limit_switch(idle_pin())
        .sync_in(idle_pin())
        .estop_in(idle_pin())
        .encoder(&count)
        .cancel_flag(&cancel)
        .build()
        .unwrap();

    count.store(-17, Ordering::Relaxed);
    assert_eq!(hw.get_encoder_pulses(), -17);
    hw.reset_encoder_pulses();
    assert_eq!(count.load(Ordering::Relaxed), 0);

    let (mut step, mut dir, mut enable, mut limit, mut sync, mut estop, _) = hw.release();
    for pin in [&mut step, &mut dir, &mut enable, &mut limit, &mut sync, &mut estop] {
        pin.done();
    }
}

#[test]
fn cancel_flag_round_trip_through_hardware() {
    let cancel = CancelFlag::new();
    let mut hw = PinMotorHardwareBuilder::new()
        .step_pin(idle_pin())
        .dir_pin(idle_pin())
        .enable_pin(idle_pin())
        .limit_switch(idle_pin())
        .sync_in(idle_pin())
        .estop_in(idle_pin())
        .encoder(NoEncoder)
        .cancel_flag(&cancel)
        .build()
        .unwrap();

    assert!(hw.has_cancel_request().is_none());
    hw.request_cancel(ErrorSeverity::Recoverable);
    let request = hw.has_cancel_request().unwrap();
    assert_eq!(request.severity, ErrorSeverity::Recoverable);
    assert_eq!(request.code, ErrorCode::StopRequested);
    assert!(cancel.pending().is_some());

    hw.clear_cancel_request();
    assert!(cancel.pending().is_none());

    let (mut step, mut dir, mut enable, mut limit, mut sync, mut estop, _) = hw.release();
    for pin in [&mut step, &mut dir, &mut enable, &mut limit, &mut sync, &mut estop] {
        pin.done();
    }
}

// =============================================================================
// Builder
// =============================================================================

#[test]
fn builder_reports_first_missing_resource() {
    let result = PinMotorHardwareBuilder::<
        PinMock,
        PinMock,
        PinMock,
        PinMock,
        PinMock,
        PinMock,
        NoEncoder,
    >::new()
    .build();
    match result {
        Err(error) => assert_eq!(error, Error::Config(ConfigError::MissingResource("step_pin"))),
        Ok(_) => panic!("built without pins"),
    }

    let mut step = idle_pin();
    let result = PinMotorHardwareBuilder::<_, PinMock, PinMock, PinMock, PinMock, PinMock, NoEncoder>::new()
        .step_pin(step.clone())
        .build();
    match result {
        Err(error) => assert_eq!(error, Error::Config(ConfigError::MissingResource("dir_pin"))),
        Ok(_) => panic!("built without a direction pin"),
    }
    step.done();
}

#[test]
fn builder_takes_direction_inversion_from_config() {
    let config = parse_config(
        r#"
[motors.z]
name = "Z"
tick_per_um = 0.4
invert_direction = true
"#,
    )
    .unwrap();

    let cancel = CancelFlag::new();
    let hw = PinMotorHardwareBuilder::new()
        .from_config(&config, "z")
        .unwrap()
        .step_pin(idle_pin())
        .dir_pin(idle_pin())
        .enable_pin(idle_pin())
        .limit_switch(idle_pin())
        .sync_in(idle_pin())
        .estop_in(idle_pin())
        .encoder(NoEncoder)
        .cancel_flag(&cancel)
        .build()
        .unwrap();
    assert!(hw.invert_direction());

    let (mut step, mut dir, mut enable, mut limit, mut sync, mut estop, _) = hw.release();
    for pin in [&mut step, &mut dir, &mut enable, &mut limit, &mut sync, &mut estop] {
        pin.done();
    }

    let missing = PinMotorHardwareBuilder::<
        PinMock,
        PinMock,
        PinMock,
        PinMock,
        PinMock,
        PinMock,
        NoEncoder,
    >::new()
    .from_config(&config, "x");
    assert!(matches!(
        missing,
        Err(Error::Config(ConfigError::MotorNotFound(_)))
    ));
}

// =============================================================================
// Handler over pins
// =============================================================================

#[test]
fn handler_drives_pins_for_a_half_step_move() {
    // Lowered at construction, then one pulse.
    let mut step = PinMock::new(&[
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let mut dir = PinMock::new(&[PinTransaction::set(PinState::High)]);
    // Sampled once per tick.
    let mut estop = PinMock::new(&vec![PinTransaction::get(PinState::Low); 4]);
    let mut enable = idle_pin();
    let mut limit = idle_pin();
    let mut sync = idle_pin();

    let encoder = AtomicI32::new(0);
    let cancel = CancelFlag::new();
    let hw = PinMotorHardwareBuilder::new()
        .step_pin(step.clone())
        .dir_pin(dir.clone())
        .enable_pin(enable.clone())
        .limit_switch(limit.clone())
        .sync_in(sync.clone())
        .estop_in(estop.clone())
        .encoder(&encoder)
        .cancel_flag(&cancel)
        .build()
        .unwrap();

    let (mut moves, move_rx) = leak_queue::<Move, 4>();
    let (_resync, resync_rx) = leak_queue::<UpdatePositionRequest, 2>();
    let (status_tx, mut status) = leak_queue::<MoveStatus, 8>();
    let mut handler =
        MotorInterruptHandler::new(move_rx, resync_rx, status_tx, hw, stall_check(0.0, 1.0, 10));

    moves.try_write(constant_move(1, 2, 0.5)).unwrap();
    for _ in 0..4 {
        handler.run_interrupt();
    }

    let mut statuses = Vec::new();
    while let Some(s) = status.try_read() {
        statuses.push(s);
    }
    let acks = acks(&statuses);
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].ack_id, AckMessageId::CompleteWithoutCondition);
    assert_eq!(acks[0].current_position_steps, 1);

    step.done();
    dir.done();
    estop.done();
    enable.done();
    limit.done();
    sync.done();
}
