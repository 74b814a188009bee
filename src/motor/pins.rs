//! GPIO back-end for [`MotorHardware`].
//!
//! Generic over embedded-hal 1.0 pin types. All inputs are active high.

use core::sync::atomic::{AtomicI32, Ordering};

use embedded_hal::digital::{InputPin, OutputPin};

use super::hardware::{CancelFlag, CancelRequest, MotorHardware};
use crate::messages::ErrorSeverity;

/// Source of encoder counts.
///
/// Usually a counter advanced by a quadrature peripheral or an encoder ISR.
pub trait EncoderCounter {
    /// Current count.
    fn pulses(&mut self) -> i32;
    /// Zero the count.
    fn reset(&mut self);
    /// Start counting.
    fn enable(&mut self) {}
    /// Stop counting.
    fn disable(&mut self) {}
}

/// Count shared with an encoder interrupt.
impl EncoderCounter for &AtomicI32 {
    fn pulses(&mut self) -> i32 {
        self.load(Ordering::Relaxed)
    }

    fn reset(&mut self) {
        self.store(0, Ordering::Relaxed);
    }
}

/// Placeholder for axes without an encoder. Always reads zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEncoder;

impl EncoderCounter for NoEncoder {
    fn pulses(&mut self) -> i32 {
        0
    }

    fn reset(&mut self) {}
}

/// Motor hardware wired to GPIO pins.
///
/// Generic over:
/// - `STEP`, `DIR`, `EN`: step, direction and driver-enable outputs
/// - `LIM`, `SYNC`, `ESTOP`: limit switch, sync line and emergency stop inputs
/// - `ENC`: encoder counter
pub struct PinMotorHardware<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIM: InputPin,
    SYNC: InputPin,
    ESTOP: InputPin,
    ENC: EncoderCounter,
{
    step_pin: STEP,
    dir_pin: DIR,
    enable_pin: EN,
    limit_switch: LIM,
    sync_in: SYNC,
    estop_in: ESTOP,
    encoder: ENC,
    cancel: &'a CancelFlag,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
}

impl<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC> PinMotorHardware<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIM: InputPin,
    SYNC: InputPin,
    ESTOP: InputPin,
    ENC: EncoderCounter,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        step_pin: STEP,
        dir_pin: DIR,
        enable_pin: EN,
        limit_switch: LIM,
        sync_in: SYNC,
        estop_in: ESTOP,
        encoder: ENC,
        cancel: &'a CancelFlag,
        invert_direction: bool,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin,
            limit_switch,
            sync_in,
            estop_in,
            encoder,
            cancel,
            invert_direction,
        }
    }

    /// Whether direction pin logic is inverted.
    #[inline]
    pub fn invert_direction(&self) -> bool {
        self.invert_direction
    }

    /// Give the pins back.
    pub fn release(self) -> (STEP, DIR, EN, LIM, SYNC, ESTOP, ENC) {
        (
            self.step_pin,
            self.dir_pin,
            self.enable_pin,
            self.limit_switch,
            self.sync_in,
            self.estop_in,
            self.encoder,
        )
    }
}

impl<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC> MotorHardware
    for PinMotorHardware<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIM: InputPin,
    SYNC: InputPin,
    ESTOP: InputPin,
    ENC: EncoderCounter,
{
    // Output errors cannot be reported from the interrupt; the next tick
    // drives the line again.
    fn step(&mut self) {
        let _ = self.step_pin.set_high();
    }

    fn unstep(&mut self) {
        let _ = self.step_pin.set_low();
    }

    fn set_direction(&mut self, forward: bool) {
        let _ = if forward != self.invert_direction {
            self.dir_pin.set_high()
        } else {
            self.dir_pin.set_low()
        };
    }

    fn activate_motor(&mut self) {
        let _ = self.enable_pin.set_high();
    }

    fn deactivate_motor(&mut self) {
        let _ = self.enable_pin.set_low();
    }

    // An unreadable limit switch or estop line counts as asserted.
    fn check_limit_switch(&mut self) -> bool {
        self.limit_switch.is_high().unwrap_or(true)
    }

    fn check_estop_in(&mut self) -> bool {
        self.estop_in.is_high().unwrap_or(true)
    }

    fn check_sync_in(&mut self) -> bool {
        self.sync_in.is_high().unwrap_or(false)
    }

    fn get_encoder_pulses(&mut self) -> i32 {
        self.encoder.pulses()
    }

    fn reset_encoder_pulses(&mut self) {
        self.encoder.reset();
    }

    fn enable_encoder(&mut self) {
        self.encoder.enable();
    }

    fn disable_encoder(&mut self) {
        self.encoder.disable();
    }

    fn has_cancel_request(&mut self) -> Option<CancelRequest> {
        self.cancel.pending()
    }

    fn request_cancel(&mut self, severity: ErrorSeverity) {
        self.cancel.request(CancelRequest::stop_requested(severity));
    }

    fn clear_cancel_request(&mut self) {
        self.cancel.clear();
    }
}
