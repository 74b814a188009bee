//! Hardware boundary of the interrupt handler.
//!
//! Every method is called from interrupt context and must return
//! immediately.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::messages::{ErrorCode, ErrorSeverity};

/// A pending request to abandon all motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CancelRequest {
    /// Severity to report.
    pub severity: ErrorSeverity,
    /// Error code to report.
    pub code: ErrorCode,
}

impl CancelRequest {
    /// A stop requested by the host.
    pub const fn stop_requested(severity: ErrorSeverity) -> Self {
        Self {
            severity,
            code: ErrorCode::StopRequested,
        }
    }
}

/// Cancel request cell shared between task and interrupt context.
///
/// Uses only atomic loads and stores so it works on cores without
/// compare-and-swap.
#[derive(Debug, Default)]
pub struct CancelFlag {
    /// Zero when no request is pending.
    severity: AtomicU8,
    code: AtomicU16,
}

impl CancelFlag {
    /// Create an empty flag, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            severity: AtomicU8::new(0),
            code: AtomicU16::new(0),
        }
    }

    /// Post a request. A later request replaces an unread one.
    pub fn request(&self, request: CancelRequest) {
        self.code.store(request.code as u16, Ordering::Relaxed);
        self.severity.store(request.severity as u8, Ordering::Release);
    }

    /// Read the pending request without clearing it.
    pub fn pending(&self) -> Option<CancelRequest> {
        let severity = ErrorSeverity::from_raw(self.severity.load(Ordering::Acquire))?;
        let code = ErrorCode::from_raw(self.code.load(Ordering::Relaxed))
            .unwrap_or(ErrorCode::StopRequested);
        Some(CancelRequest { severity, code })
    }

    /// Drop the pending request.
    pub fn clear(&self) {
        self.severity.store(0, Ordering::Release);
    }
}

/// Physical I/O used by the interrupt handler.
///
/// The production back-end is [`PinMotorHardware`](super::PinMotorHardware);
/// tests supply their own double.
pub trait MotorHardware {
    /// Raise the step line.
    fn step(&mut self);
    /// Lower the step line.
    fn unstep(&mut self);
    /// Drive the direction line; `true` moves away from home.
    fn set_direction(&mut self, forward: bool);
    /// Energise the driver.
    fn activate_motor(&mut self);
    /// De-energise the driver.
    fn deactivate_motor(&mut self);

    /// True while the home switch is pressed.
    fn check_limit_switch(&mut self) -> bool;
    /// True while the emergency stop is asserted.
    fn check_estop_in(&mut self) -> bool;
    /// True while the sync line is asserted.
    fn check_sync_in(&mut self) -> bool;

    /// Current encoder count.
    fn get_encoder_pulses(&mut self) -> i32;
    /// Zero the encoder count.
    fn reset_encoder_pulses(&mut self);
    /// Start counting encoder pulses.
    fn enable_encoder(&mut self) {}
    /// Stop counting encoder pulses.
    fn disable_encoder(&mut self) {}

    /// Pending cancel request, if any.
    fn has_cancel_request(&mut self) -> Option<CancelRequest>;
    /// Post a stop request with the given severity.
    fn request_cancel(&mut self, severity: ErrorSeverity);
    /// Drop the pending cancel request once it has been acted on.
    fn clear_cancel_request(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_lifecycle() {
        let flag = CancelFlag::new();
        assert_eq!(flag.pending(), None);

        flag.request(CancelRequest::stop_requested(ErrorSeverity::Warning));
        assert_eq!(
            flag.pending(),
            Some(CancelRequest {
                severity: ErrorSeverity::Warning,
                code: ErrorCode::StopRequested,
            })
        );
        // reading does not consume
        assert!(flag.pending().is_some());

        flag.clear();
        assert_eq!(flag.pending(), None);
    }

    #[test]
    fn test_later_request_wins() {
        let flag = CancelFlag::new();
        flag.request(CancelRequest::stop_requested(ErrorSeverity::Warning));
        flag.request(CancelRequest {
            severity: ErrorSeverity::Unrecoverable,
            code: ErrorCode::Hardware,
        });
        let pending = flag.pending().unwrap();
        assert_eq!(pending.severity, ErrorSeverity::Unrecoverable);
        assert_eq!(pending.code, ErrorCode::Hardware);
    }
}
