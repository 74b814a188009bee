//! Outbound status reports.
//!
//! The handler emits these from interrupt context. Numeric values match the
//! bus protocol so the reporting task can forward them without translation.

use crate::motor::PositionFlags;

/// Outcome carried by an [`Ack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AckMessageId {
    /// Ran for its full duration.
    CompleteWithoutCondition = 0x1,
    /// Ended early by one of its stop conditions.
    StoppedByCondition = 0x2,
    /// Timed out.
    Timeout = 0x3,
    /// Position could not be maintained.
    PositionError = 0x4,
    /// A safe-stop condition fired; the move continues.
    ConditionMet = 0x8,
}

impl AckMessageId {
    /// Decode a wire value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x1 => Some(Self::CompleteWithoutCondition),
            0x2 => Some(Self::StoppedByCondition),
            0x3 => Some(Self::Timeout),
            0x4 => Some(Self::PositionError),
            0x8 => Some(Self::ConditionMet),
            _ => None,
        }
    }
}

/// Severity of an [`ErrorMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational; motion may continue.
    Warning = 0x1,
    /// Motion stopped, the system can resume.
    Recoverable = 0x2,
    /// Motion stopped, intervention needed.
    Unrecoverable = 0x3,
}

impl ErrorSeverity {
    /// Decode a wire value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x1 => Some(Self::Warning),
            0x2 => Some(Self::Recoverable),
            0x3 => Some(Self::Unrecoverable),
            _ => None,
        }
    }
}

/// Fault reported by an [`ErrorMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ErrorCode {
    /// Arithmetic or peripheral fault.
    Hardware = 0x5,
    /// Emergency stop asserted.
    EstopDetected = 0x7,
    /// Encoder disagreed with the commanded steps.
    CollisionDetected = 0x8,
    /// Emergency stop released.
    EstopReleased = 0xA,
    /// Request refused because a move is running.
    MotorBusy = 0xB,
    /// Motion cancelled on request.
    StopRequested = 0xC,
}

impl ErrorCode {
    /// Decode a wire value.
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0x5 => Some(Self::Hardware),
            0x7 => Some(Self::EstopDetected),
            0x8 => Some(Self::CollisionDetected),
            0xA => Some(Self::EstopReleased),
            0xB => Some(Self::MotorBusy),
            0xC => Some(Self::StopRequested),
            _ => None,
        }
    }
}

/// Terminal (or safe-stop intermediate) report for a reportable move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ack {
    /// Correlation id of the move.
    pub message_index: u32,
    /// Group of the move.
    pub group_id: u8,
    /// Sequence number within the group.
    pub seq_id: u8,
    /// Whole-step position when the report was built.
    pub current_position_steps: u32,
    /// Encoder reading when the report was built.
    pub encoder_position: i32,
    /// Position confidence.
    pub position_flags: PositionFlags,
    /// Outcome.
    pub ack_id: AckMessageId,
    /// Encoder baseline of the move; for backoff moves the distance
    /// travelled in encoder ticks instead.
    pub start_encoder_position: i32,
}

/// Fault report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorMessage {
    /// Correlation id of the affected move or request, 0 if none.
    pub message_index: u32,
    /// How bad.
    pub severity: ErrorSeverity,
    /// What.
    pub error_code: ErrorCode,
}

impl ErrorMessage {
    /// Create a new error report.
    #[inline]
    pub const fn new(message_index: u32, severity: ErrorSeverity, error_code: ErrorCode) -> Self {
        Self {
            message_index,
            severity,
            error_code,
        }
    }
}

/// Answer to an [`UpdatePositionRequest`](super::UpdatePositionRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdatePositionResponse {
    /// Correlation id of the request.
    pub message_index: u32,
    /// Whole-step position after the resync.
    pub stepper_position_counts: u32,
    /// Encoder reading used for the resync.
    pub encoder_pulses: i32,
    /// Position confidence after the resync.
    pub position_flags: PositionFlags,
}

/// Everything the handler can put on the status channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveStatus {
    /// Move report.
    Ack(Ack),
    /// Fault report.
    Error(ErrorMessage),
    /// Resync answer.
    UpdatePosition(UpdatePositionResponse),
}

impl From<Ack> for MoveStatus {
    fn from(ack: Ack) -> Self {
        MoveStatus::Ack(ack)
    }
}

impl From<ErrorMessage> for MoveStatus {
    fn from(error: ErrorMessage) -> Self {
        MoveStatus::Error(error)
    }
}

impl From<UpdatePositionResponse> for MoveStatus {
    fn from(response: UpdatePositionResponse) -> Self {
        MoveStatus::UpdatePosition(response)
    }
}
