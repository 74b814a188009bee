//! Error types for motor-control.
//!
//! These cover the construction-time surface (configuration, move building,
//! queue setup). The interrupt path never returns them to its caller: faults
//! raised while stepping are turned into outbound
//! [`ErrorMessage`](crate::messages::ErrorMessage)s instead.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all motor-control operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Move construction or integration error
    Motion(MotionError),
    /// Queue or channel error
    Queue(QueueError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// Stepper ticks per micrometer must be finite and > 0
    InvalidTicksPerMicrometer(f32),
    /// Encoder ticks per micrometer must be finite and >= 0
    InvalidEncoderTicksPerMicrometer(f32),
    /// A motor with an encoder needs a non-zero stall threshold
    InvalidStallThreshold(u32),
    /// A required hardware resource was not supplied to a builder
    MissingResource(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Move construction and integration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// Stop-condition bits outside the known set
    UnknownStopCondition(u8),
    /// Stop conditions that cannot be combined on one move
    ConflictingStopConditions {
        /// Raw bits of the rejected combination
        bits: u8,
    },
    /// Position accumulator would have crossed its guard bit
    Overflow,
}

/// Queue and channel errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue had no free slot
    Full,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Queue(e) => write!(f, "Queue error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::InvalidTicksPerMicrometer(v) => {
                write!(f, "Invalid tick_per_um: {}. Must be > 0", v)
            }
            ConfigError::InvalidEncoderTicksPerMicrometer(v) => {
                write!(f, "Invalid encoder_tick_per_um: {}. Must be >= 0", v)
            }
            ConfigError::InvalidStallThreshold(v) => {
                write!(f, "Invalid stall_threshold_um: {}. Must be > 0 when an encoder is present", v)
            }
            ConfigError::MissingResource(what) => write!(f, "{} is required", what),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::UnknownStopCondition(bits) => {
                write!(f, "Unknown stop condition bits: {:#04x}", bits)
            }
            MotionError::ConflictingStopConditions { bits } => {
                write!(f, "Conflicting stop conditions: {:#04x}", bits)
            }
            MotionError::Overflow => write!(f, "Position accumulator overflow"),
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full => write!(f, "Queue is full"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Queue(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for QueueError {}
