//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{MotorConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks every motor:
/// - Stepper tick density is finite and positive
/// - Encoder tick density is finite and not negative
/// - An axis with an encoder has a non-zero stall threshold
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_, motor) in config.motors.iter() {
        validate_motor(motor)?;
    }
    Ok(())
}

/// Validate a single motor configuration.
pub fn validate_motor(config: &MotorConfig) -> Result<()> {
    let tick_per_um = config.tick_per_um.value();
    if !tick_per_um.is_finite() || tick_per_um <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidTicksPerMicrometer(tick_per_um)));
    }

    let encoder_tick_per_um = config.encoder_tick_per_um.value();
    if !encoder_tick_per_um.is_finite() || encoder_tick_per_um < 0.0 {
        return Err(Error::Config(ConfigError::InvalidEncoderTicksPerMicrometer(
            encoder_tick_per_um,
        )));
    }

    if config.has_encoder() && config.stall_threshold_um.value() == 0 {
        return Err(Error::Config(ConfigError::InvalidStallThreshold(
            config.stall_threshold_um.value(),
        )));
    }

    Ok(())
}
