//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{Micrometers, TicksPerMicrometer};

/// Per-axis configuration, fixed for the life of the interrupt handler.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Stepper microsteps per micrometer of travel.
    pub tick_per_um: TicksPerMicrometer,

    /// Encoder pulses per micrometer of travel. Zero when the axis has no
    /// encoder.
    #[serde(default)]
    pub encoder_tick_per_um: TicksPerMicrometer,

    /// Stepper/encoder divergence tolerated before a stall is flagged.
    #[serde(default = "default_stall_threshold")]
    pub stall_threshold_um: Micrometers,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,
}

fn default_stall_threshold() -> Micrometers {
    Micrometers(10)
}

impl MotorConfig {
    /// Create a configuration for an axis without an encoder.
    pub fn new(name: &str, tick_per_um: f32) -> Self {
        let mut owned = String::new();
        // Truncate rather than fail: the name is only used for lookups and logs.
        for c in name.chars() {
            if owned.push(c).is_err() {
                break;
            }
        }
        Self {
            name: owned,
            tick_per_um: TicksPerMicrometer(tick_per_um),
            encoder_tick_per_um: TicksPerMicrometer::ZERO,
            stall_threshold_um: default_stall_threshold(),
            invert_direction: false,
        }
    }

    /// Attach an encoder and its stall tolerance.
    pub fn with_encoder(mut self, encoder_tick_per_um: f32, stall_threshold_um: u32) -> Self {
        self.encoder_tick_per_um = TicksPerMicrometer(encoder_tick_per_um);
        self.stall_threshold_um = Micrometers(stall_threshold_um);
        self
    }

    /// True when an encoder is fitted.
    #[inline]
    pub fn has_encoder(&self) -> bool {
        !self.encoder_tick_per_um.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_presence() {
        let config = MotorConfig::new("z", 16.0);
        assert!(!config.has_encoder());
        assert_eq!(config.stall_threshold_um, Micrometers(10));

        let config = config.with_encoder(4.0, 50);
        assert!(config.has_encoder());
        assert_eq!(config.stall_threshold_um.value(), 50);
    }

    #[test]
    fn test_long_name_truncated() {
        let config = MotorConfig::new("an-axis-name-that-is-far-longer-than-thirty-two", 1.0);
        assert_eq!(config.name.len(), 32);
    }
}
