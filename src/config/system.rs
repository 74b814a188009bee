//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::motor::MotorConfig;
use crate::error::{ConfigError, Result};

/// Root configuration structure from TOML: every axis driven by one node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemConfig {
    /// Named motor configurations.
    pub motors: FnvIndexMap<String<32>, MotorConfig, 8>,
}

impl SystemConfig {
    /// Get a motor configuration by key.
    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a motor configuration by key, failing if it is absent.
    pub fn require_motor(&self, name: &str) -> Result<&MotorConfig> {
        self.motor(name).ok_or_else(|| {
            let mut key = String::new();
            for c in name.chars() {
                if key.push(c).is_err() {
                    break;
                }
            }
            ConfigError::MotorNotFound(key).into()
        })
    }

    /// List all motor keys.
    pub fn motor_names(&self) -> impl Iterator<Item = &str> {
        self.motors.keys().map(|s| s.as_str())
    }
}
