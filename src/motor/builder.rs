//! Builder pattern for PinMotorHardware.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{MotorConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};

use super::hardware::CancelFlag;
use super::pins::{EncoderCounter, PinMotorHardware};

/// Builder for creating PinMotorHardware instances.
pub struct PinMotorHardwareBuilder<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIM: InputPin,
    SYNC: InputPin,
    ESTOP: InputPin,
    ENC: EncoderCounter,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    enable_pin: Option<EN>,
    limit_switch: Option<LIM>,
    sync_in: Option<SYNC>,
    estop_in: Option<ESTOP>,
    encoder: Option<ENC>,
    cancel: Option<&'a CancelFlag>,
    invert_direction: bool,
}

impl<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC> Default
    for PinMotorHardwareBuilder<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIM: InputPin,
    SYNC: InputPin,
    ESTOP: InputPin,
    ENC: EncoderCounter,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>
    PinMotorHardwareBuilder<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    LIM: InputPin,
    SYNC: InputPin,
    ESTOP: InputPin,
    ENC: EncoderCounter,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            enable_pin: None,
            limit_switch: None,
            sync_in: None,
            estop_in: None,
            encoder: None,
            cancel: None,
            invert_direction: false,
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the driver enable pin.
    pub fn enable_pin(mut self, pin: EN) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set the limit switch input.
    pub fn limit_switch(mut self, pin: LIM) -> Self {
        self.limit_switch = Some(pin);
        self
    }

    /// Set the sync line input.
    pub fn sync_in(mut self, pin: SYNC) -> Self {
        self.sync_in = Some(pin);
        self
    }

    /// Set the emergency stop input.
    pub fn estop_in(mut self, pin: ESTOP) -> Self {
        self.estop_in = Some(pin);
        self
    }

    /// Set the encoder counter.
    pub fn encoder(mut self, encoder: ENC) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Set the cancel cell shared with task context.
    pub fn cancel_flag(mut self, flag: &'a CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Configure from a MotorConfig.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.invert_direction = config.invert_direction;
        self
    }

    /// Configure from SystemConfig by motor key.
    pub fn from_config(self, config: &SystemConfig, motor_name: &str) -> Result<Self> {
        let motor_config = config.require_motor(motor_name)?;
        Ok(self.from_motor_config(motor_config))
    }

    /// Build the hardware.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin, the encoder or the cancel flag is missing.
    pub fn build(self) -> Result<PinMotorHardware<'a, STEP, DIR, EN, LIM, SYNC, ESTOP, ENC>> {
        let step_pin = self.step_pin.ok_or(missing("step_pin"))?;
        let dir_pin = self.dir_pin.ok_or(missing("dir_pin"))?;
        let enable_pin = self.enable_pin.ok_or(missing("enable_pin"))?;
        let limit_switch = self.limit_switch.ok_or(missing("limit_switch"))?;
        let sync_in = self.sync_in.ok_or(missing("sync_in"))?;
        let estop_in = self.estop_in.ok_or(missing("estop_in"))?;
        let encoder = self.encoder.ok_or(missing("encoder"))?;
        let cancel = self.cancel.ok_or(missing("cancel_flag"))?;

        Ok(PinMotorHardware::new(
            step_pin,
            dir_pin,
            enable_pin,
            limit_switch,
            sync_in,
            estop_in,
            encoder,
            cancel,
            self.invert_direction,
        ))
    }
}

fn missing(what: &'static str) -> Error {
    Error::Config(ConfigError::MissingResource(what))
}
