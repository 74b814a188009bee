//! Configuration module for motor-control.
//!
//! Per-axis tick densities and stall tolerances, loaded from TOML files
//! (with `std` feature) or built in code.

mod motor;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use motor::MotorConfig;
pub use system::SystemConfig;
pub use validation::{validate_config, validate_motor};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Micrometers, TicksPerMicrometer};
