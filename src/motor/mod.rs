//! Motor module for motor-control.
//!
//! The interrupt handler, the hardware boundary it drives and the
//! embedded-hal back-end for that boundary.

mod builder;
mod hardware;
mod interrupt;
mod pins;
mod position;
pub mod state;

pub use builder::PinMotorHardwareBuilder;
pub use hardware::{CancelFlag, CancelRequest, MotorHardware};
pub use interrupt::MotorInterruptHandler;
pub use pins::{EncoderCounter, NoEncoder, PinMotorHardware};
pub use position::PositionFlags;
pub use state::HandlerState;
