//! # motor-control
//!
//! Interrupt-driven stepper motion engine for embedded motor nodes.
//!
//! ## Features
//!
//! - **Fixed-point integration**: Q0.31 velocity and acceleration, Q31.31
//!   position with an overflow guard bit
//! - **Stop conditions**: limit switch homing and backoff, sync line with
//!   optional safe stop, stall policies
//! - **Stall detection**: encoder cross-check against commanded steps
//! - **ISR-safe channels**: `heapless::spsc` queues for moves, resync
//!   requests and status reports
//! - **embedded-hal 1.0**: GPIO back-end for the hardware boundary
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use heapless::spsc::Queue;
//! use motor_control::{Move, MotorInterruptHandler, StallCheck, StepsPerTick};
//!
//! let config = motor_control::load_config("axes.toml")?;
//! let axis = config.require_motor("z")?;
//!
//! let (mut moves_tx, moves_rx) = MOVES.split();
//! let (_resync_tx, resync_rx) = RESYNC.split();
//! let (status_tx, mut status_rx) = STATUS.split();
//!
//! let mut handler = MotorInterruptHandler::new(
//!     moves_rx,
//!     resync_rx,
//!     status_tx,
//!     hardware,
//!     StallCheck::from_config(axis),
//! );
//!
//! moves_tx.try_write(
//!     Move::builder(1)
//!         .duration(1000)
//!         .velocity(StepsPerTick::from_f32(0.25))
//!         .group(0, 0)
//!         .build()?,
//! )?;
//!
//! // In the step timer interrupt:
//! handler.run_interrupt();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod messages;
pub mod motion;
pub mod motor;
pub mod queue;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorConfig, SystemConfig};
pub use error::{Error, Result};
pub use messages::{
    Ack, AckMessageId, ErrorCode, ErrorMessage, ErrorSeverity, Move, MoveBuilder, MoveStatus,
    UpdatePositionRequest, UpdatePositionResponse, NO_GROUP,
};
pub use motion::{
    Direction, FixedPosition, MoveExecutor, StallCheck, StepsPerTick, StepsPerTickSq, StopCondition,
};
pub use motor::{
    state, CancelFlag, CancelRequest, HandlerState, MotorHardware, MotorInterruptHandler,
    PinMotorHardware, PinMotorHardwareBuilder, PositionFlags,
};
pub use queue::{IsrReceiver, IsrSender, TaskReceiver, TaskSender};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Micrometers, TicksPerMicrometer};
