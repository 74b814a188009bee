//! Motion module for motor-control.
//!
//! Fixed-point integration of moves, stop conditions and encoder stall
//! detection.

mod executor;
mod fixed_point;
mod stall_check;
mod stop_condition;

pub use executor::MoveExecutor;
pub use fixed_point::{Direction, FixedPosition, StepsPerTick, StepsPerTickSq, RADIX};
pub use stall_check::StallCheck;
pub use stop_condition::StopCondition;
