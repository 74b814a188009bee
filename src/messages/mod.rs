//! Messages exchanged with the motor interrupt handler.

mod moves;
mod status;

pub use moves::{Move, MoveBuilder, UpdatePositionRequest, NO_GROUP};
pub use status::{
    Ack, AckMessageId, ErrorCode, ErrorMessage, ErrorSeverity, MoveStatus, UpdatePositionResponse,
};
