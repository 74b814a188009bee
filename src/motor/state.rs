//! Observable state of the interrupt handler.

/// What the handler does on its next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerState {
    /// No move loaded; waiting for moves or resync requests.
    Idle,
    /// Executing a move.
    Moving,
    /// Discarding queued moves after a cancel, estop or stall abort.
    Draining,
    /// Emergency stop asserted; moves are rejected.
    Estop,
}

impl HandlerState {
    /// State name for display/debugging.
    pub fn name(self) -> &'static str {
        match self {
            HandlerState::Idle => "Idle",
            HandlerState::Moving => "Moving",
            HandlerState::Draining => "Draining",
            HandlerState::Estop => "Estop",
        }
    }

    /// True when moves are being executed or awaited normally.
    #[inline]
    pub fn is_operational(self) -> bool {
        matches!(self, HandlerState::Idle | HandlerState::Moving)
    }
}
