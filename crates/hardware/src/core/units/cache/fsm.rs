//! Controller state machine.
//!
//! Two states and a pure transition function over the facts the controller
//! observes in a cycle. The controller evaluates the function against
//! pre-edge state and commits the result at the edge.

use serde::Serialize;

/// Controller states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ControllerState {
    /// Resting state: hits are serviced, misses start a refill.
    #[default]
    Servicing,
    /// A refill is in progress for the recorded miss address.
    MissHandling,
}

/// What the controller saw in one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Observation {
    /// Read or write enable is asserted.
    pub active: bool,
    /// The evaluator reports a hit for the current address.
    pub hit: bool,
    /// The current block is the one whose refill is in progress.
    pub same_request: bool,
    /// The target set has an invalid way or a victim.
    pub can_fill: bool,
}

/// Next state after a cycle in `state` with observation `obs`.
///
/// MissHandling is held only while the same missing request is still
/// asserted and no way can be filled; every other outcome of a refill cycle
/// returns to Servicing.
pub const fn next_state(state: ControllerState, obs: Observation) -> ControllerState {
    match state {
        ControllerState::Servicing => {
            if obs.active && !obs.hit {
                ControllerState::MissHandling
            } else {
                ControllerState::Servicing
            }
        }
        ControllerState::MissHandling => {
            if obs.active && !obs.hit && obs.same_request && !obs.can_fill {
                ControllerState::MissHandling
            } else {
                ControllerState::Servicing
            }
        }
    }
}
