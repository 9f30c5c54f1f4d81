//! Wire protocol message definitions
//! These are the framed types exchanged between client and server

use serde::{Deserialize, Serialize};

use crate::game::geometry::Direction;
use crate::game::state::{MatchState, SoldierId};

/// What a soldier is ordered to do this round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Step one tile in the given direction
    Move {
        soldier_id: Option<SoldierId>,
        direction: Direction,
    },
    /// Fire a bullet from the soldier's current tile
    Shoot {
        soldier_id: Option<SoldierId>,
        direction: Direction,
    },
}

/// One player-submitted command, tagged with its target round.
///
/// A missing action or soldier id is representable on the wire and rejected
/// during validation rather than at decode time, so the rejection lands in
/// the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub round_id: u32,
    pub action: Option<Action>,
}

/// Client -> server: the operation batch for one round. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub operations: Vec<Operation>,
}

/// Server -> client: a whole-state snapshot, identical for every client.
/// Sent once before round 0 and once after each round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub state: MatchState,
}
