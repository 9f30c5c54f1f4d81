//! Arena generation - initial grid and soldier placement

mod random;

pub use random::RandomArenaBuilder;

use crate::game::state::{MatchConfig, MatchState};

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("arena dimensions {width}x{height} are not usable")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("could not place {required} soldiers for player {player_id} on open tiles")]
    PlacementFailed { player_id: u32, required: usize },
}

/// Produces the initial state for a new match: grid geometry plus starting
/// soldier placement. Guarantees every soldier starts in-bounds on a
/// non-blocking tile.
pub trait ArenaBuilder: Send + Sync {
    fn build(&self, config: &MatchConfig) -> Result<MatchState, ArenaError>;
}
