//! Random arena generation

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::geometry::{Point, Size};
use crate::game::state::{MatchConfig, MatchState, Soldier, SoldierId, Tile};

use super::{ArenaBuilder, ArenaError};

const SOLDIERS_PER_PLAYER: usize = 3;
const WALL_DENSITY: f64 = 0.1;

/// Builds a randomly-walled arena with soldiers scattered on open tiles.
///
/// Generation is seeded per match from the builder's base seed and the match
/// id, so a match is reproducible from its configuration.
pub struct RandomArenaBuilder {
    width: i32,
    height: i32,
    base_seed: u64,
}

impl RandomArenaBuilder {
    pub fn new(width: i32, height: i32, base_seed: u64) -> Self {
        Self {
            width,
            height,
            base_seed,
        }
    }
}

impl ArenaBuilder for RandomArenaBuilder {
    fn build(&self, config: &MatchConfig) -> Result<MatchState, ArenaError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ArenaError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let size = Size::new(self.width, self.height);
        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed ^ config.match_id.0);

        let tiles: Vec<Tile> = (0..size.area())
            .map(|_| Tile {
                blocking: rng.gen_bool(WALL_DENSITY),
            })
            .collect();

        let mut soldiers = Vec::with_capacity(config.players.len() * SOLDIERS_PER_PLAYER);
        let mut next_soldier_id = 1u32;

        for player in &config.players {
            let mut placed = 0;
            // Rejection sampling against walls; bail out rather than spin
            // forever on a degenerate grid
            let mut attempts = 0usize;
            let max_attempts = size.area().max(1) * 16;

            while placed < SOLDIERS_PER_PLAYER {
                if attempts >= max_attempts {
                    return Err(ArenaError::PlacementFailed {
                        player_id: player.id.0,
                        required: SOLDIERS_PER_PLAYER,
                    });
                }
                attempts += 1;

                let position = Point::new(
                    rng.gen_range(0..self.width),
                    rng.gen_range(0..self.height),
                );
                if tiles[(position.x + self.width * position.y) as usize].blocking {
                    continue;
                }

                soldiers.push(Soldier {
                    id: SoldierId(next_soldier_id),
                    player_id: player.id,
                    position,
                });
                next_soldier_id += 1;
                placed += 1;
            }
        }

        Ok(MatchState {
            config: config.clone(),
            size,
            tiles,
            soldiers,
            bullets: Vec::new(),
            round: 0,
        })
    }
}
