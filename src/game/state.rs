//! Match state - the single mutable aggregate owned by a running match

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Direction, Point, Size};

/// Identifies a match for its whole lifetime. Assigned sequentially by the
/// runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Player id within a match, assigned by queue order starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Soldier id, unique within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoldierId(pub u32);

impl fmt::Display for SoldierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One arena cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub blocking: bool,
}

/// Mutable unit on the grid. Position is always in-bounds and never on a
/// blocking tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Soldier {
    pub id: SoldierId,
    pub player_id: PlayerId,
    pub position: Point,
}

/// A fired shot. Exists for exactly one round: appended during the round it
/// is fired, resolved and cleared in the next round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub position: Point,
    pub direction: Direction,
    pub owner_id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
}

/// Immutable per-match configuration, fixed once the scheduler pairs players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub match_id: MatchId,
    pub players: Vec<Player>,
}

/// The full mutable state of one match. Exclusively owned by the task
/// running that match; never shared across matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub config: MatchConfig,
    pub size: Size,
    /// Row-major, `size.area()` entries
    pub tiles: Vec<Tile>,
    pub soldiers: Vec<Soldier>,
    pub bullets: Vec<Bullet>,
    pub round: u32,
}

impl MatchState {
    /// Tile at an in-bounds point
    pub fn tile_at(&self, point: Point) -> Tile {
        self.tiles[(point.x + self.size.width * point.y) as usize]
    }

    pub fn soldier(&self, id: SoldierId) -> Option<&Soldier> {
        self.soldiers.iter().find(|s| s.id == id)
    }

    pub fn soldier_mut(&mut self, id: SoldierId) -> Option<&mut Soldier> {
        self.soldiers.iter_mut().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_state(width: i32, height: i32) -> MatchState {
        let size = Size::new(width, height);
        MatchState {
            config: MatchConfig {
                match_id: MatchId(1),
                players: vec![Player { id: PlayerId(1) }, Player { id: PlayerId(2) }],
            },
            size,
            tiles: vec![Tile { blocking: false }; size.area()],
            soldiers: Vec::new(),
            bullets: Vec::new(),
            round: 0,
        }
    }

    #[test]
    fn tile_lookup_is_row_major() {
        let mut state = open_state(3, 2);
        state.tiles[1 + 3] = Tile { blocking: true };
        assert!(state.tile_at(Point::new(1, 1)).blocking);
        assert!(!state.tile_at(Point::new(1, 0)).blocking);
    }

    #[test]
    fn soldier_lookup_by_id() {
        let mut state = open_state(3, 3);
        state.soldiers.push(Soldier {
            id: SoldierId(7),
            player_id: PlayerId(1),
            position: Point::new(0, 0),
        });
        assert!(state.soldier(SoldierId(7)).is_some());
        assert!(state.soldier(SoldierId(8)).is_none());
        state.soldier_mut(SoldierId(7)).unwrap().position = Point::new(1, 1);
        assert_eq!(state.soldier(SoldierId(7)).unwrap().position, Point::new(1, 1));
    }
}
