//! Per-round simulation - operation validation and bullet resolution

use tracing::info;

use crate::net::protocol::{Action, Operation};

use super::geometry::{self, Point};
use super::log::{HitKind, HitRecord, OperationError, OperationRecord, RoundLog};
use super::state::{Bullet, MatchState, PlayerId};

/// Simulates exactly one round of a match.
///
/// Usage per round: `pre_step`, then `apply_operation` for every operation
/// received from every player, then `post_step`, then `finish` to take the
/// round's audit record. Bullets captured at construction are the shots
/// fired in the previous round; they are resolved in `post_step` against
/// soldier positions after this round's moves.
pub struct StepSimulator<'a> {
    state: &'a mut MatchState,
    /// Bullets fired the previous round, captured before `pre_step` clears them
    carried_bullets: Vec<Bullet>,
    log: RoundLog,
}

impl<'a> StepSimulator<'a> {
    pub fn new(state: &'a mut MatchState) -> Self {
        let carried_bullets = state.bullets.clone();
        let log = RoundLog::new(state.round);
        Self {
            state,
            carried_bullets,
            log,
        }
    }

    fn round_id(&self) -> u32 {
        self.log.round_id
    }

    fn match_id(&self) -> u64 {
        self.state.config.match_id.0
    }

    /// Clear the previous round's bullets from the live state. They remain
    /// captured for resolution in `post_step`.
    pub fn pre_step(&mut self) {
        self.state.bullets.clear();
    }

    /// Validate and apply one operation. Always records exactly one audit
    /// entry; validation failures are data, never errors that escape here.
    pub fn apply_operation(&mut self, player_id: PlayerId, operation: Operation) {
        let error = self.validate_and_apply(player_id, &operation).err();
        self.log.operations.push(OperationRecord {
            operation,
            error,
            player_id,
        });
    }

    fn validate_and_apply(
        &mut self,
        player_id: PlayerId,
        operation: &Operation,
    ) -> Result<(), OperationError> {
        let action = operation
            .action
            .as_ref()
            .ok_or(OperationError::InvalidField)?;

        if operation.round_id != self.round_id() {
            return Err(OperationError::WrongRound);
        }

        match *action {
            Action::Shoot {
                soldier_id,
                direction,
            } => {
                let soldier_id = soldier_id.ok_or(OperationError::InvalidField)?;
                let soldier = self
                    .state
                    .soldier(soldier_id)
                    .ok_or(OperationError::InvalidId)?;
                if soldier.player_id != player_id {
                    return Err(OperationError::WrongPlayer);
                }

                let position = soldier.position;
                self.state.bullets.push(Bullet {
                    position,
                    direction,
                    owner_id: player_id,
                });
            }
            Action::Move {
                soldier_id,
                direction,
            } => {
                let soldier_id = soldier_id.ok_or(OperationError::InvalidField)?;
                let soldier = self
                    .state
                    .soldier(soldier_id)
                    .ok_or(OperationError::InvalidId)?;
                if soldier.player_id != player_id {
                    return Err(OperationError::WrongPlayer);
                }

                let dest = geometry::apply_direction(soldier.position, direction);
                if !geometry::point_in_area(dest, self.state.size) {
                    return Err(OperationError::InvalidMovement);
                }
                if self.state.tile_at(dest).blocking {
                    return Err(OperationError::InvalidMovement);
                }

                if let Some(soldier) = self.state.soldier_mut(soldier_id) {
                    soldier.position = dest;
                }
            }
        }

        Ok(())
    }

    /// Resolve the previous round's bullets against current soldier
    /// positions. Each bullet strikes the nearest in-path soldier(s);
    /// distance ties are simultaneous hits.
    pub fn post_step(&mut self) {
        let match_id = self.match_id();
        let round_id = self.round_id();
        let bullets = std::mem::take(&mut self.carried_bullets);
        for bullet in &bullets {
            let distance_to = |position: Point| geometry::manhattan_distance(position, bullet.position);

            let in_path: Vec<_> = self
                .state
                .soldiers
                .iter()
                .filter(|s| geometry::point_in_path(bullet.position, bullet.direction, s.position))
                .collect();

            let Some(min_distance) = in_path.iter().map(|s| distance_to(s.position)).min() else {
                // Miss
                continue;
            };

            for target in in_path
                .iter()
                .filter(|s| distance_to(s.position) == min_distance)
            {
                let kind = if target.player_id == bullet.owner_id {
                    HitKind::SelfBlock
                } else {
                    HitKind::Kill
                };
                match kind {
                    HitKind::SelfBlock => info!(
                        match_id,
                        round_id,
                        soldier_id = %target.id,
                        owner_id = %bullet.owner_id,
                        "Soldier blocked own player's bullet"
                    ),
                    HitKind::Kill => info!(
                        match_id,
                        round_id,
                        soldier_id = %target.id,
                        shooter_id = %bullet.owner_id,
                        "Soldier killed"
                    ),
                }
                self.log.hits.push(HitRecord {
                    soldier_id: target.id,
                    shooter_id: bullet.owner_id,
                    kind,
                });
            }
        }
    }

    /// Take the round's audit record
    pub fn finish(self) -> RoundLog {
        self.log
    }
}
