//! Match audit log - per-round operation records and the teardown sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::net::protocol::Operation;

use super::state::{MatchId, MatchState, PlayerId, SoldierId};

/// Why an operation was rejected. An accepted operation has no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationError {
    /// Action missing, or a required field absent
    InvalidField,
    /// Soldier id does not exist in this match
    InvalidId,
    /// Soldier belongs to a different player
    WrongPlayer,
    /// Destination out of bounds or blocked
    InvalidMovement,
    /// Operation tagged for a different round
    WrongRound,
}

/// One submitted operation and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: Operation,
    /// `None` means the operation was accepted and applied
    pub error: Option<OperationError>,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    /// Bullet reached a soldier of another player
    Kill,
    /// Bullet reached a soldier of its own player
    SelfBlock,
}

/// A soldier struck during bullet resolution. Recorded for the audit trail;
/// no mechanical effect is applied to the soldier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRecord {
    pub soldier_id: SoldierId,
    pub shooter_id: PlayerId,
    pub kind: HitKind,
}

/// Append-only record of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    pub round_id: u32,
    pub operations: Vec<OperationRecord>,
    pub hits: Vec<HitRecord>,
}

impl RoundLog {
    pub fn new(round_id: u32) -> Self {
        Self {
            round_id,
            operations: Vec::new(),
            hits: Vec::new(),
        }
    }
}

/// Full audit trail of one match, handed to the log sink exactly once at
/// teardown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchLog {
    pub match_id: MatchId,
    pub started_at: DateTime<Utc>,
    pub start_state: MatchState,
    pub rounds: Vec<RoundLog>,
}

impl MatchLog {
    pub fn new(match_id: MatchId, start_state: MatchState) -> Self {
        Self {
            match_id,
            started_at: Utc::now(),
            start_state,
            rounds: Vec::new(),
        }
    }
}

/// Destination for finished match logs. Persistence itself is out of scope;
/// this is the seam a storage backend plugs into.
pub trait MatchLogSink: Send + Sync {
    fn store(&self, log: &MatchLog);
}

/// Drops every log
pub struct DiscardLogSink;

impl MatchLogSink for DiscardLogSink {
    fn store(&self, _log: &MatchLog) {}
}
