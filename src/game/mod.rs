//! Game core - state, per-round simulation, match lifecycle

pub mod geometry;
pub mod log;
pub mod simulator;
pub mod state;
pub mod step;

pub use log::{DiscardLogSink, MatchLog, MatchLogSink};
pub use simulator::{CompletionHook, MatchError, MatchSimulator, MAX_ROUNDS};
pub use state::{MatchConfig, MatchId, MatchState, PlayerId, SoldierId};
pub use step::StepSimulator;
