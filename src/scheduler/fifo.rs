//! FIFO match scheduling

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::arena::{ArenaBuilder, ArenaError};
use crate::game::{CompletionHook, MatchError, MatchLogSink, MatchSimulator};
use crate::game::state::{MatchConfig, MatchId, Player, PlayerId};
use crate::net::ClientConnection;

use super::queue::ReadyQueue;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("arena build failed: {0}")]
    Arena(#[from] ArenaError),

    #[error("match construction failed: {0}")]
    Match(#[from] MatchError),
}

/// Pairing policy seam: hand the runner the next ready-to-run match, if any.
/// Implementations decide who plays whom; the runner only drives execution.
pub trait MatchScheduler: Send + Sync {
    /// Non-blocking. `Ok(None)` means "not ready, poll again later".
    /// Errors propagate to the caller; the scheduler never retries.
    fn next_match(&self, match_id: MatchId) -> Result<Option<MatchSimulator>, SchedulerError>;
}

/// Pairs waiting connections strictly first-come-first-served.
pub struct FifoScheduler<B> {
    queue: Arc<ReadyQueue>,
    /// Connections collected towards the next match, kept across calls when
    /// fewer than a full match's worth are available
    pending: Mutex<Vec<ClientConnection>>,
    players_per_match: usize,
    arena: B,
    log_sink: Arc<dyn MatchLogSink>,
    recv_timeout: Duration,
}

impl<B: ArenaBuilder> FifoScheduler<B> {
    pub fn new(
        queue: Arc<ReadyQueue>,
        arena: B,
        log_sink: Arc<dyn MatchLogSink>,
        players_per_match: usize,
        recv_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            pending: Mutex::new(Vec::with_capacity(players_per_match)),
            players_per_match,
            arena,
            log_sink,
            recv_timeout,
        }
    }

    /// Enqueue connections for pairing. Called by the acceptor and, through
    /// the completion hook, by finishing matches.
    pub fn add_connections(&self, connections: impl IntoIterator<Item = ClientConnection>) {
        self.queue.add_connections(connections);
    }
}

impl<B: ArenaBuilder> MatchScheduler for FifoScheduler<B> {
    fn next_match(&self, match_id: MatchId) -> Result<Option<MatchSimulator>, SchedulerError> {
        let connections = {
            let mut pending = self.pending.lock();
            while pending.len() < self.players_per_match {
                let Some(conn) = self.queue.pop() else {
                    return Ok(None);
                };
                pending.push(conn);

                // Cull connections gone stale between enqueue and pairing,
                // so a match does not start already half-dead
                pending.retain(|c| c.is_connected());
            }
            pending.drain(..).collect::<Vec<_>>()
        };

        // Player ids follow queue order: first dequeued is player 1
        let config = MatchConfig {
            match_id,
            players: (1..=self.players_per_match as u32)
                .map(|id| Player { id: PlayerId(id) })
                .collect(),
        };
        let start_state = self.arena.build(&config)?;

        let queue = Arc::clone(&self.queue);
        let hook: CompletionHook = Box::new(move |connections| {
            // Surviving connections go straight back into the rotation
            queue.add_connections(connections);
        });

        let simulator = MatchSimulator::new(
            connections,
            start_state,
            Arc::clone(&self.log_sink),
            self.recv_timeout,
            hook,
        )?;

        info!(match_id = %match_id, players = self.players_per_match, "Match paired");
        Ok(Some(simulator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::RandomArenaBuilder;
    use crate::game::DiscardLogSink;
    use crate::game::state::MatchState;

    fn connection() -> ClientConnection {
        let (server_side, _client_side) = tokio::io::duplex(64);
        ClientConnection::new(server_side, "test".into())
    }

    fn scheduler<B: ArenaBuilder>(arena: B) -> FifoScheduler<B> {
        FifoScheduler::new(
            Arc::new(ReadyQueue::new()),
            arena,
            Arc::new(DiscardLogSink),
            2,
            Duration::from_secs(1),
        )
    }

    /// Records every config it is asked to build
    struct CapturingArena {
        inner: RandomArenaBuilder,
        seen: Mutex<Vec<MatchConfig>>,
    }

    impl CapturingArena {
        fn new() -> Self {
            Self {
                inner: RandomArenaBuilder::new(5, 5, 99),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ArenaBuilder for CapturingArena {
        fn build(&self, config: &MatchConfig) -> Result<MatchState, ArenaError> {
            self.seen.lock().push(config.clone());
            self.inner.build(config)
        }
    }

    struct FailingArena;

    impl ArenaBuilder for FailingArena {
        fn build(&self, _config: &MatchConfig) -> Result<MatchState, ArenaError> {
            Err(ArenaError::InvalidDimensions {
                width: 0,
                height: 0,
            })
        }
    }

    #[test]
    fn fewer_than_a_full_match_is_not_ready() {
        let sched = scheduler(CapturingArena::new());
        sched.add_connections([connection()]);

        assert!(sched.next_match(MatchId(1)).unwrap().is_none());
        // The lone connection is retained for the next attempt, and no
        // arena was ever built
        assert!(sched.arena.seen.lock().is_empty());

        sched.add_connections([connection()]);
        assert!(sched.next_match(MatchId(1)).unwrap().is_some());
    }

    #[test]
    fn pairing_builds_config_with_ids_in_queue_order() {
        let sched = scheduler(CapturingArena::new());
        sched.add_connections([connection(), connection(), connection()]);

        let paired = sched.next_match(MatchId(7)).unwrap();
        assert!(paired.is_some());

        {
            let seen = sched.arena.seen.lock();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].match_id, MatchId(7));
            assert_eq!(
                seen[0].players,
                vec![Player { id: PlayerId(1) }, Player { id: PlayerId(2) }]
            );
        }

        // The third connection stays queued for the next match
        assert!(sched.next_match(MatchId(8)).unwrap().is_none());
    }

    #[test]
    fn stale_connections_are_culled_at_dequeue() {
        let sched = scheduler(CapturingArena::new());
        let mut stale = connection();
        stale.mark_disconnected();
        sched.queue.push_unfiltered(stale);
        sched.add_connections([connection()]);

        // Only one live connection: not enough for a match
        assert!(sched.next_match(MatchId(1)).unwrap().is_none());

        sched.add_connections([connection()]);
        assert!(sched.next_match(MatchId(1)).unwrap().is_some());
    }

    #[test]
    fn arena_failure_propagates_without_retry() {
        let sched = scheduler(FailingArena);
        sched.add_connections([connection(), connection()]);

        assert!(matches!(
            sched.next_match(MatchId(1)),
            Err(SchedulerError::Arena(_))
        ));
    }
}
