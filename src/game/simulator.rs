//! Match lifecycle - initial broadcast, round loop, teardown

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::net::protocol::View;
use crate::net::ClientConnection;

use super::log::{MatchLog, MatchLogSink};
use super::state::{MatchState, PlayerId};
use super::step::StepSimulator;

/// Hard cap on rounds per match
pub const MAX_ROUNDS: u32 = 200;

/// Invoked exactly once at match teardown with the match's connection set,
/// regardless of normal completion or early abort.
pub type CompletionHook = Box<dyn FnOnce(Vec<ClientConnection>) + Send>;

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("connection count {connections} does not match configured player count {players}")]
    PlayerCountMismatch { connections: usize, players: usize },
}

struct MatchClient {
    conn: ClientConnection,
    player_id: PlayerId,
}

/// Runs one match to completion. Owns the match state and every player
/// connection for the match's lifetime; nothing here is shared with other
/// matches.
pub struct MatchSimulator {
    state: MatchState,
    clients: Vec<MatchClient>,
    log: MatchLog,
    log_sink: Arc<dyn MatchLogSink>,
    recv_timeout: Duration,
    on_finish: Option<CompletionHook>,
}

impl MatchSimulator {
    /// Pair connections with the configured players, in order. The counts
    /// must match; a mismatch is a wiring bug, not a runtime condition.
    pub fn new(
        connections: Vec<ClientConnection>,
        start_state: MatchState,
        log_sink: Arc<dyn MatchLogSink>,
        recv_timeout: Duration,
        on_finish: CompletionHook,
    ) -> Result<Self, MatchError> {
        if connections.len() != start_state.config.players.len() {
            return Err(MatchError::PlayerCountMismatch {
                connections: connections.len(),
                players: start_state.config.players.len(),
            });
        }

        let clients = connections
            .into_iter()
            .zip(&start_state.config.players)
            .map(|(conn, player)| MatchClient {
                conn,
                player_id: player.id,
            })
            .collect();

        let log = MatchLog::new(start_state.config.match_id, start_state.clone());

        Ok(Self {
            state: start_state,
            clients,
            log,
            log_sink,
            recv_timeout,
            on_finish: Some(on_finish),
        })
    }

    /// Run the match to its end: initial broadcast, then rounds up to the
    /// cap. Always ends through teardown, whatever happens in between.
    pub async fn run(mut self) {
        let match_id = self.state.config.match_id;
        info!(match_id = %match_id, players = self.clients.len(), "Match started");

        // Initial handshake: every player gets the start state. A failure
        // here is fatal - no partial starts.
        let start_view = View {
            state: self.state.clone(),
        };
        for client in &mut self.clients {
            if let Err(e) = client.conn.transmit_view(&start_view).await {
                error!(
                    match_id = %match_id,
                    client_id = %client.conn.id(),
                    error = %e,
                    "Error transmitting initial state, aborting match"
                );
                self.finished();
                return;
            }
        }

        while self.state.round < MAX_ROUNDS {
            let round_id = self.state.round;
            let mut step = StepSimulator::new(&mut self.state);
            step.pre_step();

            // One serial submission opportunity per connection, in fixed
            // order. A failed or timed-out receive counts as zero
            // operations for this round.
            for client in &mut self.clients {
                match timeout(self.recv_timeout, client.conn.receive_operations()).await {
                    Ok(Ok(operations)) => {
                        for operation in operations {
                            step.apply_operation(client.player_id, operation);
                        }
                    }
                    Ok(Err(e)) => {
                        warn!(
                            match_id = %match_id,
                            round_id,
                            client_id = %client.conn.id(),
                            error = %e,
                            "Error receiving turn"
                        );
                    }
                    Err(_) => {
                        warn!(
                            match_id = %match_id,
                            round_id,
                            client_id = %client.conn.id(),
                            "Timed out receiving turn"
                        );
                        // The frame stream position is unknowable after an
                        // abandoned read
                        client.conn.mark_disconnected();
                    }
                }
            }

            step.post_step();
            self.log.rounds.push(step.finish());

            let round_view = View {
                state: self.state.clone(),
            };
            for client in &mut self.clients {
                if let Err(e) = client.conn.transmit_view(&round_view).await {
                    // That client misses this round's view; the match goes on
                    warn!(
                        match_id = %match_id,
                        round_id,
                        client_id = %client.conn.id(),
                        error = %e,
                        "Error transmitting round result"
                    );
                }
            }

            self.state.round += 1;
        }

        info!(match_id = %match_id, rounds = self.state.round, "Match finished");
        self.finished();
    }

    /// Teardown: hand off the audit log, then return the connections
    /// through the completion hook. Runs exactly once.
    fn finished(&mut self) {
        self.log_sink.store(&self.log);

        if let Some(hook) = self.on_finish.take() {
            let connections = self
                .clients
                .drain(..)
                .map(|client| client.conn)
                .collect();
            hook(connections);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::Size;
    use crate::game::log::DiscardLogSink;
    use crate::game::state::{MatchConfig, MatchId, Player, Tile};
    use parking_lot::Mutex;

    fn start_state(player_count: u32) -> MatchState {
        let size = Size::new(4, 4);
        MatchState {
            config: MatchConfig {
                match_id: MatchId(1),
                players: (1..=player_count).map(|id| Player { id: PlayerId(id) }).collect(),
            },
            size,
            tiles: vec![Tile { blocking: false }; size.area()],
            soldiers: Vec::new(),
            bullets: Vec::new(),
            round: 0,
        }
    }

    fn pipe_connection() -> (ClientConnection, tokio::io::DuplexStream) {
        let (server_side, client_side) = tokio::io::duplex(64 * 1024);
        (
            ClientConnection::new(server_side, "test".into()),
            client_side,
        )
    }

    #[tokio::test]
    async fn player_count_mismatch_is_a_constructor_error() {
        let (conn, _peer) = pipe_connection();
        let result = MatchSimulator::new(
            vec![conn],
            start_state(2),
            Arc::new(DiscardLogSink),
            Duration::from_secs(1),
            Box::new(|_| {}),
        );
        assert!(matches!(
            result,
            Err(MatchError::PlayerCountMismatch {
                connections: 1,
                players: 2
            })
        ));
    }

    #[tokio::test]
    async fn failed_initial_broadcast_aborts_with_zero_rounds() {
        let (conn_a, peer_a) = pipe_connection();
        let (conn_b, peer_b) = pipe_connection();
        // Both peers gone before the handshake
        drop(peer_a);
        drop(peer_b);

        let fired = Arc::new(Mutex::new(0u32));
        let fired_in_hook = Arc::clone(&fired);
        let rounds_seen = Arc::new(Mutex::new(None));

        struct CountingSink(Arc<Mutex<Option<usize>>>);
        impl MatchLogSink for CountingSink {
            fn store(&self, log: &MatchLog) {
                *self.0.lock() = Some(log.rounds.len());
            }
        }

        let simulator = MatchSimulator::new(
            vec![conn_a, conn_b],
            start_state(2),
            Arc::new(CountingSink(Arc::clone(&rounds_seen))),
            Duration::from_secs(1),
            Box::new(move |_| *fired_in_hook.lock() += 1),
        )
        .unwrap();

        simulator.run().await;

        assert_eq!(*fired.lock(), 1, "completion hook must fire exactly once");
        assert_eq!(*rounds_seen.lock(), Some(0), "no rounds may have been played");
    }
}
