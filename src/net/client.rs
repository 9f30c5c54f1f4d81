//! Client connection - framed message exchange with one connected player

use std::fmt;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use uuid::Uuid;

use crate::net::protocol::{Operation, Turn, View};

use super::frame::{read_frame, write_frame};

/// Stable identifier for one connection, assigned at accept time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Byte stream a client talks over. Blanket-implemented so production code
/// hands in a `TcpStream` and tests hand in a duplex pipe.
pub trait ClientStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<S> ClientStream for S where S: AsyncRead + AsyncWrite + Unpin + Send {}

/// One connected player. Owns the framed stream exclusively; during a match
/// the connection is owned by that match's task, otherwise by the ready
/// queue.
///
/// Connection health latches false on the first I/O failure and is never
/// reset; `is_connected` may be stale between enqueue and pairing, which the
/// scheduler culls for at dequeue time.
pub struct ClientConnection {
    id: ClientId,
    peer: String,
    stream: Box<dyn ClientStream>,
    connected: bool,
}

impl ClientConnection {
    pub fn new(stream: impl ClientStream + 'static, peer: String) -> Self {
        Self {
            id: ClientId::generate(),
            peer,
            stream: Box::new(stream),
            connected: true,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Remote address label for log lines
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Non-blocking connectivity check
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Mark the connection unusable, e.g. after an abandoned read left the
    /// frame stream at an unknown position.
    pub fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    /// Receive one round's operation batch
    pub async fn receive_operations(&mut self) -> io::Result<Vec<Operation>> {
        let payload = match read_frame(&mut self.stream).await {
            Ok(payload) => payload,
            Err(e) => {
                self.connected = false;
                return Err(e);
            }
        };

        match bincode::deserialize::<Turn>(&payload) {
            Ok(turn) => Ok(turn.operations),
            Err(e) => {
                // A peer speaking garbage cannot be re-synchronized
                self.connected = false;
                Err(io::Error::new(io::ErrorKind::InvalidData, e))
            }
        }
    }

    /// Send a state snapshot
    pub async fn transmit_view(&mut self, view: &View) -> io::Result<()> {
        let payload = bincode::serialize(view)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Err(e) = write_frame(&mut self.stream, &payload).await {
            self.connected = false;
            return Err(e);
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("connected", &self.connected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::{Direction, Size};
    use crate::game::state::{MatchConfig, MatchId, MatchState, Player, PlayerId, SoldierId, Tile};
    use crate::net::protocol::Action;

    fn minimal_view() -> View {
        let size = Size::new(2, 2);
        View {
            state: MatchState {
                config: MatchConfig {
                    match_id: MatchId(1),
                    players: vec![Player { id: PlayerId(1) }],
                },
                size,
                tiles: vec![Tile { blocking: false }; size.area()],
                soldiers: Vec::new(),
                bullets: Vec::new(),
                round: 0,
            },
        }
    }

    #[tokio::test]
    async fn turn_and_view_cross_a_duplex_pipe() {
        let (server_side, client_side) = tokio::io::duplex(4096);
        let mut server = ClientConnection::new(server_side, "test".into());
        let mut client = ClientConnection::new(client_side, "test-peer".into());

        let view = minimal_view();
        server.transmit_view(&view).await.unwrap();

        // The client end reads the raw frame back as a View
        let payload = read_frame(&mut client.stream).await.unwrap();
        let received: View = bincode::deserialize(&payload).unwrap();
        assert_eq!(received, view);

        let turn = Turn {
            operations: vec![Operation {
                round_id: 0,
                action: Some(Action::Shoot {
                    soldier_id: Some(SoldierId(1)),
                    direction: Direction::North,
                }),
            }],
        };
        let encoded = bincode::serialize(&turn).unwrap();
        write_frame(&mut client.stream, &encoded).await.unwrap();

        let operations = server.receive_operations().await.unwrap();
        assert_eq!(operations, turn.operations);
        assert!(server.is_connected());
    }

    #[tokio::test]
    async fn receive_failure_latches_disconnected() {
        let (server_side, client_side) = tokio::io::duplex(64);
        let mut server = ClientConnection::new(server_side, "test".into());
        drop(client_side);

        assert!(server.receive_operations().await.is_err());
        assert!(!server.is_connected());
    }

    #[tokio::test]
    async fn undecodable_payload_latches_disconnected() {
        let (server_side, mut client_side) = tokio::io::duplex(64);
        let mut server = ClientConnection::new(server_side, "test".into());

        write_frame(&mut client_side, &[0xff; 9]).await.unwrap();

        let err = server.receive_operations().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(!server.is_connected());
    }
}
