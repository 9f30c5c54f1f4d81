//! Ready-connection queue

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::net::ClientConnection;

/// FIFO of connections waiting to be paired into a match.
///
/// The one structure shared between the acceptor, the scheduler, and match
/// completion hooks. Internally synchronized; callers never lock.
pub struct ReadyQueue {
    queue: Mutex<VecDeque<ClientConnection>>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Enqueue connections in order. Disconnected connections are dropped
    /// silently.
    pub fn add_connections(&self, connections: impl IntoIterator<Item = ClientConnection>) {
        let mut queue = self.queue.lock();
        for conn in connections {
            if conn.is_connected() {
                queue.push_back(conn);
            } else {
                debug!(client_id = %conn.id(), "Dropping disconnected client at enqueue");
            }
        }
    }

    /// Dequeue the oldest waiting connection
    pub fn pop(&self) -> Option<ClientConnection> {
        self.queue.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Bypass the connectivity filter, for exercising dequeue-side culling
    #[cfg(test)]
    pub(crate) fn push_unfiltered(&self, conn: ClientConnection) {
        self.queue.lock().push_back(conn);
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> ClientConnection {
        // No I/O happens in these tests, so the peer end can drop right away
        let (server_side, _client_side) = tokio::io::duplex(64);
        ClientConnection::new(server_side, "test".into())
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue = ReadyQueue::new();
        let (a, b, c) = (connection(), connection(), connection());
        let ids = [a.id(), b.id(), c.id()];
        queue.add_connections([a, b, c]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap().id(), ids[0]);
        assert_eq!(queue.pop().unwrap().id(), ids[1]);
        assert_eq!(queue.pop().unwrap().id(), ids[2]);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn disconnected_clients_are_dropped_at_enqueue() {
        let queue = ReadyQueue::new();
        let mut dead = connection();
        dead.mark_disconnected();
        queue.add_connections([dead, connection()]);

        assert_eq!(queue.len(), 1);
        assert!(queue.pop().unwrap().is_connected());
    }
}
