//! TCP accept loop - feeds new connections into the ready queue

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::scheduler::ReadyQueue;

use super::client::ClientConnection;

/// Accept connections forever, handing each one to the ready queue.
/// Runs as its own task, independent of match scheduling.
pub async fn run(listener: TcpListener, queue: Arc<ReadyQueue>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let client = ClientConnection::new(stream, addr.to_string());
                info!(client_id = %client.id(), peer = %addr, "Client connected");
                queue.add_connections([client]);
            }
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
            }
        }
    }
}
