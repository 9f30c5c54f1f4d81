//! Skirmish match server - entry point
//!
//! Wires the pieces together: TCP acceptor feeding the ready queue, FIFO
//! scheduler pairing connections, bounded runner executing matches.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_server::arena::RandomArenaBuilder;
use skirmish_server::config::Config;
use skirmish_server::game::{DiscardLogSink, MatchLogSink};
use skirmish_server::net::acceptor;
use skirmish_server::scheduler::{FifoScheduler, MatchRunner, MatchScheduler, ReadyQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting skirmish match server");

    let arena_seed = config.arena_seed.unwrap_or_else(rand::random::<u64>);
    info!(
        arena_seed,
        width = config.arena_width,
        height = config.arena_height,
        "Arena generation configured"
    );

    let arena = RandomArenaBuilder::new(config.arena_width, config.arena_height, arena_seed);
    let log_sink: Arc<dyn MatchLogSink> = Arc::new(DiscardLogSink);
    let queue = Arc::new(ReadyQueue::new());

    let scheduler: Arc<dyn MatchScheduler> = Arc::new(FifoScheduler::new(
        Arc::clone(&queue),
        arena,
        log_sink,
        config.players_per_match,
        config.recv_timeout,
    ));
    let runner = MatchRunner::new(
        scheduler,
        config.max_concurrent_matches,
        config.poll_interval,
    );

    let listener = TcpListener::bind(config.server_addr).await?;
    info!("Listening for clients on {}", config.server_addr);

    // Connection acceptance runs independently of match scheduling
    tokio::spawn(acceptor::run(listener, queue));

    // Drive the runner until shutdown; in-flight matches are left to finish
    tokio::select! {
        _ = runner.run() => {}
        _ = shutdown_signal() => {
            info!("Shutdown requested, no further matches will start");
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
