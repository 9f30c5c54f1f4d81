//! Bounded-concurrency match execution

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::game::state::MatchId;

use super::fifo::MatchScheduler;

/// Drives matches from a scheduler onto spawned tasks, never more than
/// `max_concurrent_matches` at once.
///
/// Deliberately a polling design: when the pool is full or the scheduler has
/// nothing, sleep a fixed interval and ask again. That trades a little
/// dispatch latency for a hard concurrency ceiling and no queue growth.
/// Stopping the loop (dropping its future) is cooperative and leaves
/// in-flight matches running to completion.
pub struct MatchRunner {
    scheduler: Arc<dyn MatchScheduler>,
    max_concurrent_matches: usize,
    poll_interval: Duration,
}

impl MatchRunner {
    pub fn new(
        scheduler: Arc<dyn MatchScheduler>,
        max_concurrent_matches: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            scheduler,
            max_concurrent_matches,
            poll_interval,
        }
    }

    pub async fn run(self) {
        info!(
            max_concurrent_matches = self.max_concurrent_matches,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Match runner started"
        );

        let active = Arc::new(AtomicUsize::new(0));
        let mut next_match_id = 1u64;

        loop {
            if active.load(Ordering::Acquire) < self.max_concurrent_matches {
                match self.scheduler.next_match(MatchId(next_match_id)) {
                    Ok(Some(simulator)) => {
                        next_match_id += 1;
                        active.fetch_add(1, Ordering::AcqRel);
                        let active = Arc::clone(&active);
                        tokio::spawn(async move {
                            simulator.run().await;
                            active.fetch_sub(1, Ordering::AcqRel);
                        });
                        // Something was ready; ask again right away
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        // The failed match never starts; keep polling
                        error!(match_id = next_match_id, error = %e, "Failed to schedule match");
                    }
                }
            } else {
                debug!(
                    active = active.load(Ordering::Acquire),
                    "Match pool full, waiting"
                );
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
