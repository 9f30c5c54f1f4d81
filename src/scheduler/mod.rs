//! Match scheduling - ready queue, pairing policy, bounded runner

pub mod fifo;
pub mod queue;
pub mod runner;

pub use fifo::{FifoScheduler, MatchScheduler, SchedulerError};
pub use queue::ReadyQueue;
pub use runner::MatchRunner;
