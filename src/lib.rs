//! Authoritative match server for a turn-based grid skirmish game.
//!
//! Clients connect over TCP and are paired first-come-first-served into
//! matches. Each match runs rounds of move/shoot operations: the server
//! validates every operation, resolves bullet ballistics, and broadcasts a
//! full state snapshot to every participant after each round.

pub mod arena;
pub mod config;
pub mod game;
pub mod net;
pub mod scheduler;
