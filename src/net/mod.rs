//! Network layer - framing, protocol types, client connections

pub mod acceptor;
pub mod client;
pub mod frame;
pub mod protocol;

pub use client::{ClientConnection, ClientId};
