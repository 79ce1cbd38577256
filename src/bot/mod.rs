//! The dispatch loop and its protocol-facing pieces.
//!
//! - [`event`]: decoding chat messages from raw traffic
//! - [`reply`]: line splitting and truncation
//! - [`client`]: the protocol client boundary and TCP connection
//! - [`session`]: the [`Bot`] tying signals, plugins and the registry together

pub mod client;
pub mod event;
pub mod reply;
mod session;

pub use client::{Connection, Outbox, ProtocolClient, connect};
pub use event::PrivMsg;
pub use reply::split_reply;
pub use session::Bot;
