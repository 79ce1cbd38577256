//! factbot - a factoid IRC bot built on a typed signal bus.
//!
//! Inbound protocol messages are published on a [`signal::Signal`]; chat
//! messages are derived from them and fed to a priority-ordered
//! [`commands::CommandRegistry`] populated by [`plugin::Plugin`]s.

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod plugin;
pub mod plugins;
pub mod signal;
pub mod telemetry;

pub use bot::{Bot, Outbox, PrivMsg};
pub use commands::{CommandContext, CommandDescriptor, CommandRegistry, Matcher, Outcome};
pub use config::Config;
pub use plugin::{Plugin, PluginEnv};
pub use signal::{Flow, Signal};
