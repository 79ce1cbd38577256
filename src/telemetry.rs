//! Tracing helpers for dispatch timing and span construction.

use std::time::Instant;

/// Guard that logs how long a command ran when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::trace!(
            command = %self.command,
            elapsed_us = elapsed.as_micros() as u64,
            "Command finished"
        );
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span for one server connection.
    pub fn connection(address: &str, nick: &str) -> Span {
        info_span!("connection", address = %address, nick = %nick)
    }

    /// Span for a plugin's init or stop.
    pub fn plugin(name: &str) -> Span {
        info_span!("plugin", name = %name)
    }

    /// Span for one command invocation.
    pub fn command(name: &str, source: &str, target: &str) -> Span {
        debug_span!("command", name = %name, source = %source, target = %target)
    }
}
