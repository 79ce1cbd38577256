//! Command registration and dispatch.

use super::{BoundCommand, CommandContext, ErasedCommandFn, MatchResult, Matcher, Outcome};
use crate::bot::{Outbox, PrivMsg};
use crate::signal::{Signal, SubscriptionId};
use crate::telemetry::{CommandTimer, spans};
use futures_util::FutureExt;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug, error, warn};

struct RegisteredCommand {
    plugin: String,
    name: String,
    priority: i32,
    matcher: Matcher,
    usage: Option<String>,
    handler: ErasedCommandFn,
    calls: AtomicU64,
}

/// Usage counter for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStats {
    pub name: String,
    pub plugin: String,
    pub calls: u64,
}

/// What happened to one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// The command that returned [`Outcome::Handled`], if any.
    pub claimed_by: Option<String>,
    /// Handlers invoked, including the claiming one.
    pub invoked: usize,
}

/// Registered commands in dispatch order.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct CommandRegistry {
    commands: Arc<RwLock<Vec<Arc<RegisteredCommand>>>>,
    max_lines: usize,
}

impl CommandRegistry {
    /// Create an empty registry whose replies are capped at `max_lines`.
    pub fn new(max_lines: usize) -> Self {
        Self {
            commands: Arc::new(RwLock::new(Vec::new())),
            max_lines,
        }
    }

    /// Register a command on behalf of `plugin`.
    ///
    /// It is placed after every command with the same or higher priority.
    pub fn register(&self, plugin: &str, command: BoundCommand) {
        let BoundCommand {
            name,
            priority,
            matcher,
            usage,
            handler,
        } = command;
        debug!(%plugin, command = %name, priority, "Registering command");

        let entry = Arc::new(RegisteredCommand {
            plugin: plugin.to_string(),
            name,
            priority,
            matcher,
            usage,
            handler,
            calls: AtomicU64::new(0),
        });
        let mut commands = self.commands.write();
        let at = commands.partition_point(|c| c.priority >= priority);
        commands.insert(at, entry);
    }

    /// Remove every command registered by `plugin`. Returns how many went.
    pub fn deregister_plugin(&self, plugin: &str) -> usize {
        let mut commands = self.commands.write();
        let before = commands.len();
        commands.retain(|c| c.plugin != plugin);
        before - commands.len()
    }

    /// Command names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.commands.read().iter().map(|c| c.name.clone()).collect()
    }

    /// Usage strings of the commands users can type, in dispatch order.
    pub fn usages(&self) -> Vec<String> {
        self.commands
            .read()
            .iter()
            .filter_map(|c| c.usage.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Usage statistics for commands that have run at least once, busiest
    /// first.
    pub fn command_stats(&self) -> Vec<CommandStats> {
        let mut stats: Vec<_> = self
            .commands
            .read()
            .iter()
            .map(|c| CommandStats {
                name: c.name.clone(),
                plugin: c.plugin.clone(),
                calls: c.calls.load(Ordering::Relaxed),
            })
            .filter(|s| s.calls > 0)
            .collect();
        stats.sort_by(|a, b| b.calls.cmp(&a.calls));
        stats
    }

    /// Run matching commands against `message` until one claims it.
    ///
    /// A handler that fails or panics is logged and counts as
    /// [`Outcome::Skip`]; a panicking matcher counts as no match.
    pub async fn dispatch(&self, message: &PrivMsg, outbox: &Outbox) -> Dispatch {
        let snapshot: Vec<Arc<RegisteredCommand>> = self.commands.read().clone();
        let mut report = Dispatch::default();

        for command in snapshot {
            let matched = panic::catch_unwind(AssertUnwindSafe(|| {
                command.matcher.matches(&message.text)
            }));
            let residual = match matched {
                Ok(MatchResult::Match(residual)) => residual,
                Ok(MatchResult::NoMatch) => continue,
                Err(_) => {
                    error!(
                        command = %command.name,
                        plugin = %command.plugin,
                        "Matcher panicked"
                    );
                    continue;
                }
            };
            command.calls.fetch_add(1, Ordering::Relaxed);
            report.invoked += 1;

            let ctx = CommandContext {
                command: command.name.clone(),
                residual,
                message: message.clone(),
                outbox: outbox.clone(),
                registry: self.clone(),
                max_lines: self.max_lines,
            };
            let span = spans::command(&command.name, &message.source, &message.target);
            let _timer = CommandTimer::new(&command.name);
            let result = AssertUnwindSafe((command.handler)(ctx))
                .catch_unwind()
                .instrument(span)
                .await;

            match result {
                Ok(Ok(Outcome::Handled)) => {
                    report.claimed_by = Some(command.name.clone());
                    break;
                }
                Ok(Ok(Outcome::Skip)) => {}
                Ok(Err(e)) => {
                    warn!(
                        command = %command.name,
                        plugin = %command.plugin,
                        code = e.error_code(),
                        error = %e,
                        "Command failed"
                    );
                }
                Err(_) => {
                    error!(
                        command = %command.name,
                        plugin = %command.plugin,
                        "Command panicked"
                    );
                }
            }
        }
        report
    }

    /// Dispatch every message published on `messages`, replying through
    /// `outbox`.
    pub fn attach(&self, messages: &Signal<PrivMsg>, outbox: Outbox) -> SubscriptionId {
        let registry = self.clone();
        messages.subscribe_forever(move |message: PrivMsg| {
            let registry = registry.clone();
            let outbox = outbox.clone();
            async move {
                let report = registry.dispatch(&message, &outbox).await;
                debug!(
                    source = %message.source,
                    claimed_by = report.claimed_by.as_deref(),
                    invoked = report.invoked,
                    "Dispatched"
                );
                Ok(())
            }
        })
    }
}
