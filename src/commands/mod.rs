//! Priority-ordered commands matched against chat messages.
//!
//! Plugins describe their commands with [`CommandDescriptor`]s. The
//! [`CommandRegistry`] keeps every registered command sorted by descending
//! priority (ties keep registration order) and, for each incoming message,
//! runs the matching commands in that order until one reports
//! [`Outcome::Handled`].

pub mod matcher;
mod registry;

pub use matcher::{MatchFn, MatchResult, Matcher};
pub use registry::{CommandRegistry, CommandStats, Dispatch};

use crate::bot::{Outbox, PrivMsg};
use crate::error::CommandResult;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// What a command did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The message is claimed; lower-priority commands do not see it.
    Handled,
    /// Not for this command; try the next one.
    Skip,
}

/// Everything a command handler gets besides its plugin state.
#[derive(Clone)]
pub struct CommandContext {
    /// Name of the command being run.
    pub command: String,
    /// Text left over after the matcher consumed its part.
    pub residual: String,
    pub message: PrivMsg,
    pub outbox: Outbox,
    /// The registry dispatching this command.
    pub registry: CommandRegistry,
    /// Line limit for replies.
    pub max_lines: usize,
}

impl CommandContext {
    /// Whitespace-separated words of the residual.
    pub fn args(&self) -> std::str::SplitWhitespace<'_> {
        self.residual.split_whitespace()
    }

    /// Reply to the message's origin.
    pub async fn reply(&self, text: &str) -> CommandResult<()> {
        self.outbox.reply(&self.message, text, self.max_lines).await?;
        Ok(())
    }

    /// Reply and claim the message.
    pub async fn handled(&self, text: &str) -> CommandResult {
        self.reply(text).await?;
        Ok(Outcome::Handled)
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command)
            .field("residual", &self.residual)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// A command handler operating on plugin state `S`.
pub type CommandFn<S> = Arc<
    dyn for<'a> Fn(&'a mut S, CommandContext) -> BoxFuture<'a, CommandResult> + Send + Sync,
>;

/// Plugin state shared between a plugin's commands.
///
/// `None` once the plugin has been stopped.
pub type SharedState<S> = Arc<tokio::sync::Mutex<Option<S>>>;

type ErasedCommandFn = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, CommandResult> + Send + Sync>;

/// A named, prioritized command over plugin state `S`.
pub struct CommandDescriptor<S> {
    pub name: String,
    /// Higher runs first.
    pub priority: i32,
    pub matcher: Matcher,
    /// How a user types the command, without the prefix. Commands without
    /// one are not listed by `help`.
    pub usage: Option<String>,
    handler: CommandFn<S>,
}

impl<S: Send + 'static> CommandDescriptor<S> {
    pub fn new<F>(name: impl Into<String>, priority: i32, matcher: Matcher, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut S, CommandContext) -> BoxFuture<'a, CommandResult>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            priority,
            matcher,
            usage: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Tie the command to its plugin's state so it can be registered.
    ///
    /// Each invocation locks the state for the duration of the handler. A
    /// command whose state has been taken skips every message.
    pub fn bind(self, state: SharedState<S>) -> BoundCommand {
        let handler = self.handler;
        let erased: ErasedCommandFn =
            Arc::new(move |ctx: CommandContext| -> BoxFuture<'static, CommandResult> {
                let handler = Arc::clone(&handler);
                let state = Arc::clone(&state);
                async move {
                    let mut guard = state.lock().await;
                    match guard.as_mut() {
                        Some(state) => handler(state, ctx).await,
                        None => Ok(Outcome::Skip),
                    }
                }
                .boxed()
            });

        BoundCommand {
            name: self.name,
            priority: self.priority,
            matcher: self.matcher,
            usage: self.usage,
            handler: erased,
        }
    }
}

impl<S> fmt::Debug for CommandDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("matcher", &self.matcher)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// A descriptor bound to its state, ready for [`CommandRegistry::register`].
pub struct BoundCommand {
    name: String,
    priority: i32,
    matcher: Matcher,
    usage: Option<String>,
    handler: ErasedCommandFn,
}

impl BoundCommand {
    pub fn name(&self) -> &str {
        &self.name
    }
}
