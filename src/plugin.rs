//! Plugin lifecycle: init, register commands, stop.
//!
//! A plugin owns one piece of state. [`start`] builds it, registers the
//! plugin's commands against it, and parks it behind an async mutex so each
//! command invocation gets exclusive access. [`RunningPlugin::stop`]
//! deregisters the commands, waits for any invocation still holding the
//! state, then hands the state back to the plugin exactly once.

use crate::bot::PrivMsg;
use crate::commands::{CommandDescriptor, CommandRegistry, SharedState};
use crate::config::Config;
use crate::signal::Signal;
use crate::telemetry::spans;
use anyhow::Context as _;
use async_trait::async_trait;
use factbot_proto::Message;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, info};

/// What a plugin may use while initializing.
///
/// Plugins talk to each other only through these signals.
#[derive(Debug, Clone)]
pub struct PluginEnv {
    pub config: Arc<Config>,
    /// Every inbound protocol message.
    pub messages: Signal<Message>,
    /// Inbound chat messages.
    pub privmsg: Signal<PrivMsg>,
}

/// A unit of bot functionality.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// State shared by the plugin's commands.
    type State: Send + 'static;

    /// Unique name, used to deregister the plugin's commands.
    fn name(&self) -> &'static str;

    async fn init(&self, env: &PluginEnv) -> anyhow::Result<Self::State>;

    fn commands(&self, state: &Self::State) -> Vec<CommandDescriptor<Self::State>>;

    /// Flush and release the state. Called once, after the commands are gone.
    async fn stop(&self, _state: Self::State) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
trait Lifecycle: Send + Sync {
    async fn stop(self: Box<Self>) -> anyhow::Result<()>;
}

struct Started<P: Plugin> {
    plugin: P,
    state: SharedState<P::State>,
}

#[async_trait]
impl<P: Plugin> Lifecycle for Started<P> {
    async fn stop(self: Box<Self>) -> anyhow::Result<()> {
        let state = self.state.lock().await.take();
        match state {
            Some(state) => self.plugin.stop(state).await,
            None => Ok(()),
        }
    }
}

/// A started plugin. Must be stopped to flush its state.
pub struct RunningPlugin {
    name: &'static str,
    lifecycle: Box<dyn Lifecycle>,
}

impl std::fmt::Debug for RunningPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningPlugin").field("name", &self.name).finish()
    }
}

/// Initialize `plugin` and register its commands.
pub async fn start<P: Plugin>(
    plugin: P,
    env: &PluginEnv,
    registry: &CommandRegistry,
) -> anyhow::Result<RunningPlugin> {
    let name = plugin.name();
    let state = plugin
        .init(env)
        .instrument(spans::plugin(name))
        .await
        .with_context(|| format!("plugin {name} failed to initialize"))?;

    let commands = plugin.commands(&state);
    let count = commands.len();
    let shared: SharedState<P::State> = Arc::new(Mutex::new(Some(state)));
    for command in commands {
        registry.register(name, command.bind(Arc::clone(&shared)));
    }
    info!(plugin = name, commands = count, "Plugin started");

    Ok(RunningPlugin {
        name,
        lifecycle: Box::new(Started {
            plugin,
            state: shared,
        }),
    })
}

impl RunningPlugin {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Deregister the plugin's commands and stop it.
    pub async fn stop(self, registry: &CommandRegistry) -> anyhow::Result<()> {
        let removed = registry.deregister_plugin(self.name);
        let name = self.name;
        self.lifecycle
            .stop()
            .instrument(spans::plugin(name))
            .await
            .with_context(|| format!("plugin {name} failed to stop"))?;
        info!(plugin = name, commands = removed, "Plugin stopped");
        Ok(())
    }
}
