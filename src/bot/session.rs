use crate::bot::client::{Outbox, ProtocolClient, triage};
use crate::bot::event::PrivMsg;
use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::plugin::{self, Plugin, PluginEnv, RunningPlugin};
use crate::signal::{Signal, SubscriptionId};
use factbot_proto::{Command, Frame, Message, ProtocolError, RPL_WELCOME};
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An IRC bot: inbound messages fan out over signals, chat messages go
/// through the command registry.
pub struct Bot {
    config: Arc<Config>,
    messages: Signal<Message>,
    privmsg: Signal<PrivMsg>,
    registry: CommandRegistry,
    plugins: Vec<RunningPlugin>,
}

impl Bot {
    pub fn new(config: Config) -> Self {
        let messages = Signal::new();
        let privmsg = messages.filter_map(|message: Message| PrivMsg::from_message(&message));
        let registry = CommandRegistry::new(config.reply.max_lines);
        Self {
            config: Arc::new(config),
            messages,
            privmsg,
            registry,
            plugins: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Every inbound protocol message.
    pub fn messages(&self) -> &Signal<Message> {
        &self.messages
    }

    /// Inbound chat messages.
    pub fn privmsg(&self) -> &Signal<PrivMsg> {
        &self.privmsg
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// What plugins see while initializing.
    pub fn env(&self) -> PluginEnv {
        PluginEnv {
            config: Arc::clone(&self.config),
            messages: self.messages.clone(),
            privmsg: self.privmsg.clone(),
        }
    }

    /// Start a plugin and register its commands.
    pub async fn add_plugin<P: Plugin>(&mut self, plugin: P) -> anyhow::Result<()> {
        let running = plugin::start(plugin, &self.env(), &self.registry).await?;
        self.plugins.push(running);
        Ok(())
    }

    /// Answer server housekeeping and dispatch commands, replying through
    /// `outbox`.
    pub fn attach(&self, outbox: &Outbox) -> [SubscriptionId; 2] {
        let housekeeping = {
            let outbox = outbox.clone();
            let channels = self.config.channels.clone();
            self.messages.subscribe_forever(move |message: Message| {
                let outbox = outbox.clone();
                let channels = channels.clone();
                async move {
                    housekeep(&message, &outbox, &channels).await;
                    Ok(())
                }
            })
        };
        let commands = self.registry.attach(&self.privmsg, outbox.clone());
        [housekeeping, commands]
    }

    /// Publish everything read from `inbound` until the stream ends or fails.
    ///
    /// Each message is fully dispatched before the next is read. Lines that
    /// fail to decode are logged and skipped. Returns the number of messages
    /// published.
    pub async fn run<S>(&self, mut inbound: S) -> usize
    where
        S: Stream<Item = Result<Frame, ProtocolError>> + Unpin,
    {
        let mut published = 0;
        while let Some(item) = inbound.next().await {
            match triage(item) {
                Some(Some(message)) => {
                    self.messages.publish(message).await;
                    published += 1;
                }
                Some(None) => {}
                None => break,
            }
        }
        info!(published, "Inbound stream ended");
        published
    }

    /// Stop every plugin, newest first, then say goodbye.
    pub async fn shutdown(self, outbox: &Outbox, reason: &str) -> anyhow::Result<()> {
        let Bot {
            registry, plugins, ..
        } = self;
        let mut first_error = None;
        for running in plugins.into_iter().rev() {
            if let Err(e) = running.stop(&registry).await {
                warn!(error = %format!("{e:#}"), "Plugin did not stop cleanly");
                first_error.get_or_insert(e);
            }
        }
        if let Err(e) = outbox.quit(Some(reason)).await {
            debug!(error = %e, "Could not send QUIT");
        }
        first_error.map_or(Ok(()), Err)
    }
}

async fn housekeep(message: &Message, outbox: &Outbox, channels: &[String]) {
    let result = match &message.command {
        Command::PING(token, _) => outbox.send(Message::pong(token.clone())).await,
        Command::Response(RPL_WELCOME, _) => {
            info!(channels = channels.len(), "Registered, joining channels");
            let mut result = Ok(());
            for channel in channels {
                result = outbox.join(channel).await;
                if result.is_err() {
                    break;
                }
            }
            result
        }
        Command::ERROR(reason) => {
            warn!(%reason, "Server sent ERROR");
            Ok(())
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        warn!(error = %e, "Housekeeping reply failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandDescriptor, Matcher};
    use async_trait::async_trait;
    use futures_util::stream;

    fn config() -> Config {
        Config::parse(
            r##"
            channels = ["#a", "#b"]

            [server]
            host = "127.0.0.1"

            [identity]
            nick = "factbot"
            "##,
        )
        .unwrap()
    }

    fn frames(lines: &[&str]) -> impl Stream<Item = Result<Frame, ProtocolError>> + Unpin {
        let items: Vec<_> = lines.iter().map(|line| Ok(line.parse::<Message>())).collect();
        stream::iter(items)
    }

    fn drain(rx: &mut tokio::sync::mpsc::Receiver<Message>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message.to_string().trim_end().to_string());
        }
        out
    }

    struct Echo;

    #[async_trait]
    impl Plugin for Echo {
        type State = ();

        fn name(&self) -> &'static str {
            "echo"
        }

        async fn init(&self, _env: &PluginEnv) -> anyhow::Result<()> {
            Ok(())
        }

        fn commands(&self, _state: &()) -> Vec<CommandDescriptor<()>> {
            vec![CommandDescriptor::new(
                "echo",
                0,
                Matcher::prefix("!echo "),
                |_, ctx| Box::pin(async move { ctx.handled(&ctx.residual).await }),
            )]
        }
    }

    #[tokio::test]
    async fn answers_ping_and_joins_after_welcome() {
        let bot = Bot::new(config());
        let (outbox, mut rx) = Outbox::channel(16);
        bot.attach(&outbox);

        let published = bot
            .run(frames(&["PING :tok", ":irc.example.net 001 factbot :Welcome"]))
            .await;
        assert_eq!(published, 2);
        assert_eq!(drain(&mut rx), vec!["PONG :tok", "JOIN #a", "JOIN #b"]);
    }

    #[tokio::test]
    async fn routes_commands_and_survives_bad_lines() {
        let mut bot = Bot::new(config());
        bot.add_plugin(Echo).await.unwrap();
        let (outbox, mut rx) = Outbox::channel(16);
        bot.attach(&outbox);

        let inbound = stream::iter(vec![
            Ok(Err(ProtocolError::IllegalControlChar('\x07'))),
            Ok(":alice!a@h PRIVMSG #a :!echo one".parse::<Message>()),
            Ok(":alice!a@h PRIVMSG factbot :!echo two".parse::<Message>()),
            Err(ProtocolError::Io(std::io::Error::other("reset"))),
            Ok(":alice!a@h PRIVMSG #a :!echo never".parse::<Message>()),
        ]);
        assert_eq!(bot.run(inbound).await, 2);
        assert_eq!(drain(&mut rx), vec!["PRIVMSG #a :one", "PRIVMSG alice :two"]);
    }

    #[tokio::test]
    async fn shutdown_stops_plugins_and_quits() {
        let mut bot = Bot::new(config());
        bot.add_plugin(Echo).await.unwrap();
        let registry = bot.registry().clone();
        let (outbox, mut rx) = Outbox::channel(16);

        bot.shutdown(&outbox, "bye").await.unwrap();
        assert!(registry.is_empty());
        assert_eq!(drain(&mut rx), vec!["QUIT :bye"]);
    }
}
