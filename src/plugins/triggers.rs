//! Regex triggers with templated replies.
//!
//! Each configured trigger becomes a low-priority command, so it only fires
//! on messages no other command claimed. `{nick}` and `{channel}` in the
//! reply are replaced with the sender and the message target.

use crate::commands::{CommandContext, CommandDescriptor, Matcher};
use crate::plugin::{Plugin, PluginEnv};
use anyhow::Context as _;
use async_trait::async_trait;
use regex::Regex;

/// Priority of every trigger.
pub const TRIGGER_PRIORITY: i32 = -10;

#[derive(Debug, Clone)]
pub struct Trigger {
    pub pattern: Regex,
    pub reply: String,
}

impl Trigger {
    fn render(&self, ctx: &CommandContext) -> String {
        self.reply
            .replace("{nick}", &ctx.message.source)
            .replace("{channel}", &ctx.message.target)
    }
}

pub struct TriggerPlugin;

#[async_trait]
impl Plugin for TriggerPlugin {
    type State = Vec<Trigger>;

    fn name(&self) -> &'static str {
        "triggers"
    }

    async fn init(&self, env: &PluginEnv) -> anyhow::Result<Vec<Trigger>> {
        env.config
            .triggers
            .iter()
            .map(|t| -> anyhow::Result<Trigger> {
                let pattern = Regex::new(&t.pattern)
                    .with_context(|| format!("invalid trigger pattern {:?}", t.pattern))?;
                Ok(Trigger {
                    pattern,
                    reply: t.reply.clone(),
                })
            })
            .collect()
    }

    fn commands(&self, triggers: &Vec<Trigger>) -> Vec<CommandDescriptor<Vec<Trigger>>> {
        triggers
            .iter()
            .enumerate()
            .map(|(i, trigger)| {
                let template = trigger.clone();
                CommandDescriptor::new(
                    format!("trigger{i}"),
                    TRIGGER_PRIORITY,
                    Matcher::Regex(trigger.pattern.clone()),
                    move |_, ctx| {
                        let reply = template.render(&ctx);
                        Box::pin(async move { ctx.handled(&reply).await })
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{Outbox, PrivMsg};
    use crate::commands::CommandRegistry;
    use crate::config::Config;
    use crate::plugin;
    use crate::signal::Signal;
    use std::sync::Arc;

    #[tokio::test]
    async fn trigger_replies_with_template() {
        let config = Config::parse(
            r#"
            [server]
            host = "h"

            [identity]
            nick = "fb"

            [[triggers]]
            pattern = "(?i)\\bhello fb\\b"
            reply = "hello, {nick}! welcome to {channel}"
            "#,
        )
        .unwrap();
        let env = PluginEnv {
            config: Arc::new(config),
            messages: Signal::new(),
            privmsg: Signal::new(),
        };
        let registry = CommandRegistry::new(5);
        let running = plugin::start(TriggerPlugin, &env, &registry).await.unwrap();
        let (outbox, mut rx) = Outbox::channel(8);

        let report = registry
            .dispatch(&PrivMsg::new("bob", "#rust", "well Hello FB"), &outbox)
            .await;
        assert_eq!(report.claimed_by.as_deref(), Some("trigger0"));
        assert_eq!(
            rx.recv().await.unwrap().to_string(),
            "PRIVMSG #rust :hello, bob! welcome to #rust\r\n"
        );

        let report = registry
            .dispatch(&PrivMsg::new("bob", "#rust", "othello fb"), &outbox)
            .await;
        assert_eq!(report.invoked, 0);
        running.stop(&registry).await.unwrap();
    }
}
