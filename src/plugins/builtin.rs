//! Built-in commands: `help`, `ping`, `stats`.

use crate::commands::{CommandContext, CommandDescriptor, Matcher};
use crate::error::CommandResult;
use crate::plugin::{Plugin, PluginEnv};
use async_trait::async_trait;
use futures_util::future::BoxFuture;

/// Most-used commands listed by `stats`.
const STATS_LIMIT: usize = 5;

pub struct CorePlugin;

#[async_trait]
impl Plugin for CorePlugin {
    type State = String;

    fn name(&self) -> &'static str {
        "core"
    }

    async fn init(&self, env: &PluginEnv) -> anyhow::Result<String> {
        Ok(env.config.factoids.prefix.clone())
    }

    fn commands(&self, prefix: &String) -> Vec<CommandDescriptor<String>> {
        let exact = |word: &str| {
            let command = format!("{prefix}{word}");
            Matcher::custom(move |text| (text.trim() == command).then(String::new))
        };
        vec![
            CommandDescriptor::new("help", 20, exact("help"), help).with_usage("help"),
            CommandDescriptor::new("ping", 20, exact("ping"), ping).with_usage("ping"),
            CommandDescriptor::new("stats", 20, exact("stats"), stats).with_usage("stats"),
        ]
    }
}

fn help<'a>(prefix: &'a mut String, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let mut usages = ctx.registry.usages();
        usages.sort();
        usages.dedup();
        let listed = usages
            .iter()
            .map(|usage| format!("{prefix}{usage}"))
            .collect::<Vec<_>>()
            .join(", ");
        ctx.handled(&format!("Commands: {listed}")).await
    })
}

fn ping<'a>(_: &'a mut String, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move { ctx.handled("pong").await })
}

fn stats<'a>(_: &'a mut String, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let usage = ctx
            .registry
            .command_stats()
            .into_iter()
            .take(STATS_LIMIT)
            .map(|s| format!("{}={}", s.name, s.calls))
            .collect::<Vec<_>>()
            .join(", ");
        ctx.handled(&format!("Usage: {usage}")).await
    })
}
