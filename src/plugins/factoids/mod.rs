//! Factoids: user-taught snippets and counters.
//!
//! | Command              | Priority | Effect                          |
//! |----------------------|----------|---------------------------------|
//! | `!see <key>`         | 10       | list every entry                |
//! | `!search <term>`     | 10       | keys matching a term            |
//! | `!random <key>`      | 10       | one random entry                |
//! | `!set <key> <text>`  | 10       | replace                         |
//! | `!add <key> <text>`  | 10       | append                          |
//! | `!forget <key>`      | 10       | delete                          |
//! | `!reload`            | 10       | re-read the file                |
//! | `!<key>++`/`!<key>--`| 8        | bump a counter                  |
//! | `!<key>`             | 0        | look up, skip if unknown        |
//!
//! A counter bump skips when the whole of `<key>++` is itself a stored key,
//! so `!c++` reaches the lookup for a factoid named `c++`.

pub mod store;

pub use store::{FactoidStore, FactoidValue, is_valid_key};

use crate::commands::{CommandContext, CommandDescriptor, Matcher, Outcome};
use crate::error::{CommandResult, StoreError};
use crate::plugin::{Plugin, PluginEnv};
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use rand::seq::SliceRandom;

/// The factoid plugin.
pub struct FactoidPlugin;

/// State owned by the factoid commands.
#[derive(Debug)]
pub struct FactoidState {
    pub store: FactoidStore,
    prefix: String,
}

#[async_trait]
impl Plugin for FactoidPlugin {
    type State = FactoidState;

    fn name(&self) -> &'static str {
        "factoids"
    }

    async fn init(&self, env: &PluginEnv) -> anyhow::Result<FactoidState> {
        let settings = &env.config.factoids;
        Ok(FactoidState {
            store: FactoidStore::open(&settings.path).await,
            prefix: settings.prefix.clone(),
        })
    }

    fn commands(&self, state: &FactoidState) -> Vec<CommandDescriptor<FactoidState>> {
        let p = state.prefix.as_str();
        let counter_prefix = state.prefix.clone();
        let reload = format!("{p}reload");
        vec![
            CommandDescriptor::new("see", 10, Matcher::prefix(format!("{p}see ")), see)
                .with_usage("see <key>"),
            CommandDescriptor::new("search", 10, Matcher::prefix(format!("{p}search ")), search)
                .with_usage("search <term>"),
            CommandDescriptor::new("random", 10, Matcher::prefix(format!("{p}random ")), random)
                .with_usage("random <key>"),
            CommandDescriptor::new("set", 10, Matcher::prefix(format!("{p}set ")), set)
                .with_usage("set <key> <text>"),
            CommandDescriptor::new("add", 10, Matcher::prefix(format!("{p}add ")), add)
                .with_usage("add <key> <text>"),
            CommandDescriptor::new("forget", 10, Matcher::prefix(format!("{p}forget ")), forget)
                .with_usage("forget <key>"),
            CommandDescriptor::new(
                "reload",
                10,
                Matcher::custom(move |text| (text.trim_end() == reload).then(String::new)),
                reload_file,
            )
            .with_usage("reload"),
            CommandDescriptor::new(
                "counter",
                8,
                Matcher::custom(move |text| {
                    let rest = text.trim_end().strip_prefix(counter_prefix.as_str())?;
                    let key = rest.strip_suffix("++").or_else(|| rest.strip_suffix("--"))?;
                    is_valid_key(key).then(|| rest.to_string())
                }),
                bump,
            )
            .with_usage("<key>++"),
            CommandDescriptor::new("lookup", 0, Matcher::prefix(p), lookup).with_usage("<key>"),
        ]
    }

    async fn stop(&self, state: FactoidState) -> anyhow::Result<()> {
        state.store.save().await?;
        Ok(())
    }
}

/// The residual as a single key, if it is one.
fn single_key(ctx: &CommandContext) -> Option<&str> {
    let key = ctx.residual.trim();
    is_valid_key(key).then_some(key)
}

/// `key` and the rest of the line.
fn key_and_text(ctx: &CommandContext) -> Option<(&str, &str)> {
    let (key, text) = ctx.residual.trim().split_once(char::is_whitespace)?;
    let text = text.trim();
    (is_valid_key(key) && !text.is_empty()).then_some((key, text))
}

fn summary(key: &str, value: &FactoidValue) -> String {
    match value {
        FactoidValue::Counter(n) => format!("{key} is {n}"),
        FactoidValue::List(items) => format!("{key} is {}", items.join(" | ")),
    }
}

/// Reply with a store error the user can act on; other errors propagate.
async fn reply_store_error(ctx: &CommandContext, error: StoreError) -> CommandResult {
    match error {
        StoreError::WrongType { .. } | StoreError::NotFound(_) => {
            ctx.handled(&error.to_string()).await
        }
        other => Err(other.into()),
    }
}

fn pick(items: &[String]) -> Option<&String> {
    items.choose(&mut rand::thread_rng())
}

fn see<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let Some(key) = single_key(&ctx) else {
            return Ok(Outcome::Skip);
        };
        let text = match state.store.get(key) {
            None => return Ok(Outcome::Skip),
            Some(FactoidValue::Counter(n)) => format!("{key} is {n}"),
            Some(FactoidValue::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{key}[{}]: {item}", i + 1))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        ctx.handled(&text).await
    })
}

fn search<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let term = ctx.residual.trim();
        if term.is_empty() {
            return Ok(Outcome::Skip);
        }
        let keys = state.store.search(term);
        let text = if keys.is_empty() {
            format!("No factoids match '{term}'")
        } else {
            format!("Matches: {}", keys.join(", "))
        };
        ctx.handled(&text).await
    })
}

fn random<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let Some(key) = single_key(&ctx) else {
            return Ok(Outcome::Skip);
        };
        let text = match state.store.get(key) {
            None => return Ok(Outcome::Skip),
            Some(FactoidValue::Counter(n)) => format!("{key} is {n}"),
            Some(FactoidValue::List(items)) => match pick(items) {
                Some(item) => format!("{key} is {item}"),
                None => format!("{key} is empty"),
            },
        };
        ctx.handled(&text).await
    })
}

fn set<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let Some((key, text)) = key_and_text(&ctx) else {
            return Ok(Outcome::Skip);
        };
        state.store.set(key, text).await?;
        ctx.handled(&format!("OK, {key} is now {text}")).await
    })
}

fn add<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let Some((key, text)) = key_and_text(&ctx) else {
            return Ok(Outcome::Skip);
        };
        match state.store.append(key, text).await {
            Ok(len) => ctx.handled(&format!("OK, {key} has {len} entries")).await,
            Err(e) => reply_store_error(&ctx, e).await,
        }
    })
}

fn forget<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let Some(key) = single_key(&ctx) else {
            return Ok(Outcome::Skip);
        };
        match state.store.forget(key).await {
            Ok(_) => ctx.handled(&format!("Forgot {key}")).await,
            Err(e) => reply_store_error(&ctx, e).await,
        }
    })
}

fn reload_file<'a>(
    state: &'a mut FactoidState,
    ctx: CommandContext,
) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let count = state.store.reload().await;
        ctx.handled(&format!("Reloaded {count} factoids")).await
    })
}

fn bump<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        // `!c++` names the factoid `c++` when one exists.
        if state.store.get(&ctx.residual).is_some() {
            return Ok(Outcome::Skip);
        }
        let (key, delta) = match ctx.residual.strip_suffix("++") {
            Some(key) => (key, 1),
            None => match ctx.residual.strip_suffix("--") {
                Some(key) => (key, -1),
                None => return Ok(Outcome::Skip),
            },
        };
        match state.store.increment(key, delta).await {
            Ok(n) => ctx.handled(&format!("{key} is now {n}")).await,
            Err(e) => reply_store_error(&ctx, e).await,
        }
    })
}

fn lookup<'a>(state: &'a mut FactoidState, ctx: CommandContext) -> BoxFuture<'a, CommandResult> {
    Box::pin(async move {
        let Some(key) = single_key(&ctx) else {
            return Ok(Outcome::Skip);
        };
        match state.store.get(key) {
            Some(value) => ctx.handled(&summary(key, value)).await,
            None => Ok(Outcome::Skip),
        }
    })
}
