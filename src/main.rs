//! factbot - factoid IRC bot.

use anyhow::Context as _;
use factbot::bot::{self, Bot};
use factbot::config::Config;
use factbot::plugins::{CorePlugin, FactoidPlugin, TriggerPlugin};
use factbot::telemetry::spans;
use tracing::{Instrument, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "factbot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.address(),
        nick = %config.identity.nick,
        channels = config.channels.len(),
        "Starting factbot"
    );

    let mut bot = Bot::new(config);
    bot.add_plugin(CorePlugin).await?;
    bot.add_plugin(FactoidPlugin).await?;
    bot.add_plugin(TriggerPlugin).await?;

    let address = bot.config().server.address();
    let span = spans::connection(&address, &bot.config().identity.nick);
    let mut connection = bot::connect(bot.config())
        .instrument(span.clone())
        .await
        .with_context(|| format!("failed to connect to {address}"))?;

    bot.attach(&connection.outbox);

    let reason = tokio::select! {
        _ = bot.run(&mut connection.inbound).instrument(span) => "connection closed",
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for ctrl-c");
            }
            "shutting down"
        }
    };
    info!(reason, "Stopping");

    let outbox = connection.outbox.clone();
    let stopped = bot.shutdown(&outbox, reason).await;
    drop(outbox);
    connection.finish().await;
    stopped
}
