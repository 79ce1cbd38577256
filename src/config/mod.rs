//! Configuration loading and management.
//!
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks run by [`Config::load`]

mod defaults;
mod validation;

pub use validation::{ValidationError, validate};

use defaults::{
    default_factoid_path, default_max_line_len, default_max_lines, default_port,
    default_prefix,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", format_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Channels joined once the server welcomes us.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Server to connect to.
    pub server: ServerConfig,
    /// Nick, user and realname.
    pub identity: IdentityConfig,
    /// Reply shaping.
    #[serde(default)]
    pub reply: ReplyConfig,
    /// Factoid plugin settings.
    #[serde(default)]
    pub factoids: FactoidConfig,
    /// Regex triggers.
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

/// Upstream IRC server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname or address (e.g., "irc.libera.chat").
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional server password sent with PASS.
    pub password: Option<String>,
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity presented during registration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub nick: String,
    /// Username; defaults to the nick.
    pub user: Option<String>,
    /// Realname; defaults to the nick.
    pub realname: Option<String>,
}

impl IdentityConfig {
    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or(&self.nick)
    }

    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }
}

/// Limits applied to outgoing replies.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyConfig {
    /// Replies with more lines than this are truncated.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    /// Maximum inbound line length accepted by the codec.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_line_len: default_max_line_len(),
        }
    }
}

/// Factoid storage.
#[derive(Debug, Clone, Deserialize)]
pub struct FactoidConfig {
    /// Snapshot file.
    #[serde(default = "default_factoid_path")]
    pub path: PathBuf,
    /// Leading text that marks a bot command (e.g., "!").
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for FactoidConfig {
    fn default() -> Self {
        Self {
            path: default_factoid_path(),
            prefix: default_prefix(),
        }
    }
}

/// A regex trigger and its reply template.
///
/// `{nick}` and `{channel}` in the reply are substituted.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerConfig {
    pub pattern: String,
    pub reply: String,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        host = "irc.example.net"

        [identity]
        nick = "factbot"
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.server.address(), "irc.example.net:6667");
        assert_eq!(config.identity.user(), "factbot");
        assert_eq!(config.identity.realname(), "factbot");
        assert_eq!(config.reply.max_lines, 5);
        assert_eq!(config.factoids.prefix, "!");
        assert_eq!(config.factoids.path, PathBuf::from("factoids.json"));
        assert!(config.channels.is_empty());
        assert!(config.triggers.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let config = Config::parse(
            r##"
            channels = ["#factbot", "#rust"]

            [server]
            host = "127.0.0.1"
            port = 6697

            [identity]
            nick = "fb"
            user = "factbot"
            realname = "Factoid Bot"

            [reply]
            max_lines = 8

            [factoids]
            path = "/tmp/facts.json"
            prefix = "?"

            [[triggers]]
            pattern = "(?i)hello fb"
            reply = "hi {nick}"
            "##,
        )
        .unwrap();

        assert_eq!(config.channels, vec!["#factbot", "#rust"]);
        assert_eq!(config.server.port, 6697);
        assert_eq!(config.identity.realname(), "Factoid Bot");
        assert_eq!(config.reply.max_lines, 8);
        assert_eq!(config.reply.max_line_len, 512);
        assert_eq!(config.factoids.prefix, "?");
        assert_eq!(config.triggers.len(), 1);
    }

    #[test]
    fn invalid_config_reports_every_problem() {
        let err = Config::parse(
            r#"
            channels = ["nochan"]

            [server]
            host = "irc.example.net"

            [identity]
            nick = ""

            [reply]
            max_lines = 0
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Invalid(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn example_config_is_valid() {
        let config = Config::parse(include_str!("../../factbot.example.toml")).unwrap();
        assert_eq!(config.channels, vec!["#factbot"]);
        assert_eq!(config.triggers.len(), 1);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            Config::parse("[server"),
            Err(ConfigError::Parse(_))
        ));
    }
}
