//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use factbot_proto::ChannelExt;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.host is required")]
    MissingHost,
    #[error("identity.nick is required")]
    MissingNick,
    #[error("identity.nick must not contain spaces: '{0}'")]
    InvalidNick(String),
    #[error("'{0}' is not a channel name")]
    InvalidChannel(String),
    #[error("reply.max_lines must be at least 1")]
    ZeroMaxLines,
    #[error("factoids.prefix must not be empty")]
    EmptyPrefix,
    #[error("trigger pattern '{pattern}' does not compile: {reason}")]
    InvalidTrigger { pattern: String, reason: String },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.is_empty() {
        errors.push(ValidationError::MissingHost);
    }

    let nick = &config.identity.nick;
    if nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    } else if nick.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidNick(nick.clone()));
    }

    for channel in &config.channels {
        if !channel.is_channel_name() {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    if config.reply.max_lines == 0 {
        errors.push(ValidationError::ZeroMaxLines);
    }

    if config.factoids.prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    }

    for trigger in &config.triggers {
        if let Err(e) = regex::Regex::new(&trigger.pattern) {
            errors.push(ValidationError::InvalidTrigger {
                pattern: trigger.pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_uncompilable_trigger() {
        let config = Config::parse(
            r#"
            [server]
            host = "irc.example.net"
            [identity]
            nick = "bot"
            [[triggers]]
            pattern = "(unclosed"
            reply = "x"
            "#,
        );
        let Err(crate::config::ConfigError::Invalid(errors)) = config else {
            panic!("expected validation failure");
        };
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidTrigger { .. }]
        ));
    }

    #[test]
    fn rejects_nick_with_spaces() {
        let config = Config::parse(
            r#"
            [server]
            host = "irc.example.net"
            [identity]
            nick = "fact bot"
            "#,
        );
        assert!(config.is_err());
    }
}
