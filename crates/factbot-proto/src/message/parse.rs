//! `FromStr` for [`Message`].

use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

use super::nom_parser::Line;
use super::tags::unescape_tag_value;
use super::types::{Message, Tag};

/// `key[=value];...` into tags; empty entries are ignored.
fn split_tags(raw: &str) -> Vec<Tag> {
    raw.split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => Tag(key.to_owned(), Some(unescape_tag_value(value))),
            None => Tag(entry.to_owned(), None),
        })
        .collect()
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            line: s.to_owned(),
            cause,
        };

        if s.trim_end_matches(['\r', '\n']).is_empty() {
            return Err(invalid(MessageParseError::Empty));
        }

        let line = Line::parse(s).map_err(|failure| {
            invalid(MessageParseError::Syntax {
                position: failure.position,
                kind: format!("{:?}", failure.kind),
            })
        })?;

        let prefix = line
            .source
            .map(Prefix::try_from_str)
            .transpose()
            .map_err(invalid)?;
        let command = Command::new(line.verb, line.params.to_vec()).map_err(invalid)?;

        Ok(Message {
            tags: line.tags.map(split_tags),
            prefix,
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ping() {
        let msg: Message = "PING :server\r\n".parse().unwrap();
        assert_eq!(msg.command, Command::PING("server".into(), None));
    }

    #[test]
    fn parses_privmsg_with_prefix() {
        let msg: Message = ":nick!user@host PRIVMSG #channel :Hello, world!\r\n"
            .parse()
            .unwrap();
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#channel".into(), "Hello, world!".into())
        );
        assert_eq!(msg.source_nickname(), Some("nick"));
    }

    #[test]
    fn parses_escaped_tags() {
        let msg: Message = "@msgid=abc;key=value\\swith\\sspace PING :test\r\n"
            .parse()
            .unwrap();
        assert_eq!(msg.tag_value("msgid"), Some("abc"));
        assert_eq!(msg.tag_value("key"), Some("value with space"));
    }

    #[test]
    fn rejects_empty_lines() {
        assert!("".parse::<Message>().is_err());
        assert!("\r\n".parse::<Message>().is_err());
    }

    #[test]
    fn rejects_privmsg_without_text() {
        let err = ":nick PRIVMSG #chan".parse::<Message>().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidMessage {
                cause: MessageParseError::MissingParams { .. },
                ..
            }
        ));
    }

    #[test]
    fn valueless_tags_are_kept() {
        let msg: Message = "@draft/bot;msgid=1 PING :x".parse().unwrap();
        assert_eq!(
            msg.tags,
            Some(vec![
                Tag("draft/bot".into(), None),
                Tag("msgid".into(), Some("1".into())),
            ])
        );
        assert_eq!(msg.tag_value("draft/bot"), None);
    }
}
