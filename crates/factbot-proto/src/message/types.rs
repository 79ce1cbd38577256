//! The message model.

use crate::chan::ChannelExt;
use crate::command::Command;
use crate::prefix::Prefix;

/// One `key[=value]` entry from a message's tag section.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tag(pub String, pub Option<String>);

/// A message as read from or written to the wire.
///
/// ```
/// use factbot_proto::Message;
///
/// let msg: Message = ":alice!a@host PRIVMSG #rust :is it fast?".parse().unwrap();
/// assert_eq!(msg.response_target(), Some("#rust"));
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Tags the server attached; never written back out.
    pub tags: Option<Vec<Tag>>,
    /// Who sent it. Messages the bot writes leave this empty.
    pub prefix: Option<Prefix>,
    pub command: Command,
}

impl Message {
    /// Sender's nick, when the source is a user rather than a server.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Where an answer belongs: the channel for channel traffic, otherwise
    /// the sender.
    pub fn response_target(&self) -> Option<&str> {
        match &self.command {
            Command::PRIVMSG(target, _) | Command::NOTICE(target, _)
                if target.is_channel_name() =>
            {
                Some(target.as_str())
            }
            _ => self.source_nickname(),
        }
    }

    /// Value of tag `key`; `None` if absent or valueless.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|Tag(k, _)| k == key)
            .and_then(|Tag(_, v)| v.as_deref())
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    #[must_use]
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::NOTICE(target.into(), text.into()).into()
    }

    #[must_use]
    pub fn join(channel: impl Into<String>) -> Self {
        Command::JOIN(channel.into(), None).into()
    }

    /// Answer to `PING token`.
    #[must_use]
    pub fn pong(token: impl Into<String>) -> Self {
        Command::PONG(token.into(), None).into()
    }

    #[must_use]
    pub fn quit(reason: Option<String>) -> Self {
        Command::QUIT(reason).into()
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            tags: None,
            prefix: None,
            command,
        }
    }
}
