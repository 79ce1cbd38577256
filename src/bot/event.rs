//! Chat messages decoded from raw protocol traffic.

use factbot_proto::format::strip_formatting;
use factbot_proto::{ChannelExt, Command, Message, Prefix};

/// A PRIVMSG with a known sender.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivMsg {
    /// Sender's nick.
    pub source: String,
    /// Full sender prefix (`nick!user@host`).
    pub prefix: Prefix,
    /// Channel or nick the message was addressed to.
    pub target: String,
    /// Message text with formatting codes removed.
    pub text: String,
}

impl PrivMsg {
    /// Decode a PRIVMSG. Server-originated and non-PRIVMSG traffic yields `None`.
    pub fn from_message(message: &Message) -> Option<Self> {
        let Command::PRIVMSG(target, text) = &message.command else {
            return None;
        };
        let prefix = message.prefix.clone()?;
        let source = prefix.nick()?.to_string();
        Some(Self {
            source,
            prefix,
            target: target.clone(),
            text: strip_formatting(text),
        })
    }

    /// Whether the message was sent to a channel.
    pub fn is_channel(&self) -> bool {
        self.target.is_channel_name()
    }

    /// Where a reply goes: the channel for channel messages, else the sender.
    pub fn reply_target(&self) -> &str {
        if self.is_channel() {
            &self.target
        } else {
            &self.source
        }
    }

    /// Build a message as if `nick` had sent `text` to `target`.
    pub fn new(nick: &str, target: &str, text: &str) -> Self {
        Self {
            source: nick.to_string(),
            prefix: Prefix::new(nick, nick, "localhost"),
            target: target.to_string(),
            text: text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_channel_message() {
        let msg: Message = ":alice!a@host PRIVMSG #rust :\x02hi\x02 there".parse().unwrap();
        let pm = PrivMsg::from_message(&msg).unwrap();
        assert_eq!(pm.source, "alice");
        assert_eq!(pm.text, "hi there");
        assert!(pm.is_channel());
        assert_eq!(pm.reply_target(), "#rust");
    }

    #[test]
    fn private_message_replies_to_sender() {
        let msg: Message = ":alice!a@host PRIVMSG factbot :hello".parse().unwrap();
        let pm = PrivMsg::from_message(&msg).unwrap();
        assert_eq!(pm.reply_target(), "alice");
    }

    #[test]
    fn ignores_other_traffic() {
        let notice: Message = ":alice!a@host NOTICE #rust :hi".parse().unwrap();
        assert!(PrivMsg::from_message(&notice).is_none());

        let server: Message = ":irc.example.net PRIVMSG #rust :hi".parse().unwrap();
        assert!(PrivMsg::from_message(&server).is_none());

        let bare: Message = "PRIVMSG #rust :hi".parse().unwrap();
        assert!(PrivMsg::from_message(&bare).is_none());
    }
}
