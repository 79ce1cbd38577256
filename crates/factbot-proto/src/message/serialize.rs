//! Wire form of a [`Message`].
//!
//! factbot only ever writes plain commands, so tags are treated as
//! receive-side metadata: a message renders as `[:prefix ]command\r\n` and
//! any tags it carries are left off.

use std::fmt;

use super::types::Message;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, ":{prefix} {}\r\n", self.command),
            None => write!(f, "{}\r\n", self.command),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::message::{Message, Tag};

    #[test]
    fn outgoing_reply_has_no_prefix() {
        let msg = Message::privmsg("#rust", "two words");
        assert_eq!(msg.to_string(), "PRIVMSG #rust :two words\r\n");
    }

    #[test]
    fn tags_are_not_written() {
        let mut msg: Message = ":irc.test PONG irc.test :token".parse().unwrap();
        msg.tags = Some(vec![Tag("msgid".into(), Some("x1".into()))]);
        assert_eq!(msg.to_string(), ":irc.test PONG irc.test :token\r\n");
    }
}
