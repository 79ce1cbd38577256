//! # factbot-proto
//!
//! The slice of the IRC protocol factbot needs: an owned [`Message`] model,
//! a nom-based line parser, serialization, and tokio codecs for framing a
//! TCP stream into messages.
//!
//! ```rust
//! use factbot_proto::{Command, Message};
//!
//! let msg: Message = ":alice!a@host PRIVMSG #rust :hello".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("alice"));
//! assert!(matches!(msg.command, Command::PRIVMSG(_, _)));
//!
//! let reply = Message::privmsg("#rust", "hi alice");
//! assert_eq!(reply.to_string(), "PRIVMSG #rust :hi alice\r\n");
//! ```

#![deny(clippy::all)]

pub mod chan;
pub mod command;
pub mod error;
pub mod format;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;

pub use self::chan::ChannelExt;
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::irc::{Frame, IrcCodec};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{Message, Tag};
pub use self::prefix::Prefix;

/// Numeric reply sent by servers once registration completes.
pub const RPL_WELCOME: u16 = 1;

/// Default maximum line length in bytes, including CRLF.
pub const MAX_LINE_LEN: usize = 512;
