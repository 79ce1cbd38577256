//! Message framing on top of [`LineCodec`].

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::format::is_illegal_control_char;
use crate::line::LineCodec;
use crate::message::Message;

/// Reads [`Frame`]s and writes [`Message`]s.
#[derive(Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Prepare a rendered message for the wire.
    ///
    /// Everything after the first line break is cut so one message cannot
    /// carry a second command. Illegal control characters are refused.
    pub fn sanitize(mut line: String) -> error::Result<String> {
        if let Some(brk) = line.find(['\r', '\n']) {
            let width = if line[brk..].starts_with("\r\n") { 2 } else { 1 };
            line.truncate(brk + width);
        }
        match line.chars().find(|&c| is_illegal_control_char(c)) {
            Some(c) => Err(ProtocolError::IllegalControlChar(c)),
            None => Ok(line),
        }
    }
}

/// A decoded frame: a message, or a line-level error the stream survived.
pub type Frame = Result<Message, ProtocolError>;

impl Decoder for IrcCodec {
    type Item = Frame;
    type Error = ProtocolError;

    /// Line-level failures (bad UTF-8, over-long or unparseable lines) are
    /// yielded as `Some(Err(_))` so the stream keeps going; only I/O errors
    /// end it.
    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Frame>> {
        match self.inner.decode(src) {
            Ok(Some(line)) => Ok(Some(line.parse::<Message>())),
            Ok(None) => Ok(None),
            Err(e) if e.is_recoverable() => Ok(Some(Err(e))),
            Err(e) => Err(e),
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(msg.to_string())?;
        self.inner.encode(sanitized, dst)
    }
}
