//! Newline framing.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::format::is_illegal_control_char;

/// Splits a byte stream into UTF-8 lines ending in `\n` (a preceding `\r`
/// is kept).
///
/// A line longer than `max_len` bytes is reported once, then skipped up to
/// its newline, after which decoding carries on with the next line.
#[derive(Debug)]
pub struct LineCodec {
    max_len: usize,
    /// Bytes of the buffer already searched for a newline.
    scanned: usize,
    /// Inside an over-long line that has already been reported.
    skipping: bool,
}

impl LineCodec {
    /// Codec limited to [`crate::MAX_LINE_LEN`] bytes per line.
    pub fn new() -> Self {
        Self::with_max_len(crate::MAX_LINE_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            scanned: 0,
            skipping: false,
        }
    }

    fn too_long(&self, len: usize) -> ProtocolError {
        ProtocolError::LineTooLong {
            len,
            max: self.max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let newline = src[self.scanned..].iter().position(|&b| b == b'\n');
            let Some(end) = newline.map(|i| self.scanned + i) else {
                if self.skipping {
                    src.clear();
                    self.scanned = 0;
                } else {
                    self.scanned = src.len();
                    if src.len() > self.max_len {
                        self.skipping = true;
                        return Err(self.too_long(src.len()));
                    }
                }
                return Ok(None);
            };
            self.scanned = 0;

            if self.skipping {
                src.advance(end + 1);
                self.skipping = false;
                continue;
            }

            let line = src.split_to(end + 1);
            if line.len() > self.max_len {
                return Err(self.too_long(line.len()));
            }
            let text = String::from_utf8(line.to_vec()).map_err(|e| ProtocolError::InvalidUtf8 {
                valid_up_to: e.utf8_error().valid_up_to(),
                bytes: e.into_bytes(),
            })?;
            let body = text.trim_end_matches(['\r', '\n']);
            if let Some(c) = body.chars().find(|&c| is_illegal_control_char(c)) {
                return Err(ProtocolError::IllegalControlChar(c));
            }
            return Ok(Some(text));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        std::iter::from_fn(|| codec.decode(buf).ok().flatten()).collect()
    }

    #[test]
    fn yields_each_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(":irc.test 001 factbot :hi\r\nPING :a\r\n");
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec![":irc.test 001 factbot :hi\r\n", "PING :a\r\n"]
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn holds_a_partial_line_until_its_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PRIVMSG #rust :half");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b" and half\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some("PRIVMSG #rust :half and half\r\n")
        );
    }

    #[test]
    fn over_long_line_is_reported_then_skipped() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("0123456789abc");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::LineTooLong { len: 13, max: 10 })
        ));

        buf.extend_from_slice(b"more of it\nPING :x\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING :x\n"));
    }

    #[test]
    fn complete_line_over_the_limit() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("PING :toolong\nPING :a\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::LineTooLong { len: 14, .. })
        ));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING :a\n"));
    }

    #[test]
    fn bell_is_refused() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(":alice PRIVMSG #rust :\x07\r\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::IllegalControlChar('\x07'))
        ));
    }

    #[test]
    fn bad_utf8_reports_offset() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"NOTICE * :\xc3\x28\r\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::InvalidUtf8 { valid_up_to: 10, .. })
        ));
    }
}
