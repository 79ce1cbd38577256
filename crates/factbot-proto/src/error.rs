//! Errors raised while framing and parsing IRC lines.

use thiserror::Error;

/// Result with [`ProtocolError`] as the default error.
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// A problem with the connection or with one line on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The socket failed; the connection is over.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The line is not UTF-8; `valid_up_to` is the offset of the first bad byte.
    #[error("line is not UTF-8 past byte {valid_up_to}")]
    InvalidUtf8 { bytes: Vec<u8>, valid_up_to: usize },

    /// Over the codec's configured length.
    #[error("line of {len} bytes exceeds the {max} byte limit")]
    LineTooLong { len: usize, max: usize },

    /// BEL or another control character IRC does not allow.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// The line framed fine but is not a valid message.
    #[error("invalid message: {line}")]
    InvalidMessage {
        /// The offending line as received.
        line: String,
        /// What the parser objected to.
        #[source]
        cause: MessageParseError,
    },
}

impl ProtocolError {
    /// Whether the stream can keep going after this error.
    ///
    /// Everything except I/O concerns a single line.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Why a line could not become a [`Message`](crate::Message).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Nothing but a line ending.
    #[error("empty line")]
    Empty,

    /// The verb is neither letters nor a three digit numeric.
    #[error("malformed command")]
    BadCommand,

    /// A known verb arrived with too few parameters.
    #[error("{verb} needs {needed} parameters, got {got}")]
    MissingParams {
        verb: &'static str,
        needed: usize,
        got: usize,
    },

    /// The `:source` part could not be read as a prefix.
    #[error("malformed source: {0}")]
    BadPrefix(String),

    /// The grammar rejected the line at `position`.
    #[error("syntax error at byte {position} ({kind})")]
    Syntax { position: usize, kind: String },
}
