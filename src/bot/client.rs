//! The protocol client boundary and its TCP implementation.

use crate::bot::event::PrivMsg;
use crate::bot::reply::split_reply;
use crate::config::Config;
use crate::error::TransportError;
use async_trait::async_trait;
use factbot_proto::format::scrub_control_chars;
use factbot_proto::{Command, Frame, IrcCodec, Message};
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// How long a send may wait on a full queue before giving up.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the outgoing message queue.
const OUTBOX_CAPACITY: usize = 256;

/// Operations the bot needs from an IRC connection.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Queue a raw message.
    async fn send(&self, message: Message) -> Result<(), TransportError>;

    async fn privmsg(&self, target: &str, text: &str) -> Result<(), TransportError> {
        self.send(Message::privmsg(target, text)).await
    }

    async fn notice(&self, target: &str, text: &str) -> Result<(), TransportError> {
        self.send(Message::notice(target, text)).await
    }

    async fn join(&self, channel: &str) -> Result<(), TransportError> {
        self.send(Message::join(channel)).await
    }

    async fn quit(&self, reason: Option<&str>) -> Result<(), TransportError> {
        self.send(Message::quit(reason.map(str::to_string))).await
    }
}

/// Queue of outgoing messages, drained by the connection's writer task.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::Sender<Message>,
}

impl Outbox {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// An outbox plus the receiving end, for custom writers and tests.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Reply to `to`, splitting and truncating `text` to at most
    /// `max_lines` lines. Returns the number of lines sent.
    ///
    /// Control characters the codec would reject are scrubbed first.
    pub async fn reply(
        &self,
        to: &PrivMsg,
        text: &str,
        max_lines: usize,
    ) -> Result<usize, TransportError> {
        let lines = split_reply(&scrub_control_chars(text), max_lines);
        let target = to.reply_target();
        for line in &lines {
            self.privmsg(target, line).await?;
        }
        Ok(lines.len())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl ProtocolClient for Outbox {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        match timeout(SEND_TIMEOUT, self.tx.send(message)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_elapsed) => {
                warn!("Outbox full: writer not draining (timeout after {:?})", SEND_TIMEOUT);
                Err(TransportError::Timeout(SEND_TIMEOUT))
            }
        }
    }
}

/// Inbound half of a connection: decoded frames in arrival order.
pub type Inbound = SplitStream<Framed<TcpStream, IrcCodec>>;

/// An established, registering connection.
pub struct Connection {
    pub outbox: Outbox,
    pub inbound: Inbound,
    writer: JoinHandle<()>,
}

impl Connection {
    /// Wait for queued messages to be flushed after the last outbox handle
    /// is dropped.
    pub async fn finish(self) {
        let Connection {
            outbox,
            inbound,
            writer,
        } = self;
        drop(outbox);
        drop(inbound);
        if let Err(e) = writer.await {
            warn!(error = %e, "Writer task failed");
        }
    }
}

/// Connect to the configured server and send the registration burst.
pub async fn connect(config: &Config) -> Result<Connection, TransportError> {
    let address = config.server.address();
    let stream = TcpStream::connect(&address).await?;
    info!(%address, "Connected");

    let framed = Framed::new(stream, IrcCodec::with_max_len(config.reply.max_line_len));
    let (mut sink, inbound) = framed.split();
    let (outbox, mut rx) = Outbox::channel(OUTBOX_CAPACITY);

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let command = message.command.name();
            debug!(%command, "Sending");
            match sink.send(message).await {
                Ok(()) => {}
                // Encoding rejected this message only; the socket is fine.
                Err(e) if e.is_recoverable() => {
                    warn!(%command, error = %e, "Dropping unencodable message");
                }
                Err(e) => {
                    warn!(error = %e, "Write failed, closing connection");
                    break;
                }
            }
        }
        let _ = sink.close().await;
    });

    if let Some(password) = &config.server.password {
        outbox.send(Command::PASS(password.clone()).into()).await?;
    }
    let identity = &config.identity;
    outbox.send(Command::NICK(identity.nick.clone()).into()).await?;
    outbox
        .send(
            Command::USER(
                identity.user().to_string(),
                "0".to_string(),
                identity.realname().to_string(),
            )
            .into(),
        )
        .await?;

    Ok(Connection {
        outbox,
        inbound,
        writer,
    })
}

/// Split an inbound stream item into a message or a logged, skippable error.
///
/// Returns `None` when the stream hit an unrecoverable I/O error.
pub(crate) fn triage(item: Result<Frame, factbot_proto::ProtocolError>) -> Option<Option<Message>> {
    match item {
        Ok(Ok(message)) => Some(Some(message)),
        Ok(Err(e)) => {
            warn!(error = %e, "Dropping undecodable line");
            Some(None)
        }
        Err(e) => {
            warn!(error = %e, "Connection error");
            None
        }
    }
}
