//! Contains code pertaining to the FTP *data* channel as the transfer engine sees it.

use super::{
    chancomms::{ControlChanMsg, ControlChanSender},
    reply::{Reply, ReplyCode},
    transfer::{Direction, TransferMode},
};
use async_trait::async_trait;
use std::{fmt::Debug, io};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// How a transfer ended, passed to [`DataConnection::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStatus {
    /// All data was moved.
    Success,
    /// The transfer was aborted by the client.
    Cancelled,
    /// The transfer failed.
    Error,
}

/// The data connection of a session. Establishing it (PASV, PORT, TLS) happens elsewhere; the
/// engine gets an established connection attached to the session and drives it through these
/// calls, always in this order: `begin`, `open`, any number of `read_chunk` or `write_chunk`, and
/// `close`. `close` is called on every path after `begin`.
#[async_trait]
pub trait DataConnection: Send + Sync + Debug {
    /// Announces the transfer that is about to start.
    async fn begin(&mut self, direction: Direction, subject: &str, mode: TransferMode);

    /// Opens the connection for the transfer. For downloads `expected_len` is the number of bytes
    /// that will be sent.
    async fn open(&mut self, expected_len: Option<u64>) -> io::Result<()>;

    /// Reads the next chunk sent by the client. Zero means the client is done.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Sends `buf` to the client in full.
    async fn write_chunk(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Closes the connection.
    async fn close(&mut self, status: CloseStatus);
}

/// A [`DataConnection`] over an established byte stream such as a `TcpStream`.
///
/// If a reply channel is given, opening the connection sends the `150` preliminary reply over it.
/// The representation type is announced but the bytes are passed through unchanged.
#[derive(Debug)]
pub struct StreamConnection<S> {
    stream: S,
    reply_tx: Option<ControlChanSender>,
    announced: Option<(Direction, String, TransferMode)>,
}

impl<S> StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + Sync + Unpin + Debug,
{
    /// Wraps `stream`.
    pub fn new(stream: S) -> Self {
        StreamConnection {
            stream,
            reply_tx: None,
            announced: None,
        }
    }

    /// Sends the preliminary reply through `tx` when the connection opens.
    pub fn with_replies(mut self, tx: ControlChanSender) -> Self {
        self.reply_tx = Some(tx);
        self
    }

    /// Gives back the wrapped stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn opening_reply(&self, expected_len: Option<u64>) -> Option<Reply> {
        let (_, subject, mode) = self.announced.as_ref()?;
        let msg = match expected_len {
            Some(len) => format!("Opening {} mode data connection for {} ({} bytes).", mode.name(), subject, len),
            None => format!("Opening {} mode data connection for {}.", mode.name(), subject),
        };
        Some(Reply::new_with_string(ReplyCode::FileStatusOkay, msg))
    }
}

#[async_trait]
impl<S> DataConnection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + Sync + Unpin + Debug,
{
    async fn begin(&mut self, direction: Direction, subject: &str, mode: TransferMode) {
        self.announced = Some((direction, subject.to_string(), mode));
    }

    async fn open(&mut self, expected_len: Option<u64>) -> io::Result<()> {
        if self.announced.is_none() {
            return Err(io::Error::other("no transfer announced on the data connection"));
        }
        if let (Some(tx), Some(reply)) = (&self.reply_tx, self.opening_reply(expected_len)) {
            tx.send(ControlChanMsg::CommandChannelReply(reply))
                .await
                .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
        }
        Ok(())
    }

    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf).await
    }

    async fn write_chunk(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf).await
    }

    async fn close(&mut self, status: CloseStatus) {
        if status == CloseStatus::Success {
            let _ = self.stream.flush().await;
        }
        let _ = self.stream.shutdown().await;
        self.announced = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn sends_preliminary_reply_and_moves_bytes() {
        let (client, server) = tokio::io::duplex(64);
        let (tx, mut rx) = mpsc::channel(4);
        let mut conn = StreamConnection::new(server).with_replies(tx);

        conn.begin(Direction::Outbound, "report.txt", TransferMode::Binary).await;
        conn.open(Some(5)).await.unwrap();
        conn.write_chunk(b"hello").await.unwrap();
        conn.close(CloseStatus::Success).await;

        match rx.recv().await {
            Some(ControlChanMsg::CommandChannelReply(reply)) => assert_eq!(
                reply.to_string(),
                "150 Opening BINARY mode data connection for report.txt (5 bytes)."
            ),
            other => panic!("unexpected message {:?}", other),
        }

        let mut client = client;
        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"hello");
    }

    #[tokio::test]
    async fn open_needs_an_announcement() {
        let (_client, server) = tokio::io::duplex(8);
        let mut conn = StreamConnection::new(server);
        assert!(conn.open(None).await.is_err());
    }

    #[tokio::test]
    async fn reads_until_the_client_is_done() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut conn = StreamConnection::new(server);
        conn.begin(Direction::Inbound, "up.bin", TransferMode::Ascii).await;
        conn.open(None).await.unwrap();

        client.write_all(b"abc").await.unwrap();
        drop(client);

        let mut buf = [0u8; 8];
        let n = conn.read_chunk(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abc");
        assert_eq!(conn.read_chunk(&mut buf).await.unwrap(), 0);
    }
}
