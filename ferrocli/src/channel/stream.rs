//! Stream engine over a connected tokio stream.

use std::time::Duration;

use bytes::BytesMut;
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use super::patterns::{Pattern, describe};
use super::{Expect, ExpectMatch};
use crate::error::ChannelError;

/// Configuration for stream channel behavior.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Overlap re-scanned for patterns when new data arrives.
    pub search_depth: usize,

    /// Size of a single read from the stream.
    pub read_size: usize,

    /// Keep a transcript of everything received.
    pub debug: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            search_depth: 1000,
            read_size: 4096,
            debug: false,
        }
    }
}

/// Pattern-matching channel over an already connected stream.
///
/// Bytes are buffered until a pattern matches; the matched prefix is handed
/// to the caller and discarded from the buffer. In debug mode every received
/// byte is also kept in a transcript for inspection.
pub struct StreamChannel<T> {
    stream: T,
    buffer: PatternBuffer,
    config: StreamConfig,
    transcript: Option<BytesMut>,
    eof: bool,
}

impl<T> StreamChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a connected stream.
    pub fn new(stream: T, config: StreamConfig) -> Self {
        Self {
            stream,
            buffer: PatternBuffer::new(config.search_depth),
            transcript: config.debug.then(BytesMut::new),
            config,
            eof: false,
        }
    }

    /// Wrap a connected stream with default configuration.
    pub fn with_defaults(stream: T) -> Self {
        Self::new(stream, StreamConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Data received but not yet consumed by a match.
    pub fn pending(&self) -> std::borrow::Cow<'_, str> {
        self.buffer.as_str_lossy()
    }

    /// Everything received so far, if debug mode is on.
    pub fn transcript(&self) -> Option<&[u8]> {
        self.transcript.as_deref()
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.stream
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> T {
        self.stream
    }

    /// Read one chunk into the buffer, or note end of stream.
    async fn fill(&mut self, deadline: Instant) -> Result<bool, ChannelError> {
        let mut chunk = vec![0u8; self.config.read_size];
        match tokio::time::timeout_at(deadline, self.stream.read(&mut chunk)).await {
            Err(_) => Ok(false),
            Ok(Ok(0)) => {
                debug!("End of stream reached");
                self.eof = true;
                Ok(true)
            }
            Ok(Ok(n)) => {
                trace!("Read {} bytes: {:?}", n, String::from_utf8_lossy(&chunk[..n]));
                self.buffer.extend(&chunk[..n]);
                if let Some(transcript) = self.transcript.as_mut() {
                    transcript.extend_from_slice(&chunk[..n]);
                }
                Ok(true)
            }
            Ok(Err(e)) => Err(ChannelError::Io(e)),
        }
    }
}

impl<T> Expect for StreamChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.eof {
            return Err(ChannelError::Closed);
        }
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn expect(
        &mut self,
        patterns: &[Pattern],
        timeout: Duration,
    ) -> Result<ExpectMatch, ChannelError> {
        let deadline = Instant::now() + timeout;
        self.buffer.rewind();

        loop {
            if let Some(m) = self.buffer.search(patterns) {
                let consumed = self.buffer.consume(m.end);
                let mut data = String::from_utf8_lossy(&consumed[..m.start]).into_owned();
                let match_start = data.len();
                data.push_str(&String::from_utf8_lossy(&consumed[m.start..]));
                return Ok(ExpectMatch {
                    index: m.index,
                    match_start,
                    data,
                });
            }

            if self.eof {
                let data = String::from_utf8_lossy(&self.buffer.take()).into_owned();
                return Err(ChannelError::ConnectionLost {
                    expecting: describe(patterns),
                    data,
                });
            }

            if !self.fill(deadline).await? {
                return Err(ChannelError::Timeout {
                    timeout,
                    expecting: describe(patterns),
                    data: self.buffer.as_str_lossy().into_owned(),
                });
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn pattern(p: &str) -> Pattern {
        Pattern::new(p).unwrap()
    }

    #[tokio::test]
    async fn test_expect_consumes_through_match() {
        let (client, mut server) = duplex(1024);
        let mut channel = StreamChannel::with_defaults(client);

        server.write_all(b"\nPassword: device>").await.unwrap();

        let m = channel
            .expect(&[pattern(r"[Pp]assword:\s+")], Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.before(), "\n");
        assert_eq!(m.matched(), "Password: ");
        assert_eq!(channel.pending(), "device>");

        let data = channel
            .read_until(&pattern("device>"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(data, "device>");
    }

    #[tokio::test]
    async fn test_expect_timeout_keeps_buffer() {
        let (client, mut server) = duplex(1024);
        let mut channel = StreamChannel::with_defaults(client);

        server.write_all(b"output\nprompt>").await.unwrap();

        let err = channel
            .expect(&[pattern("prompt#")], Duration::from_millis(50))
            .await
            .unwrap_err();
        match err {
            ChannelError::Timeout {
                expecting, data, ..
            } => {
                assert_eq!(expecting, vec!["prompt#".to_string()]);
                assert_eq!(data, "output\nprompt>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(channel.pending(), "output\nprompt>");
        assert!(!channel.is_eof());
    }

    #[tokio::test]
    async fn test_connection_lost() {
        let (client, mut server) = duplex(1024);
        let mut channel = StreamChannel::with_defaults(client);

        server.write_all(b"bye").await.unwrap();
        drop(server);

        let err = channel
            .expect(&[pattern("prompt>")], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChannelError::ConnectionLost { ref data, .. } if data == "bye"
        ));
        assert!(channel.is_eof());
        assert!(matches!(
            channel.write(b"exit\n").await,
            Err(ChannelError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_write_reaches_peer() {
        let (client, mut server) = duplex(1024);
        let mut channel = StreamChannel::with_defaults(client);

        channel.write(b"show version\n").await.unwrap();

        let mut received = [0u8; 13];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(&received, b"show version\n");
    }

    #[tokio::test]
    async fn test_debug_transcript() {
        let (client, mut server) = duplex(1024);
        let config = StreamConfig {
            debug: true,
            ..Default::default()
        };
        let mut channel = StreamChannel::new(client, config);

        server.write_all(b"one\nrouter>").await.unwrap();
        channel
            .expect(&[pattern("router>")], Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(channel.transcript(), Some(&b"one\nrouter>"[..]));
        assert!(
            StreamChannel::with_defaults(duplex(8).0)
                .transcript()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_login_exchange() {
        let stream = tokio_test::io::Builder::new()
            .read(b"\r\nPassword: ")
            .write(b"secret\n")
            .read(b"\r\nswit")
            .read(b"ch>")
            .build();
        let mut channel = StreamChannel::with_defaults(stream);

        channel
            .read_until(&pattern(r"[Pp]assword:\s+$"), Duration::from_secs(1))
            .await
            .unwrap();
        channel.write(b"secret\n").await.unwrap();

        // Prompt split across two reads
        let data = channel
            .read_until(&Pattern::literal("switch>"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(data, "\r\nswitch>");
    }

    #[tokio::test]
    async fn test_expect_after_timeout_sees_buffered_data() {
        let (client, mut server) = duplex(1024);
        let mut channel = StreamChannel::with_defaults(client);

        server.write_all(b"Username: ").await.unwrap();
        assert!(
            channel
                .expect(&[pattern("Password:")], Duration::from_millis(50))
                .await
                .is_err()
        );

        let data = channel
            .read_until(&pattern(r"Username:\s*"), Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(data, "Username: ");
    }
}
