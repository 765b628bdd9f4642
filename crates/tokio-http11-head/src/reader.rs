//! 非同期リクエストヘッドリーダー
//!
//! `http11_head::RequestReader` の非同期版。読み込みごとにタイムアウトを掛けられる。
//!
//! ```ignore
//! use tokio_http11_head::RequestReader;
//!
//! let (stream, _) = listener.accept().await?;
//! let mut reader = RequestReader::new(stream).read_timeout(Duration::from_secs(10));
//! let request = reader.read_request().await?;
//! let (stream, pending) = reader.into_parts();
//! ```

use std::io;
use std::time::Duration;

use http11_head::{DecoderLimits, DuplicateHeaders, HeadBuffer, Phase, Request, RequestParser};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

/// 非同期リクエストヘッドリーダー
///
/// タイムアウトを含め一度エラーを返したら、以降は `AlreadyFailed` を返す。
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    buffer: HeadBuffer,
    parser: RequestParser,
    read_timeout: Option<Duration>,
    failed: bool,
}

impl<R: AsyncRead + Unpin> RequestReader<R> {
    /// デフォルトの制限でリーダーを作成
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, DecoderLimits::default())
    }

    /// 制限付きでリーダーを作成
    pub fn with_limits(reader: R, limits: DecoderLimits) -> Self {
        Self {
            reader,
            buffer: HeadBuffer::with_capacity(limits.buffer_capacity),
            parser: RequestParser::with_limits(&limits),
            read_timeout: None,
            failed: false,
        }
    }

    /// 同名ヘッダーの扱いを設定
    pub fn duplicate_headers(mut self, policy: DuplicateHeaders) -> Self {
        self.parser = self.parser.duplicate_headers(policy);
        self
    }

    /// 1 回の読み込みのタイムアウトを設定
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// リクエストヘッドを 1 つ読み込む
    pub async fn read_request(&mut self) -> Result<Request> {
        if self.failed || matches!(self.parser.phase(), Phase::Failed(_)) {
            return Err(Error::Http(http11_head::Error::AlreadyFailed));
        }

        let result = self.read_next().await;
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    async fn read_next(&mut self) -> Result<Request> {

        if !self.buffer.is_empty() {
            self.advance()?;
        }

        while !self.parser.is_finished() {
            if self.buffer.is_full() {
                return Err(Error::Http(http11_head::Error::BufferCapacityExceeded {
                    capacity: self.buffer.capacity(),
                }));
            }

            let read = match self.read_timeout {
                Some(timeout) => {
                    tokio::time::timeout(timeout, self.reader.read(self.buffer.spare_mut()))
                        .await?
                }
                None => self.reader.read(self.buffer.spare_mut()).await,
            };

            match read {
                // 空き領域があるので 0 は EOF
                Ok(0) => {
                    return Err(Error::Http(http11_head::Error::TruncatedMessage {
                        buffered: self.buffer.len(),
                    }));
                }
                Ok(n) => self.buffer.commit(n)?,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Http(e.into())),
            }

            self.advance()?;
        }

        let request = self.parser.take_request()?;
        log::debug!(
            "request head read: {} {}",
            request.method(),
            request.target()
        );
        Ok(request)
    }

    fn advance(&mut self) -> Result<()> {
        let consumed = self.parser.feed(self.buffer.filled())?;
        self.buffer.consume(consumed);
        Ok(())
    }

    /// 読み込み元と、まだ消費されていないバイト列を返す
    pub fn into_parts(mut self) -> (R, Vec<u8>) {
        let pending = self.buffer.take_filled();
        (self.reader, pending)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn test_read_request_from_slice() {
        let data: &[u8] = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
        let mut reader = RequestReader::new(data);
        let request = reader.read_request().await.unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.target(), "/coffee");
        assert_eq!(request.header("Host"), Some("localhost:42069"));
    }

    #[tokio::test]
    async fn test_read_request_in_small_writes() {
        let (mut client, server) = tokio::io::duplex(64);
        let writer = tokio::spawn(async move {
            for chunk in b"GET / HTTP/1.1\r\nUser-Agent: curl/8.0\r\n\r\n".chunks(3) {
                client.write_all(chunk).await.unwrap();
                tokio::task::yield_now().await;
            }
            client
        });

        let mut reader = RequestReader::new(server);
        let request = reader.read_request().await.unwrap();
        assert_eq!(request.header("User-Agent"), Some("curl/8.0"));
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_after_request_line() {
        let data: &[u8] = b"GET / HTTP/1.1\r\n";
        let mut reader = RequestReader::new(data);
        assert!(matches!(
            reader.read_request().await,
            Err(Error::Http(http11_head::Error::TruncatedMessage { buffered: 0 }))
        ));
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let (_client, server) = tokio::io::duplex(64);
        let mut reader = RequestReader::new(server).read_timeout(Duration::from_millis(20));
        assert!(matches!(
            reader.read_request().await,
            Err(Error::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_timeout_ends_reader() {
        let (mut client, server) = tokio::io::duplex(64);
        client.write_all(b"GET / HTTP/1.1\r\nHost: a").await.unwrap();

        let mut reader = RequestReader::new(server).read_timeout(Duration::from_millis(20));
        assert!(matches!(reader.read_request().await, Err(Error::Timeout)));

        // 残りが届いても同じリーダーでは再開しない
        client.write_all(b"\r\n\r\n").await.unwrap();
        assert!(matches!(
            reader.read_request().await,
            Err(Error::Http(http11_head::Error::AlreadyFailed))
        ));
    }

    #[tokio::test]
    async fn test_truncation_ends_reader() {
        let data: &[u8] = b"GET / HTTP/1.1\r\n";
        let mut reader = RequestReader::new(data);
        assert!(matches!(
            reader.read_request().await,
            Err(Error::Http(http11_head::Error::TruncatedMessage { .. }))
        ));
        assert!(matches!(
            reader.read_request().await,
            Err(Error::Http(http11_head::Error::AlreadyFailed))
        ));
    }

    #[tokio::test]
    async fn test_buffer_capacity_exceeded() {
        let data: &[u8] = b"GET /a-very-long-target-that-does-not-fit HTTP/1.1\r\n\r\n";
        let limits = DecoderLimits {
            buffer_capacity: 16,
            ..DecoderLimits::default()
        };
        let mut reader = RequestReader::with_limits(data, limits);
        assert!(matches!(
            reader.read_request().await,
            Err(Error::Http(
                http11_head::Error::BufferCapacityExceeded { capacity: 16 }
            ))
        ));
    }

    #[tokio::test]
    async fn test_into_parts_keeps_pending() {
        let data: &[u8] = b"POST /upload HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
        let mut reader = RequestReader::new(data);
        reader.read_request().await.unwrap();
        let (_, pending) = reader.into_parts();
        assert_eq!(pending, b"abc");
    }
}
