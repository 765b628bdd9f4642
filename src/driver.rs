//! ブロッキング読み込みによるストリームドライバー
//!
//! 入力元からバイト列を固定容量の作業バッファに読み込み、
//! `RequestParser` に渡して消費済みの部分を詰める、を完了か失敗まで繰り返す。
//!
//! ```rust
//! use http11_head::read_request;
//!
//! let stream: &[u8] = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
//! let request = read_request(stream).unwrap();
//! assert_eq!(request.target(), "/coffee");
//! ```

use std::io;

use crate::buffer::HeadBuffer;
use crate::decoder::{DuplicateHeaders, Phase, RequestParser};
use crate::error::Error;
use crate::limits::DecoderLimits;
use crate::log;
use crate::request::Request;

/// 1 回の読み込み結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// 新たに読めたバイト数 (0 もありうる。終端ではない)
    Bytes(usize),
    /// 入力の終端
    End,
}

/// バイト列の入力元
pub trait ByteSource {
    /// 渡された領域に読み込む
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        (**self).read_bytes(buf)
    }
}

/// `std::io::Read` を入力元として使うアダプター
///
/// `Ok(0)` は終端、`Interrupted` は 0 バイトの読み込みとして扱う。
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: io::Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> ByteSource for IoSource<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        match self.inner.read(buf) {
            Ok(0) if !buf.is_empty() => Ok(ReadOutcome::End),
            Ok(n) => Ok(ReadOutcome::Bytes(n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Bytes(0)),
            Err(e) => Err(e),
        }
    }
}

/// リクエストヘッドリーダー
///
/// 作業バッファ、パーサーを 1 つずつ所有する。1 接続に 1 つ使う。
/// 一度エラーを返したリーダーは、以降の呼び出しで `AlreadyFailed` を返す。
#[derive(Debug)]
pub struct RequestReader<S> {
    source: S,
    buffer: HeadBuffer,
    parser: RequestParser,
    failed: bool,
}

impl<S: ByteSource> RequestReader<S> {
    /// デフォルトの制限でリーダーを作成
    pub fn new(source: S) -> Self {
        Self::with_limits(source, DecoderLimits::default())
    }

    /// 制限付きでリーダーを作成
    pub fn with_limits(source: S, limits: DecoderLimits) -> Self {
        Self {
            source,
            buffer: HeadBuffer::with_capacity(limits.buffer_capacity),
            parser: RequestParser::with_limits(&limits),
            failed: false,
        }
    }

    /// 同名ヘッダーの扱いを設定
    pub fn duplicate_headers(mut self, policy: DuplicateHeaders) -> Self {
        self.parser = self.parser.duplicate_headers(policy);
        self
    }

    /// 作業バッファの容量
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// リクエストヘッドを 1 つ読み込む
    ///
    /// ヘッダー終端より後ろのバイト列はバッファに残り、
    /// 次の `read_request` か `into_parts` で取り出せる。
    pub fn read_request(&mut self) -> Result<Request, Error> {
        if self.failed || matches!(self.parser.phase(), Phase::Failed(_)) {
            return Err(Error::AlreadyFailed);
        }

        let result = self.read_next();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn read_next(&mut self) -> Result<Request, Error> {

        // 前回の残りだけで完結している場合がある
        if !self.buffer.is_empty() {
            self.advance()?;
        }

        while !self.parser.is_finished() {
            // 直前の feed で何も消費されずに満杯のまま
            if self.buffer.is_full() {
                let capacity = self.buffer.capacity();
                log::warning!("request head exceeds buffer capacity {}", capacity);
                return Err(Error::BufferCapacityExceeded { capacity });
            }

            match self.source.read_bytes(self.buffer.spare_mut()) {
                Ok(ReadOutcome::Bytes(0)) => {
                    log::trace!("zero-byte read, retrying");
                    continue;
                }
                Ok(ReadOutcome::Bytes(n)) => self.buffer.commit(n)?,
                Ok(ReadOutcome::End) => {
                    return Err(Error::TruncatedMessage {
                        buffered: self.buffer.len(),
                    });
                }
                Err(e) => return Err(e.into()),
            }

            self.advance()?;
        }

        let request = self.parser.take_request()?;
        log::debug!(
            "request head read: {} {} ({} headers)",
            request.method(),
            request.target(),
            request.headers.len()
        );
        Ok(request)
    }

    fn advance(&mut self) -> Result<(), Error> {
        let consumed = self.parser.feed(self.buffer.filled())?;
        self.buffer.consume(consumed);
        Ok(())
    }

    /// 入力元と、まだ消費されていないバイト列を返す
    pub fn into_parts(mut self) -> (S, Vec<u8>) {
        let pending = self.buffer.take_filled();
        (self.source, pending)
    }
}

/// `std::io::Read` からデフォルトの制限でリクエストヘッドを読み込む
pub fn read_request<R: io::Read>(reader: R) -> Result<Request, Error> {
    RequestReader::new(IoSource::new(reader)).read_request()
}

/// `std::io::Read` から制限付きでリクエストヘッドを読み込む
pub fn read_request_with_limits<R: io::Read>(
    reader: R,
    limits: DecoderLimits,
) -> Result<Request, Error> {
    RequestReader::with_limits(IoSource::new(reader), limits).read_request()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// 決められた順に結果を返す入力元
    struct Script {
        steps: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Script {
        fn new(steps: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                steps: steps.into(),
            }
        }
    }

    impl ByteSource for Script {
        fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
            match self.steps.pop_front() {
                None => Ok(ReadOutcome::End),
                Some(Err(e)) => Err(e),
                Some(Ok(chunk)) => {
                    assert!(chunk.len() <= buf.len());
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(ReadOutcome::Bytes(chunk.len()))
                }
            }
        }
    }

    #[test]
    fn zero_byte_reads_are_retried() {
        let source = Script::new(vec![
            Ok(b"GET / HTTP/1.1\r\n".to_vec()),
            Ok(Vec::new()),
            Ok(Vec::new()),
            Ok(b"Host: example.com\r\n\r\n".to_vec()),
        ]);
        let request = RequestReader::new(source).read_request().unwrap();
        assert_eq!(request.header("Host"), Some("example.com"));
    }

    #[test]
    fn end_before_terminator_is_truncated() {
        let source = Script::new(vec![Ok(b"GET / HTTP/1.1\r\n".to_vec())]);
        assert_eq!(
            RequestReader::new(source).read_request(),
            Err(Error::TruncatedMessage { buffered: 0 })
        );
    }

    #[test]
    fn truncated_reports_buffered_bytes() {
        let source = Script::new(vec![Ok(b"GET / HTTP/1.1\r\nHost: exa".to_vec())]);
        assert_eq!(
            RequestReader::new(source).read_request(),
            Err(Error::TruncatedMessage { buffered: 9 })
        );
    }

    #[test]
    fn read_error_is_not_retried() {
        let source = Script::new(vec![
            Ok(b"GET / HTTP/1.1\r\n".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(b"\r\n".to_vec()),
        ]);
        let result = RequestReader::new(source).read_request();
        assert!(matches!(
            result,
            Err(Error::SourceIo {
                kind: io::ErrorKind::ConnectionReset,
                ..
            })
        ));
    }

    #[test]
    fn read_error_ends_reader() {
        let source = Script::new(vec![
            Ok(b"GET / HTTP/1.1\r\nHost: a".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(b"\r\n\r\n".to_vec()),
        ]);
        let mut reader = RequestReader::new(source);
        assert!(matches!(
            reader.read_request(),
            Err(Error::SourceIo { .. })
        ));
        assert_eq!(reader.read_request(), Err(Error::AlreadyFailed));
    }

    #[test]
    fn capacity_error_ends_reader() {
        let source = Script::new(vec![
            Ok(b"GET /aaaaaaaaaa".to_vec()),
            Ok(b" HTTP/1.1\r\n\r\n".to_vec()),
        ]);
        let limits = DecoderLimits {
            buffer_capacity: 15,
            ..DecoderLimits::default()
        };
        let mut reader = RequestReader::with_limits(source, limits);
        assert_eq!(
            reader.read_request(),
            Err(Error::BufferCapacityExceeded { capacity: 15 })
        );
        assert_eq!(reader.read_request(), Err(Error::AlreadyFailed));
    }

    #[test]
    fn request_line_larger_than_buffer() {
        let mut data = b"GET /".to_vec();
        data.extend(std::iter::repeat_n(b'a', 64));
        data.extend_from_slice(b" HTTP/1.1\r\n\r\n");

        let limits = DecoderLimits {
            buffer_capacity: 32,
            ..DecoderLimits::default()
        };
        assert_eq!(
            read_request_with_limits(&data[..], limits),
            Err(Error::BufferCapacityExceeded { capacity: 32 })
        );
    }

    #[test]
    fn header_block_larger_than_buffer_but_lines_fit() {
        // 各行は容量に収まるので、消費しながら進められる
        let mut data = b"GET / HTTP/1.1\r\n".to_vec();
        for i in 0..20 {
            data.extend_from_slice(format!("X-Header-{i}: value\r\n").as_bytes());
        }
        data.extend_from_slice(b"\r\n");

        let limits = DecoderLimits {
            buffer_capacity: 32,
            ..DecoderLimits::default()
        };
        let request = read_request_with_limits(&data[..], limits).unwrap();
        assert_eq!(request.headers.len(), 20);
        assert_eq!(request.header("X-Header-19"), Some("value"));
    }

    #[test]
    fn malformed_then_already_failed() {
        let source = Script::new(vec![
            Ok(b"GET /\r\n\r\n".to_vec()),
            Ok(b"GET / HTTP/1.1\r\n\r\n".to_vec()),
        ]);
        let mut reader = RequestReader::new(source);
        assert!(matches!(
            reader.read_request(),
            Err(Error::MalformedRequestLine(_))
        ));
        assert_eq!(reader.read_request(), Err(Error::AlreadyFailed));
    }

    #[test]
    fn pipelined_requests_share_buffer() {
        let data: &[u8] = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n";
        let mut reader = RequestReader::new(IoSource::new(data));
        assert_eq!(reader.read_request().unwrap().target(), "/a");
        assert_eq!(reader.read_request().unwrap().target(), "/b");
        assert_eq!(
            reader.read_request(),
            Err(Error::TruncatedMessage { buffered: 0 })
        );
        assert_eq!(reader.read_request(), Err(Error::AlreadyFailed));
    }

    #[test]
    fn into_parts_returns_body_prefix() {
        let data: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let mut reader = RequestReader::new(IoSource::new(data));
        reader.read_request().unwrap();
        let (_, pending) = reader.into_parts();
        assert_eq!(pending, b"hello");
    }

    #[test]
    fn io_source_maps_interrupted_to_zero_bytes() {
        struct Interrupting {
            interrupted: bool,
            data: &'static [u8],
        }

        impl io::Read for Interrupting {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(io::ErrorKind::Interrupted.into());
                }
                io::Read::read(&mut self.data, buf)
            }
        }

        let reader = Interrupting {
            interrupted: false,
            data: b"GET / HTTP/1.1\r\n\r\n",
        };
        let request = read_request(reader).unwrap();
        assert_eq!(request.method(), "GET");
    }
}
