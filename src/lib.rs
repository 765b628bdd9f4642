//! # http11_head
//!
//! 依存なしの HTTP/1.1 リクエストヘッド インクリメンタルパーサー (Sans I/O)
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用 (`log` フィーチャーで `log` クレートに出力)
//! - **Sans I/O**: パーサーは I/O を持たず、任意の位置で分割された入力を受け付ける
//! - **メモリ上限**: 作業バッファは固定容量で、超過はエラーとして報告する
//!
//! ## 使い方
//!
//! ### パーサーに直接データを渡す
//!
//! ```rust
//! use http11_head::RequestParser;
//!
//! let mut parser = RequestParser::new();
//! let consumed = parser.feed(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
//! assert_eq!(consumed, 37);
//!
//! let request = parser.into_request().unwrap();
//! assert_eq!(request.method(), "GET");
//! assert_eq!(request.header("Host"), Some("example.com"));
//! ```
//!
//! ### ストリームから読み込む
//!
//! ```rust
//! use http11_head::{DecoderLimits, IoSource, RequestReader};
//!
//! let stream: &[u8] = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let limits = DecoderLimits {
//!     buffer_capacity: 256,
//!     ..DecoderLimits::default()
//! };
//! let mut reader = RequestReader::with_limits(IoSource::new(stream), limits);
//! let request = reader.read_request().unwrap();
//! assert_eq!(request.target(), "/");
//! ```

mod buffer;
mod decoder;
mod driver;
mod error;
mod limits;
mod log;
mod request;

pub use buffer::HeadBuffer;
pub use decoder::{
    DuplicateHeaders, HTTP_1_1, HeaderDecoder, HeaderMap, HeaderProgress, Phase, RequestLine,
    RequestParser, parse_request_line,
};
pub use driver::{
    ByteSource, IoSource, ReadOutcome, RequestReader, read_request, read_request_with_limits,
};
pub use error::Error;
pub use limits::DecoderLimits;
pub use request::Request;
