//! HTTP/1.1 リクエストヘッド デコーダーモジュール
//!
//! Sans I/O 設計のインクリメンタルパーサーを提供。
//! 入力はどこで分割されていてもよく、データ不足はエラーではなく
//! 「0 バイト消費」として扱う。
//!
//! ## 使い方
//!
//! ```rust
//! use http11_head::{Phase, RequestParser};
//!
//! let mut parser = RequestParser::new();
//! let data = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! // 1 バイトずつ届いても結果は同じ
//! let mut pending = Vec::new();
//! for &b in data {
//!     pending.push(b);
//!     let consumed = parser.feed(&pending).unwrap();
//!     pending.drain(..consumed);
//! }
//!
//! assert_eq!(parser.phase(), &Phase::Complete);
//! let request = parser.into_request().unwrap();
//! assert_eq!(request.method(), "GET");
//! assert_eq!(request.header("Host"), Some("example.com"));
//! ```

mod headers;
mod parser;
mod phase;
mod request_line;

// 公開 API
pub use headers::{DuplicateHeaders, HeaderDecoder, HeaderMap, HeaderProgress};
pub use parser::RequestParser;
pub use phase::Phase;
pub use request_line::{HTTP_1_1, RequestLine, parse_request_line};

/// 行区切り
pub(crate) const CRLF: &[u8] = b"\r\n";

/// CRLF の位置を探す
pub(crate) fn find_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}
