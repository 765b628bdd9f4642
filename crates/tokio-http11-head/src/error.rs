//! tokio-http11-head エラー型

use std::fmt;

/// tokio-http11-head エラー
#[derive(Debug)]
pub enum Error {
    /// I/O エラー (bind, accept, 書き込み)
    Io(std::io::Error),
    /// リクエストヘッドのパースエラー (読み込み失敗を含む)
    Http(http11_head::Error),
    /// 読み込みタイムアウト
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Timeout => write!(f, "read timeout"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<http11_head::Error> for Error {
    fn from(e: http11_head::Error) -> Self {
        Error::Http(e)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
