use std::fmt;
use std::io;

/// リクエストヘッド パースエラー
///
/// パース段階のエラーはすべてリクエストに対して終端的で、
/// 途中までのリクエストが呼び出し側に渡されることはない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// リクエストラインの形式が不正 (トークン数、バージョンの形など)
    MalformedRequestLine(String),
    /// バージョンの形式は正しいが HTTP/1.1 ではない
    UnsupportedHttpVersion(String),
    /// ヘッダー行の形式が不正 (コロンなし、名前末尾の空白など)
    MalformedHeaderField(String),
    /// ヘッダー数超過
    TooManyHeaders { count: usize, limit: usize },
    /// 既に失敗したパーサーに対する操作
    AlreadyFailed,
    /// ヘッダー終端を受信する前に入力が終わった
    TruncatedMessage { buffered: usize },
    /// 作業バッファが満杯のままパースが進まない
    BufferCapacityExceeded { capacity: usize },
    /// 完了していないパーサーからリクエストを取り出そうとした
    Incomplete,
    /// 入力元の読み込み失敗
    SourceIo { kind: io::ErrorKind, message: String },
}

impl Error {
    /// 入力元の I/O 失敗かどうか
    pub fn is_io(&self) -> bool {
        matches!(self, Error::SourceIo { .. } | Error::TruncatedMessage { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedRequestLine(msg) => write!(f, "malformed request line: {}", msg),
            Error::UnsupportedHttpVersion(version) => {
                write!(f, "unsupported HTTP version: {}", version)
            }
            Error::MalformedHeaderField(msg) => write!(f, "malformed header field: {}", msg),
            Error::TooManyHeaders { count, limit } => {
                write!(f, "too many headers: {} > {}", count, limit)
            }
            Error::AlreadyFailed => write!(f, "request parser already failed"),
            Error::TruncatedMessage { buffered } => write!(
                f,
                "input ended before end of headers ({} bytes buffered)",
                buffered
            ),
            Error::BufferCapacityExceeded { capacity } => {
                write!(f, "request head exceeds buffer capacity: {}", capacity)
            }
            Error::Incomplete => write!(f, "request head is not complete"),
            Error::SourceIo { kind, message } => {
                write!(f, "source I/O error ({:?}): {}", kind, message)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::SourceIo {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}
