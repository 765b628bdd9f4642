use crate::decoder::{HeaderMap, RequestLine};

/// パースが完了した HTTP リクエストヘッド
///
/// `RequestParser` が Complete に到達したときにだけ作られる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// リクエストライン
    pub request_line: RequestLine,
    /// ヘッダー
    pub headers: HeaderMap,
}

impl Request {
    /// HTTP メソッド
    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    /// リクエストターゲット
    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    /// HTTP バージョン (常に HTTP/1.1)
    pub fn version(&self) -> &str {
        &self.request_line.version
    }

    /// ヘッダーを取得 (大文字小文字を区別する)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}
