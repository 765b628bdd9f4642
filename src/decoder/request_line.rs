//! リクエストラインのデコード

use crate::error::Error;

use super::{CRLF, find_line};

/// サポートする唯一の HTTP バージョン
pub const HTTP_1_1: &str = "HTTP/1.1";

/// リクエストライン
///
/// `version` はパースに成功した時点で常に `HTTP/1.1` になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// HTTP メソッド (GET, POST, etc.)
    pub method: String,
    /// リクエストターゲット
    pub target: String,
    /// HTTP バージョン
    pub version: String,
}

impl RequestLine {
    /// リクエストラインを作成 (HTTP/1.1)
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: method.to_string(),
            target: target.to_string(),
            version: HTTP_1_1.to_string(),
        }
    }
}

/// バッファ先頭からリクエストラインをパース
///
/// CRLF が見つからない場合は `Ok(None)` を返す。状態を持たないため、
/// 同じプレフィックスに対して何度呼んでも同じ結果になる。
/// 成功時は CRLF を含む消費バイト数を返す。
pub fn parse_request_line(buf: &[u8]) -> Result<Option<(RequestLine, usize)>, Error> {
    let Some(pos) = find_line(buf) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&buf[..pos])
        .map_err(|e| Error::MalformedRequestLine(format!("invalid UTF-8: {e}")))?;

    // METHOD SP TARGET SP VERSION
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(format!(
            "expected 3 fields, got {}",
            parts.len()
        )));
    };

    if method.is_empty() {
        return Err(Error::MalformedRequestLine("empty method".to_string()));
    }
    if target.is_empty() {
        return Err(Error::MalformedRequestLine("empty target".to_string()));
    }

    check_http_version(version)?;

    let request_line = RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: HTTP_1_1.to_string(),
    };
    Ok(Some((request_line, pos + CRLF.len())))
}

/// HTTP バージョンを検証
///
/// `HTTP/<digits>` の形でなければ MalformedRequestLine、
/// 形は正しいが 1.1 でなければ UnsupportedHttpVersion
fn check_http_version(version: &str) -> Result<(), Error> {
    let parts: Vec<&str> = version.split('/').collect();
    let [name, number] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(format!(
            "invalid HTTP version: {}",
            version
        )));
    };

    if *name != "HTTP" || !is_version_number(number) {
        return Err(Error::MalformedRequestLine(format!(
            "invalid HTTP version: {}",
            version
        )));
    }

    if *number != "1.1" {
        return Err(Error::UnsupportedHttpVersion(version.to_string()));
    }

    Ok(())
}

/// DIGITS [ "." DIGITS ]
fn is_version_number(s: &str) -> bool {
    let is_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    match s.split_once('.') {
        Some((major, minor)) => is_digits(major) && is_digits(minor),
        None => is_digits(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_get_root() {
        let (line, consumed) = parse_request_line(b"GET / HTTP/1.1\r\nHost: example.com\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(line, RequestLine::new("GET", "/"));
        assert_eq!(consumed, 16);
    }

    #[test]
    fn parse_path_target() {
        let (line, _) = parse_request_line(b"POST /coffee HTTP/1.1\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(line.method, "POST");
        assert_eq!(line.target, "/coffee");
        assert_eq!(line.version, "HTTP/1.1");
    }

    #[test]
    fn insufficient_data_is_idempotent() {
        let partial = b"GET / HTTP/1.";
        assert_eq!(parse_request_line(partial), Ok(None));
        assert_eq!(parse_request_line(partial), Ok(None));
        // CR だけでは区切りにならない
        assert_eq!(parse_request_line(b"GET / HTTP/1.1\r"), Ok(None));
    }

    #[test]
    fn wrong_field_count() {
        assert!(matches!(
            parse_request_line(b"GET /\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
        assert!(matches!(
            parse_request_line(b"/coffee HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
        // 連続した空白はフィールド数を増やす
        assert!(matches!(
            parse_request_line(b"GET  / HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn empty_tokens() {
        assert!(matches!(
            parse_request_line(b" / HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn unsupported_version() {
        assert_eq!(
            parse_request_line(b"GET / HTTP/1.0\r\n"),
            Err(Error::UnsupportedHttpVersion("HTTP/1.0".to_string()))
        );
        assert_eq!(
            parse_request_line(b"GET / HTTP/2\r\n"),
            Err(Error::UnsupportedHttpVersion("HTTP/2".to_string()))
        );
    }

    #[test]
    fn malformed_version() {
        for line in [
            &b"GET / HTTPS/1.1\r\n"[..],
            b"GET / HTTP/1.1/2\r\n",
            b"GET / HTTP1.1\r\n",
            b"GET / HTTP/one\r\n",
            b"GET / HTTP/1.\r\n",
        ] {
            assert!(
                matches!(parse_request_line(line), Err(Error::MalformedRequestLine(_))),
                "{:?}",
                String::from_utf8_lossy(line)
            );
        }
    }

    #[test]
    fn invalid_utf8() {
        assert!(matches!(
            parse_request_line(b"GET /\xff HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }
}
