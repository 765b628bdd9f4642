//! ヘッダーブロックのデコード

use crate::error::Error;

use super::{CRLF, find_line};

/// 同名ヘッダーが繰り返された場合の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateHeaders {
    /// 後から来た値で上書きする
    #[default]
    Overwrite,
    /// `", "` で連結する
    Combine,
    /// MalformedHeaderField として拒否する
    Reject,
}

/// ヘッダーマップ
///
/// 名前は大文字小文字を区別し、バイト列として完全一致で比較する。
/// 同名ヘッダーは 1 エントリにまとめられ、値は `DuplicateHeaders` に従う。
/// 反復順は最初に現れた順。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// 空のヘッダーマップを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ヘッダーを取得
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// ヘッダーが存在するか確認
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// ヘッダー数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (名前, 値) を順に返す
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// ヘッダーを追加
    ///
    /// 同名ヘッダーが既にある場合は `policy` に従う
    pub fn insert(
        &mut self,
        name: String,
        value: String,
        policy: DuplicateHeaders,
    ) -> Result<(), Error> {
        let Some((_, existing)) = self.entries.iter_mut().find(|(n, _)| *n == name) else {
            self.entries.push((name, value));
            return Ok(());
        };

        match policy {
            DuplicateHeaders::Overwrite => *existing = value,
            DuplicateHeaders::Combine => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            DuplicateHeaders::Reject => {
                return Err(Error::MalformedHeaderField(format!(
                    "duplicate header: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// ヘッダーブロックのパース進捗
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProgress {
    /// 完全な行がもう無い。続きのデータが必要
    Partial { consumed: usize },
    /// 空行 (ヘッダー終端) まで到達した
    Complete { consumed: usize },
}

impl HeaderProgress {
    /// この呼び出しで消費したバイト数
    pub fn consumed(&self) -> usize {
        match self {
            HeaderProgress::Partial { consumed } | HeaderProgress::Complete { consumed } => {
                *consumed
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, HeaderProgress::Complete { .. })
    }
}

/// ヘッダーブロックデコーダー
///
/// 複数回の `parse` 呼び出しにまたがってヘッダーを蓄積する。
#[derive(Debug, Clone, Default)]
pub struct HeaderDecoder {
    headers: HeaderMap,
    policy: DuplicateHeaders,
    max_headers_count: Option<usize>,
    fields_seen: usize,
}

impl HeaderDecoder {
    /// 新しいデコーダーを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 同名ヘッダーの扱いを設定
    pub fn duplicate_headers(mut self, policy: DuplicateHeaders) -> Self {
        self.policy = policy;
        self
    }

    /// ヘッダー行数の上限を設定
    pub fn max_headers_count(mut self, limit: usize) -> Self {
        self.max_headers_count = Some(limit);
        self
    }

    /// 蓄積済みのヘッダー
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 蓄積したヘッダーを取り出す
    pub fn take_headers(&mut self) -> HeaderMap {
        self.fields_seen = 0;
        std::mem::take(&mut self.headers)
    }

    /// バッファ先頭からヘッダー行をパース
    ///
    /// バッファ内の完全な行をすべて処理し、行が尽きるか空行に到達したら返る。
    /// 消費バイト数はこの呼び出しで処理した行 (CRLF 含む) の合計。
    pub fn parse(&mut self, buf: &[u8]) -> Result<HeaderProgress, Error> {
        let mut consumed = 0;

        loop {
            let rest = &buf[consumed..];
            let Some(pos) = find_line(rest) else {
                return Ok(HeaderProgress::Partial { consumed });
            };

            if pos == 0 {
                // 空行 - ヘッダー終端
                consumed += CRLF.len();
                return Ok(HeaderProgress::Complete { consumed });
            }

            if let Some(limit) = self.max_headers_count
                && self.fields_seen >= limit
            {
                return Err(Error::TooManyHeaders {
                    count: self.fields_seen + 1,
                    limit,
                });
            }

            let (name, value) = parse_field_line(&rest[..pos])?;
            self.headers.insert(name, value, self.policy)?;
            self.fields_seen += 1;
            consumed += pos + CRLF.len();
        }
    }
}

/// ヘッダー行を名前と値に分割
///
/// 最初のコロンでのみ分割するため、値にコロンを含めてよい。
/// 名前の先頭の空白は検証しない。
pub(crate) fn parse_field_line(line: &[u8]) -> Result<(String, String), Error> {
    let line = std::str::from_utf8(line)
        .map_err(|e| Error::MalformedHeaderField(format!("invalid UTF-8: {e}")))?;

    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| Error::MalformedHeaderField("missing colon".to_string()))?;

    if name.is_empty() {
        return Err(Error::MalformedHeaderField("empty name".to_string()));
    }
    if name.ends_with([' ', '\t']) {
        return Err(Error::MalformedHeaderField(format!(
            "whitespace before colon: {:?}",
            name
        )));
    }

    Ok((name.to_string(), value.trim().to_string()))
}
