//! HTTP リクエストヘッドの状態機械

use crate::error::Error;
use crate::limits::DecoderLimits;
use crate::log;
use crate::request::Request;

use super::headers::{DuplicateHeaders, HeaderDecoder, HeaderProgress};
use super::phase::Phase;
use super::request_line::{RequestLine, parse_request_line};

/// HTTP リクエストヘッドパーサー (Sans I/O)
///
/// リクエストライン、ヘッダーの順にパースする。
/// `feed` には毎回「まだ消費されていないバイト列全体」を渡す。
/// 戻り値の消費バイト数だけ呼び出し側がバッファを進める。
#[derive(Debug, Clone)]
pub struct RequestParser {
    phase: Phase,
    request_line: Option<RequestLine>,
    headers: HeaderDecoder,
    consumed: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// 新しいパーサーを作成
    pub fn new() -> Self {
        Self::with_limits(&DecoderLimits::default())
    }

    /// 制限付きでパーサーを作成
    pub fn with_limits(limits: &DecoderLimits) -> Self {
        Self {
            phase: Phase::AwaitingRequestLine,
            request_line: None,
            headers: HeaderDecoder::new().max_headers_count(limits.max_headers_count),
            consumed: 0,
        }
    }

    /// 同名ヘッダーの扱いを設定
    pub fn duplicate_headers(mut self, policy: DuplicateHeaders) -> Self {
        self.headers = self.headers.duplicate_headers(policy);
        self
    }

    /// 現在の状態
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Complete または Failed に到達したか
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// これまでに消費した合計バイト数
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// データを投入
    ///
    /// この呼び出しで消費したバイト数を返す。
    /// リクエストラインが揃えば同じ呼び出しの中でヘッダーのパースに進む。
    /// Complete 以降の呼び出しは何もせず 0 を返す。
    /// Failed 以降の呼び出しはパースせずに `AlreadyFailed` を返す。
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, Error> {
        let mut read = 0;

        loop {
            match &self.phase {
                Phase::Failed(_) => return Err(Error::AlreadyFailed),
                Phase::Complete => break,
                Phase::AwaitingRequestLine => {
                    let parsed = match parse_request_line(&data[read..]) {
                        Ok(parsed) => parsed,
                        Err(e) => return Err(self.fail(e)),
                    };
                    let Some((request_line, n)) = parsed else {
                        break;
                    };
                    log::debug!(
                        "request line: {} {} {}",
                        request_line.method,
                        request_line.target,
                        request_line.version
                    );
                    self.request_line = Some(request_line);
                    read += n;
                    self.phase = Phase::AwaitingHeaders;
                }
                Phase::AwaitingHeaders => {
                    let progress = match self.headers.parse(&data[read..]) {
                        Ok(progress) => progress,
                        Err(e) => return Err(self.fail(e)),
                    };
                    read += progress.consumed();
                    if let HeaderProgress::Complete { .. } = progress {
                        log::debug!("header block complete: {} fields", self.headers.headers().len());
                        self.phase = Phase::Complete;
                    }
                    break;
                }
            }
        }

        self.consumed += read;
        Ok(read)
    }

    fn fail(&mut self, e: Error) -> Error {
        log::warning!("request head rejected: {}", e);
        self.phase = Phase::Failed(e.clone());
        e
    }

    /// 完了したリクエストを取り出す
    ///
    /// Complete でなければ途中のリクエストは返さない。
    /// Failed の場合は失敗原因、それ以外は `Incomplete` を返す。
    pub fn into_request(mut self) -> Result<Request, Error> {
        match self.phase {
            Phase::Complete => {
                let request_line = self.request_line.take().ok_or(Error::Incomplete)?;
                Ok(Request {
                    request_line,
                    headers: self.headers.take_headers(),
                })
            }
            Phase::Failed(e) => Err(e),
            Phase::AwaitingRequestLine | Phase::AwaitingHeaders => Err(Error::Incomplete),
        }
    }

    /// 完了したリクエストを取り出して次のリクエスト待ちに戻す
    ///
    /// Keep-Alive 接続で同じパーサーを使い回すときに使う。
    /// 成功すると状態は AwaitingRequestLine、`consumed` は 0 になり、
    /// 次のリクエストとして数え直す。
    pub fn take_request(&mut self) -> Result<Request, Error> {
        match &self.phase {
            Phase::Complete => {
                let request_line = self.request_line.take().ok_or(Error::Incomplete)?;
                let headers = self.headers.take_headers();
                self.reset();
                Ok(Request {
                    request_line,
                    headers,
                })
            }
            Phase::Failed(e) => Err(e.clone()),
            Phase::AwaitingRequestLine | Phase::AwaitingHeaders => Err(Error::Incomplete),
        }
    }

    /// パーサーをリセット
    ///
    /// Failed からも戻せる。新しいリクエストを最初から始める。
    pub fn reset(&mut self) {
        self.phase = Phase::AwaitingRequestLine;
        self.request_line = None;
        self.headers.take_headers();
        self.consumed = 0;
    }
}
