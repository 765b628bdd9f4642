//! パース状態の定義

use crate::error::Error;

/// パース状態
///
/// 1 つのリクエストの中では AwaitingRequestLine → AwaitingHeaders → Complete の
/// 一方向にしか進まない。どの状態からでも Failed に遷移しうる。
/// Complete と Failed はそのリクエストにとって終端で、`feed` では抜けない。
///
/// `RequestParser::take_request` と `RequestParser::reset` は同じパーサーで
/// 次のリクエストを始めるもので、状態は AwaitingRequestLine に戻る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// リクエストライン待ち
    AwaitingRequestLine,
    /// ヘッダー待ち
    AwaitingHeaders,
    /// 完了
    Complete,
    /// 失敗 (原因のエラーを保持)
    Failed(Error),
}

impl Phase {
    /// 終端状態かどうか
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Failed(_))
    }
}
