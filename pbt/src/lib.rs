//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// リクエストヘッド生成
// ========================================

/// トークン文字
pub fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('.'),
    ]
}

/// トークン (1-max_len 文字)
pub fn token_string(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

/// HTTP メソッド
pub fn http_method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        Just("HEAD".to_string()),
        Just("OPTIONS".to_string()),
        "[A-Z]{1,10}".prop_map(|s| s),
    ]
}

/// リクエストターゲット (空白を含まない)
pub fn request_target() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        Just("*".to_string()),
        "/[a-zA-Z0-9/_.?=&%-]{1,64}".prop_map(|s| s),
    ]
}

/// ヘッダー名 (コロン、空白を含まない)
pub fn header_name() -> impl Strategy<Value = String> {
    token_string(32)
}

/// ヘッダー値 (前後の空白なし、CR/LF なし、コロンは可)
pub fn header_value() -> impl Strategy<Value = String> {
    "[!-~]([ -~]{0,62}[!-~])?".prop_map(|s| s)
}

/// 名前が重複しないヘッダーリスト
pub fn unique_headers() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::btree_map(header_name(), header_value(), 0..10)
        .prop_map(|map| map.into_iter().collect())
}

/// リクエストヘッドをエンコード
pub fn encode_head(method: &str, target: &str, headers: &[(String, String)]) -> Vec<u8> {
    let mut out = format!("{} {} HTTP/1.1\r\n", method, target);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str("\r\n");
    out.into_bytes()
}

/// データを指定位置で分割
///
/// `cuts` は任意の値でよく、データ長で剰余を取って使う。
pub fn split_at_cuts(data: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![];
    }
    let mut points: Vec<usize> = cuts.iter().map(|c| c % data.len()).collect();
    points.push(0);
    points.push(data.len());
    points.sort_unstable();
    points.dedup();
    points
        .windows(2)
        .map(|w| data[w[0]..w[1]].to_vec())
        .collect()
}
