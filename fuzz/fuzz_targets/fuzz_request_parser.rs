#![no_main]

use http11_head::{Phase, RequestParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // データを一度に feed
    let mut whole = RequestParser::new();
    let whole_result = whole.feed(data);
    if let Ok(n) = whole_result {
        assert!(n <= data.len());
    }

    // データを分割して feed (ストリーミングシナリオ)
    let mut split = RequestParser::new();
    let mut pending = Vec::new();
    let mut last_consumed = 0;
    for chunk in data.chunks(17) {
        pending.extend_from_slice(chunk);
        match split.feed(&pending) {
            Ok(n) => {
                assert!(n <= pending.len());
                pending.drain(..n);
            }
            Err(_) => break,
        }
        assert!(split.consumed() >= last_consumed);
        last_consumed = split.consumed();
    }

    // 分割位置によって結果が変わらない
    assert_eq!(whole.phase(), split.phase());
    if matches!(whole.phase(), Phase::Complete) {
        assert_eq!(whole.consumed(), split.consumed());
        assert_eq!(whole.into_request().ok(), split.into_request().ok());
    }
});
