#![no_main]

use http11_head::{DuplicateHeaders, HeaderDecoder, HeaderProgress};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for policy in [
        DuplicateHeaders::Overwrite,
        DuplicateHeaders::Combine,
        DuplicateHeaders::Reject,
    ] {
        let mut decoder = HeaderDecoder::new().duplicate_headers(policy);
        let Ok(progress) = decoder.parse(data) else {
            continue;
        };
        assert!(progress.consumed() <= data.len());

        for (name, value) in decoder.headers().iter() {
            assert!(!name.is_empty());
            assert!(!name.ends_with([' ', '\t']));
            assert_eq!(value, value.trim());
        }

        if let HeaderProgress::Complete { consumed } = progress {
            assert!(data[..consumed].ends_with(b"\r\n"));
        }
    }
});
