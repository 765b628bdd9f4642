#![no_main]

use std::collections::VecDeque;
use std::io;

use arbitrary::Arbitrary;
use http11_head::{
    ByteSource, DecoderLimits, DuplicateHeaders, Error, ReadOutcome, RequestReader,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum FuzzPolicy {
    Overwrite,
    Combine,
    Reject,
}

#[derive(Arbitrary, Debug)]
struct FuzzReader {
    buffer_capacity: u16,
    max_headers_count: u8,
    policy: FuzzPolicy,
    reads: Vec<Vec<u8>>,
}

struct Reads(VecDeque<Vec<u8>>);

impl ByteSource for Reads {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let Some(mut chunk) = self.0.pop_front() else {
            return Ok(ReadOutcome::End);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.0.push_front(chunk.split_off(n));
        }
        Ok(ReadOutcome::Bytes(n))
    }
}

fuzz_target!(|input: FuzzReader| {
    // 容量 0 では何も読めないので 1 以上にする
    let capacity = (input.buffer_capacity as usize).max(1);
    let limits = DecoderLimits {
        buffer_capacity: capacity,
        max_headers_count: input.max_headers_count as usize,
    };
    let policy = match input.policy {
        FuzzPolicy::Overwrite => DuplicateHeaders::Overwrite,
        FuzzPolicy::Combine => DuplicateHeaders::Combine,
        FuzzPolicy::Reject => DuplicateHeaders::Reject,
    };

    let total: usize = input.reads.iter().map(Vec::len).sum();
    let mut reader = RequestReader::with_limits(Reads(input.reads.into()), limits)
        .duplicate_headers(policy);

    match reader.read_request() {
        Ok(request) => {
            assert_eq!(request.version(), "HTTP/1.1");
            assert!(request.headers.len() <= input.max_headers_count as usize);
        }
        Err(Error::BufferCapacityExceeded { capacity: c }) => assert_eq!(c, capacity),
        Err(Error::TruncatedMessage { buffered }) => assert!(buffered < capacity),
        Err(_) => {}
    }

    let (_, pending) = reader.into_parts();
    assert!(pending.len() <= capacity.min(total));
});
