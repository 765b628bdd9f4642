//! 固定容量の作業バッファ

use crate::error::Error;

/// 固定容量の作業バッファ
///
/// 先頭 `len` バイトが「パーサーに渡したがまだ消費されていないデータ」、
/// 残りが次の読み込み用の空き領域。容量は作成時に決まり、以後変わらない。
#[derive(Debug, Clone)]
pub struct HeadBuffer {
    buf: Box<[u8]>,
    len: usize,
}

impl HeadBuffer {
    /// 指定容量のバッファを作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// 溜まっているバイト数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 空き領域がないか
    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// 溜まっているデータ
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// 次の読み込み先となる空き領域
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    /// 空き領域に書き込んだ `n` バイトを確定する
    pub fn commit(&mut self, n: usize) -> Result<(), Error> {
        if n > self.buf.len() - self.len {
            return Err(Error::BufferCapacityExceeded {
                capacity: self.buf.len(),
            });
        }
        self.len += n;
        Ok(())
    }

    /// 空き領域の先頭にデータを書き込む
    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        let end = self.len + data.len();
        if end > self.buf.len() {
            return Err(Error::BufferCapacityExceeded {
                capacity: self.buf.len(),
            });
        }
        self.buf[self.len..end].copy_from_slice(data);
        self.len = end;
        Ok(())
    }

    /// 先頭 `n` バイトを捨てて残りを前に詰める
    ///
    /// `n` は溜まっているバイト数を超えてはならない。
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// 溜まっているデータをすべて取り出す
    pub fn take_filled(&mut self) -> Vec<u8> {
        let data = self.filled().to_vec();
        self.len = 0;
        data
    }
}
