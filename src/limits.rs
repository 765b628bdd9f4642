/// デコーダーの制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderLimits {
    /// 作業バッファの容量 (デフォルト: 1KB)
    ///
    /// リクエストライン 1 行、またはまだ消費されていないヘッダー行が
    /// この容量に収まらない場合は `BufferCapacityExceeded` になる。
    pub buffer_capacity: usize,
    /// 最大ヘッダー数 (デフォルト: 100)
    pub max_headers_count: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            buffer_capacity: 1024, // 1KB
            max_headers_count: 100,
        }
    }
}

impl DecoderLimits {
    /// ヘッダー数の制限なしの設定を作成
    ///
    /// 作業バッファは確保する必要があるため容量は指定する。
    pub fn unlimited(buffer_capacity: usize) -> Self {
        Self {
            buffer_capacity,
            max_headers_count: usize::MAX,
        }
    }
}
