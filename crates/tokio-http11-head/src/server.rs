//! HTTP リクエストヘッド リスナー
//!
//! 接続ごとにタスクを起動し、それぞれが専用のバッファとパーサーで
//! リクエストヘッドを読み込んでからハンドラーに渡す。
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_http11_head::{Connection, Request, Server};
//!
//! async fn handler(request: Request, conn: Connection) -> tokio_http11_head::Result<()> {
//!     println!("{} {} from {}", request.method(), request.target(), conn.peer_addr);
//!     Ok(())
//! }
//!
//! let server = Server::bind("0.0.0.0:42069").await?;
//! server.serve(handler).await?;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http11_head::{DecoderLimits, DuplicateHeaders, Request};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::reader::RequestReader;

/// `Connection` が持つ接続ストリーム
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// ヘッダー読み込み後の接続
pub struct Connection {
    /// 接続ストリーム
    pub stream: Box<dyn Stream>,
    /// 接続元アドレス
    pub peer_addr: SocketAddr,
    /// ヘッダー終端より後ろに既に受信していたバイト列
    pub pending: Vec<u8>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

/// リクエストヘッドハンドラー
pub trait Handler: Send + Sync + 'static {
    /// 読み込んだリクエストヘッドと接続を受け取る
    fn handle(&self, request: Request, conn: Connection) -> impl Future<Output = Result<()>> + Send;
}

/// 関数からハンドラーを作成
impl<F, Fut> Handler for F
where
    F: Fn(Request, Connection) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send,
{
    fn handle(&self, request: Request, conn: Connection) -> impl Future<Output = Result<()>> + Send {
        (self)(request, conn)
    }
}

/// リクエストヘッド リスナー
///
pub struct Server {
    listener: TcpListener,
    limits: DecoderLimits,
    duplicate_headers: DuplicateHeaders,
    read_timeout: Duration,
}

impl Server {
    /// 指定アドレスにバインド
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            limits: DecoderLimits::default(),
            duplicate_headers: DuplicateHeaders::default(),
            read_timeout: Duration::from_secs(30),
        })
    }

    /// デコーダーの制限を設定
    pub fn limits(mut self, limits: DecoderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 同名ヘッダーの扱いを設定
    pub fn duplicate_headers(mut self, policy: DuplicateHeaders) -> Self {
        self.duplicate_headers = policy;
        self
    }

    /// 1 回の読み込みのタイムアウトを設定
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// ローカルアドレスを取得
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    fn config(&self) -> Arc<ConnectionConfig> {
        Arc::new(ConnectionConfig {
            limits: self.limits.clone(),
            duplicate_headers: self.duplicate_headers,
            read_timeout: self.read_timeout,
        })
    }

    /// サーバーを起動
    pub async fn serve<H: Handler>(self, handler: H) -> Result<()> {
        let config = self.config();
        let handler = Arc::new(handler);

        loop {
            let (stream, peer_addr) = self.listener.accept().await?;
            log::debug!("accepted connection from {}", peer_addr);

            let config = config.clone();
            let handler = handler.clone();

            tokio::spawn(async move {
                let result = handle_connection(Box::new(stream), peer_addr, config, handler).await;
                if let Err(e) = result {
                    log::warn!("connection error from {}: {}", peer_addr, e);
                }
            });
        }
    }

    /// 単一の接続を処理 (テスト用)
    pub async fn handle_one<H: Handler>(self, handler: H) -> Result<()> {
        let (stream, peer_addr) = self.listener.accept().await?;
        let config = self.config();
        let handler = Arc::new(handler);
        handle_connection(Box::new(stream), peer_addr, config, handler).await
    }
}

struct ConnectionConfig {
    limits: DecoderLimits,
    duplicate_headers: DuplicateHeaders,
    read_timeout: Duration,
}

/// 接続を処理
///
/// リクエストヘッドを 1 つ読み込んでハンドラーに渡す。
/// パースに失敗した場合は対応するステータスラインを返して閉じる。
async fn handle_connection<H: Handler>(
    stream: Box<dyn Stream>,
    peer_addr: SocketAddr,
    config: Arc<ConnectionConfig>,
    handler: Arc<H>,
) -> Result<()> {
    let mut reader = RequestReader::with_limits(stream, config.limits.clone())
        .duplicate_headers(config.duplicate_headers)
        .read_timeout(config.read_timeout);

    match reader.read_request().await {
        Ok(request) => {
            let (stream, pending) = reader.into_parts();
            let conn = Connection {
                stream,
                peer_addr,
                pending,
            };
            handler.handle(request, conn).await
        }
        Err(Error::Http(e)) => {
            if let Some(status_line) = rejection_status_line(&e) {
                let (mut stream, _) = reader.into_parts();
                stream.write_all(status_line).await?;
                stream.shutdown().await?;
            }
            Err(Error::Http(e))
        }
        Err(e) => Err(e),
    }
}

/// パースエラーに対する応答
///
/// 入力元の問題 (切断、読み込み失敗) には応答しない。
pub fn rejection_status_line(e: &http11_head::Error) -> Option<&'static [u8]> {
    use http11_head::Error as E;

    match e {
        E::MalformedRequestLine(_) | E::MalformedHeaderField(_) => {
            Some(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\nContent-Length: 0\r\n\r\n")
        }
        E::UnsupportedHttpVersion(_) => Some(
            b"HTTP/1.1 505 HTTP Version Not Supported\r\nConnection: close\r\nContent-Length: 0\r\n\r\n",
        ),
        E::BufferCapacityExceeded { .. } | E::TooManyHeaders { .. } => Some(
            b"HTTP/1.1 431 Request Header Fields Too Large\r\nConnection: close\r\nContent-Length: 0\r\n\r\n",
        ),
        E::AlreadyFailed | E::TruncatedMessage { .. } | E::Incomplete | E::SourceIo { .. } => None,
    }
}
