//! tokio_http11_head - Tokio integration for http11_head
//!
//! tokio を使用した非同期のリクエストヘッド読み込みと TCP リスナー。
//!
//! ## Features
//!
//! - `server` - TCP リスナー機能 (デフォルト有効)
//! - `full` - すべての機能を有効化
//!
//! ## 特徴
//!
//! - **http11_head ベース**: Sans I/O パーサーと固定容量バッファをそのまま使う
//! - **非同期 I/O**: tokio による完全非同期対応
//! - **タイムアウト**: 読み込みごとのタイムアウト
//! - **接続ごとに独立**: 接続ごとにタスク、バッファ、パーサーを持ち、共有状態はない
//!
//! ## リーダー
//!
//! ```ignore
//! use tokio_http11_head::RequestReader;
//!
//! let mut reader = RequestReader::new(stream).read_timeout(Duration::from_secs(10));
//! let request = reader.read_request().await?;
//! ```
//!
//! ## サーバー
//!
//! ```ignore
//! use tokio_http11_head::{Connection, Request, Server};
//!
//! async fn handler(request: Request, conn: Connection) -> tokio_http11_head::Result<()> {
//!     println!("{} {}", request.method(), request.target());
//!     Ok(())
//! }
//!
//! let server = Server::bind("0.0.0.0:42069").await?;
//! server.serve(handler).await?;
//! ```

pub mod error;
pub mod reader;
#[cfg(feature = "server")]
pub mod server;

pub use error::{Error, Result};
pub use reader::RequestReader;
#[cfg(feature = "server")]
pub use server::{Connection, Handler, Server, Stream, rejection_status_line};

// http11_head の型を re-export
pub use http11_head::{
    DecoderLimits, DuplicateHeaders, HeaderMap, Request, RequestLine, RequestParser,
};
