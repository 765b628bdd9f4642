//! リクエストヘッドを表示する TCP リスナーの例 (tokio)
//!
//! 使い方:
//!   cargo run -p head_listener
//!   curl http://localhost:42069/coffee
//!
//!   # ログ出力
//!   RUST_LOG=debug cargo run -p head_listener

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio_http11_head::{Connection, DecoderLimits, DuplicateHeaders, Request, Server};

struct ListenerOptions {
    port: u16,
    buffer_capacity: usize,
    max_headers: usize,
    read_timeout_secs: u64,
    duplicate_headers: DuplicateHeaders,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let options = parse_args()?;

    let addr = format!("0.0.0.0:{}", options.port);
    let limits = DecoderLimits {
        buffer_capacity: options.buffer_capacity,
        max_headers_count: options.max_headers,
    };
    let server = Server::bind(&addr)
        .await?
        .limits(limits)
        .duplicate_headers(options.duplicate_headers)
        .read_timeout(Duration::from_secs(options.read_timeout_secs));

    log::info!("listening on http://{}", addr);

    server.serve(print_request).await?;
    Ok(())
}

async fn print_request(request: Request, mut conn: Connection) -> tokio_http11_head::Result<()> {
    log::info!(
        "{} {} from {}",
        request.method(),
        request.target(),
        conn.peer_addr
    );

    println!("{}", format_request(&request));

    conn.stream
        .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 0\r\n\r\n")
        .await?;
    conn.stream.shutdown().await?;
    Ok(())
}

fn format_request(request: &Request) -> String {
    let mut out = String::from("Request line:\n");
    out.push_str(&format!("- Method: {}\n", request.method()));
    out.push_str(&format!("- Target: {}\n", request.target()));
    out.push_str(&format!("- Version: {}\n", request.version()));
    out.push_str("Headers:");
    for (name, value) in request.headers.iter() {
        out.push_str(&format!("\n- {}: {}", name, value));
    }
    out
}

fn parse_args() -> Result<ListenerOptions, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "head_listener";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let port: u16 = noargs::opt("port")
        .short('p')
        .doc("Port to listen on")
        .default("42069")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    let buffer_capacity: usize = noargs::opt("buffer-capacity")
        .doc("Working buffer capacity in bytes")
        .default("1024")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    let max_headers: usize = noargs::opt("max-headers")
        .doc("Maximum number of header lines")
        .default("100")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    let read_timeout_secs: u64 = noargs::opt("read-timeout-secs")
        .doc("Timeout for each read in seconds")
        .default("30")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    let duplicate_headers: DuplicateHeaders = noargs::opt("duplicate-headers")
        .doc("Repeated header names: overwrite, combine or reject")
        .default("overwrite")
        .take(&mut args)
        .then(|o| parse_duplicate_headers(o.value()))
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(ListenerOptions {
        port,
        buffer_capacity,
        max_headers,
        read_timeout_secs,
        duplicate_headers,
    })
}

fn parse_duplicate_headers(value: &str) -> Result<DuplicateHeaders, String> {
    match value {
        "overwrite" => Ok(DuplicateHeaders::Overwrite),
        "combine" => Ok(DuplicateHeaders::Combine),
        "reject" => Ok(DuplicateHeaders::Reject),
        other => Err(format!("unknown duplicate header policy: {}", other)),
    }
}
