//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Uri};
use axum::Router;
use mkhttps::{HttpServer, ProxyConfig};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Reserve a free local port, then release it so nothing is listening.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Serve `app` on `listener` in the background.
pub fn spawn_router(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
}

/// Start a raw backend that writes `response` verbatim and closes.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Backend that describes the request it received.
///
/// Body format: one `method`, `uri`, then `name: value` line per header,
/// a blank line, then the request body.
pub fn echo_router() -> Router {
    Router::new().fallback(|method: Method, uri: Uri, headers: HeaderMap, body: Bytes| async move {
        let mut out = format!("{}\n{}\n", method, uri);
        for (name, value) in headers.iter() {
            out.push_str(&format!("{}: {}\n", name, value.to_str().unwrap_or("<binary>")));
        }
        out.push('\n');
        let mut out = out.into_bytes();
        out.extend_from_slice(&body);
        out
    })
}

pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    spawn_router(listener, echo_router());
    addr
}

/// Backend answering every request with `body`.
pub async fn start_body_backend(body: Bytes) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(move || {
        let body = body.clone();
        async move { Body::from(body) }
    });
    spawn_router(listener, app);
    addr
}

pub fn proxy_config(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.host = upstream.to_string();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Start the proxy router over plain HTTP and return its address.
pub async fn start_proxy(upstream: SocketAddr) -> SocketAddr {
    let server = HttpServer::new(&proxy_config(upstream)).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    spawn_router(listener, server.router());
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Split an echo response into (request line parts, headers, body).
pub fn parse_echo(body: &[u8]) -> (String, String, Vec<(String, String)>, Vec<u8>) {
    let split = body
        .windows(2)
        .position(|w| w == b"\n\n")
        .expect("echo body has a header terminator");
    let head = std::str::from_utf8(&body[..split]).unwrap();
    let mut lines = head.lines();
    let method = lines.next().unwrap().to_string();
    let uri = lines.next().unwrap().to_string();
    let headers = lines
        .map(|line| {
            let (name, value) = line.split_once(": ").unwrap();
            (name.to_string(), value.to_string())
        })
        .collect();
    (method, uri, headers, body[split + 2..].to_vec())
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's events here until the guard drops.
    ///
    /// Only events from the current thread are seen, so pair it with a
    /// current-thread runtime.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
