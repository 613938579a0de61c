//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Bytes, http::{HeaderMap, Method, Uri}, routing::any, Json, Router};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use rr_gateway::config::{GatewayConfig, ReloadEvent, ServerSource};
use rr_gateway::http::HttpServer;
use rr_gateway::lifecycle::Shutdown;
use rr_gateway::load_balancer::{Endpoint, RoundRobinSelector, ServerRegistry};

/// Start a mock backend that answers every request with `status` and `body`.
///
/// Returns the address and a hit counter.
pub async fn start_mock_backend(status: u16, body: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    start_programmable_backend(move || async move { (status, body.to_string()) }).await
}

/// Start a programmable mock backend with async support.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Arc<AtomicUsize>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        read_request(&mut socket).await;
                        counter.fetch_add(1, Ordering::SeqCst);

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, hits)
}

/// Start a backend that writes `response` verbatim and closes.
///
/// For responses the other helpers cannot produce, such as a body shorter
/// than its `Content-Length`.
pub async fn start_raw_backend(response: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                read_request(&mut socket).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}

/// Read one request (head and content-length body) so closing the socket
/// does not reset the peer.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);

        let Some(head_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&data[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= head_end + 4 + content_length {
            return;
        }
    }
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a backend that echoes what it received as JSON.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<serde_json::Value> {
        let mut header_values: Vec<(String, String)> = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        header_values.sort();
        Json(serde_json::json!({
            "method": method.as_str(),
            "uri": uri.to_string(),
            "headers": header_values,
            "body": String::from_utf8_lossy(&body),
        }))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

pub fn url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// A running gateway.
pub struct Gateway {
    pub addr: SocketAddr,
    pub registry: Arc<ServerRegistry>,
    pub selector: Arc<RoundRobinSelector>,
    pub reload_tx: mpsc::UnboundedSender<ReloadEvent>,
    pub shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn endpoints(hosts: &[String]) -> Vec<Endpoint> {
    hosts.iter().map(|h| Endpoint::parse(h).unwrap()).collect()
}

/// Start a gateway over `hosts`, reloading from `source`.
pub async fn spawn_gateway_with(
    config: GatewayConfig,
    hosts: &[String],
    source: Arc<dyn ServerSource>,
) -> Gateway {
    let registry = Arc::new(ServerRegistry::new(endpoints(hosts)));
    let shutdown = Shutdown::new();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, registry.clone(), source);
    let selector = server.selector().clone();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, reload_rx, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    Gateway {
        addr,
        registry,
        selector,
        reload_tx,
        shutdown,
    }
}

pub async fn spawn_gateway(hosts: &[String]) -> Gateway {
    let source = rr_gateway::config::InlineSource::from_hosts(hosts.to_vec());
    spawn_gateway_with(GatewayConfig::default(), hosts, Arc::new(source)).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `check` until it holds or a few seconds pass.
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
