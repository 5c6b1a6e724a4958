//! Shared test helpers: a canned-response HTTP server.
//!
//! The server binds an ephemeral port, answers each matched route with a
//! scripted sequence of responses (the last response repeats), and records
//! every request as `"METHOD /path"` so tests can assert on attempt counts.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub delay_ms: u64,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay_ms: 0,
        }
    }

    /// Delay the response; used to hold a request open so concurrent callers
    /// overlap deterministically.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

struct RouteState {
    method: String,
    path: String,
    responses: Mutex<Vec<CannedResponse>>,
}

pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Spawn a server answering the given `(method, path, responses)` routes.
    pub async fn spawn(routes: Vec<(&str, &str, Vec<CannedResponse>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let addr = listener.local_addr().expect("test server addr");

        let routes: Arc<Vec<RouteState>> = Arc::new(
            routes
                .into_iter()
                .map(|(method, path, responses)| RouteState {
                    method: method.to_string(),
                    path: path.to_string(),
                    responses: Mutex::new(responses),
                })
                .collect(),
        );
        let hits = Arc::new(Mutex::new(Vec::new()));

        let accept_hits = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&accept_hits);
                tokio::spawn(async move {
                    handle_connection(stream, routes, hits).await;
                });
            }
        });

        Self { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Number of requests matching `"METHOD /path"`.
    pub fn count(&self, method_path: &str) -> usize {
        self.hits()
            .iter()
            .filter(|hit| hit.as_str() == method_path)
            .count()
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: Arc<Vec<RouteState>>,
    hits: Arc<Mutex<Vec<String>>>,
) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];

    // Read until end of headers
    let header_end = loop {
        let n = match stream.read(&mut tmp).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        if buf.len() > 64 * 1024 {
            return;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default();
    let path = target.split('?').next().unwrap_or_default().to_string();

    // Drain the request body per Content-Length
    let mut content_length = 0usize;
    for line in head.lines().skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body_read = buf.len() - header_end;
    while body_read < content_length {
        match stream.read(&mut tmp).await {
            Ok(0) | Err(_) => break,
            Ok(n) => body_read += n,
        }
    }

    hits.lock().unwrap().push(format!("{} {}", method, path));

    let response = routes
        .iter()
        .find(|route| route.method == method && route.path == path)
        .map(|route| {
            let mut responses = route.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses
                    .first()
                    .cloned()
                    .unwrap_or_else(|| CannedResponse::json(500, "{}"))
            }
        })
        .unwrap_or_else(|| {
            CannedResponse::json(404, r#"{"success":false,"message":"no such route"}"#)
        });

    if response.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(response.delay_ms)).await;
    }

    let raw = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(raw.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
