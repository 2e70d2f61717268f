//! Static file server for the web build.
//!
//! Serves everything under a root directory over plain HTTP: `GET /` returns
//! the root `index.html`, any other `GET` path maps to a file under the root
//! or 404s. No other routes, no request bodies, no auth.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

pub const DEFAULT_PORT: u16 = 3000;

pub struct StaticServer {
    listener: TcpListener,
    root: PathBuf,
}

impl StaticServer {
    pub async fn bind(addr: &str, root: PathBuf) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self { listener, root })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop: one spawned task per connection. Runs until the process
    /// is terminated.
    pub async fn run(self) -> Result<()> {
        info!(
            "serving {} on http://{}",
            self.root.display(),
            self.local_addr()?
        );

        loop {
            let (socket, peer) = self.listener.accept().await?;
            let root = self.root.clone();

            tokio::spawn(async move {
                debug!("connection from {peer}");
                if let Err(e) = handle_connection(socket, &root).await {
                    warn!("connection from {peer} failed: {e:#}");
                }
            });
        }
    }
}

const MAX_REQUEST_HEAD: usize = 8192;

async fn handle_connection(mut socket: TcpStream, root: &Path) -> Result<()> {
    // The request line may arrive in pieces; keep reading until the head
    // terminator shows up (or the peer hangs up, or the head gets absurd).
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            if head.is_empty() {
                return Ok(());
            }
            break;
        }
        head.extend_from_slice(&chunk[..n]);
        if head.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if head.len() > MAX_REQUEST_HEAD {
            socket
                .write_all(&http_response("400 Bad Request", "text/plain", b"bad request"))
                .await?;
            return Ok(());
        }
    }

    let request = String::from_utf8_lossy(&head);
    let mut parts = request.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m, t),
        _ => {
            socket
                .write_all(&http_response("400 Bad Request", "text/plain", b"bad request"))
                .await?;
            return Ok(());
        }
    };

    let response = if method != "GET" {
        http_response("405 Method Not Allowed", "text/plain", b"method not allowed")
    } else {
        match resolve_path(root, target) {
            Some(path) => match tokio::fs::read(&path).await {
                Ok(body) => {
                    debug!("200 {target}");
                    http_response("200 OK", content_type(&path), &body)
                }
                Err(_) => {
                    debug!("404 {target}");
                    http_response("404 Not Found", "text/plain", b"not found")
                }
            },
            None => http_response("404 Not Found", "text/plain", b"not found"),
        }
    };

    socket.write_all(&response).await?;
    socket.shutdown().await?;
    Ok(())
}

/// Map a request target to a file under the served root. Returns None for
/// targets that try to escape the root.
fn resolve_path(root: &Path, target: &str) -> Option<PathBuf> {
    let path = target.split(['?', '#']).next().unwrap_or("");
    let rel = path.trim_start_matches('/');
    let rel = if rel.is_empty() { "index.html" } else { rel };

    let rel = Path::new(rel);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(rel))
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript",
        Some("wasm") => "application/wasm",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn http_response(status: &str, ctype: &str, body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {ctype}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("web")
    }

    async fn request(addr: SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
            .await
            .unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[test]
    fn root_maps_to_index_html() {
        let root = Path::new("/srv");
        assert_eq!(
            resolve_path(root, "/"),
            Some(PathBuf::from("/srv/index.html"))
        );
        assert_eq!(
            resolve_path(root, "/app.js?v=2"),
            Some(PathBuf::from("/srv/app.js"))
        );
    }

    #[test]
    fn traversal_is_rejected() {
        let root = Path::new("/srv");
        assert_eq!(resolve_path(root, "/../etc/passwd"), None);
        assert_eq!(resolve_path(root, "/a/../../b"), None);
    }

    #[test]
    fn content_types_cover_web_assets() {
        assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("pkg/flycam.wasm")), "application/wasm");
        assert_eq!(content_type(Path::new("pkg/flycam.js")), "text/javascript");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }

    #[tokio::test]
    async fn get_root_returns_html() {
        let server = StaticServer::bind("127.0.0.1:0", web_root()).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let response = request(addr, "/").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains("text/html"));
        assert!(response.contains("<html"));
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let server = StaticServer::bind("127.0.0.1:0", web_root()).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let response = request(addr, "/nonexistent.js").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
    }

    #[tokio::test]
    async fn request_split_across_segments_is_served() {
        let server = StaticServer::bind("127.0.0.1:0", web_root()).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        // Request line delivered in two TCP segments
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET / HT").await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        stream
            .write_all(b"TP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test]
    async fn post_is_rejected() {
        let server = StaticServer::bind("127.0.0.1:0", web_root()).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 405"));
    }
}
