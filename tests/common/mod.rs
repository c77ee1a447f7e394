//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use eazybank_gateway::config::schema::{
    GatewayConfig, RewriteConfig, RouteConfig, ServiceConfig,
};
use eazybank_gateway::{HttpServer, Shutdown};

/// What a mock backend saw of a single request.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl SeenRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<SeenRequest> {
    let mut reader = BufReader::new(socket);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await.ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut header_line = String::new();
        reader.read_line(&mut header_line).await.ok()?;
        let trimmed = header_line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    Some(SeenRequest {
        method,
        path,
        headers,
    })
}

/// Start a programmable mock backend.
///
/// The closure receives what the backend saw of each request and returns
/// the (status, body) to answer with.
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn(SeenRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        if let Some(seen) = read_request(&mut socket).await {
                            let (status, body) = f(seen).await;
                            let status_text = match status {
                                200 => "200 OK",
                                201 => "201 Created",
                                404 => "404 Not Found",
                                429 => "429 Too Many Requests",
                                500 => "500 Internal Server Error",
                                502 => "502 Bad Gateway",
                                503 => "503 Service Unavailable",
                                _ => "200 OK",
                            };

                            let response_str = format!(
                                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status_text,
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response_str.as_bytes()).await;
                            let _ = socket.shutdown().await;
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Build a route whose rewrite strips the given prefix.
pub fn route(id: &str, prefix: &str, service: &str) -> RouteConfig {
    RouteConfig {
        id: id.to_string(),
        path_prefix: prefix.to_string(),
        service: service.to_string(),
        rewrite: RewriteConfig {
            pattern: format!("{}(?<segment>.*)", prefix),
            template: "/${segment}".to_string(),
        },
        breaker: Default::default(),
        fallback: Default::default(),
    }
}

pub fn service(name: &str, address: SocketAddr) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        address: address.to_string(),
    }
}

/// Spawn a gateway on the given address and wait for it to accept traffic.
pub async fn start_gateway(mut config: GatewayConfig, addr: SocketAddr) -> Shutdown {
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).expect("gateway config must compile");
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown
}

/// A reqwest client that never reuses pooled connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
