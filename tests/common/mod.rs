//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use tenant_gateway::config::GatewayConfig;
use tenant_gateway::http::HttpServer;
use tenant_gateway::lifecycle::Shutdown;

/// Start a mock renderer that echoes the request target and tenant header
/// back as JSON: `{"path": "/fa/car/x?y=1", "tenant": "car", "forwarded_host": ...}`.
pub async fn start_mock_renderer(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        loop {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    buf.extend_from_slice(&chunk[..n]);
                                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                            }
                        }

                        let head = String::from_utf8_lossy(&buf);
                        let mut lines = head.split("\r\n");
                        let target = lines
                            .next()
                            .and_then(|line| line.split(' ').nth(1))
                            .unwrap_or("")
                            .to_string();
                        let mut tenant = None;
                        let mut forwarded_host = None;
                        for line in lines {
                            if let Some((name, value)) = line.split_once(':') {
                                match name.trim().to_ascii_lowercase().as_str() {
                                    "x-subdomain" => tenant = Some(value.trim().to_string()),
                                    "x-forwarded-host" => {
                                        forwarded_host = Some(value.trim().to_string())
                                    }
                                    _ => {}
                                }
                            }
                        }

                        let body = serde_json::json!({
                            "path": target,
                            "tenant": tenant,
                            "forwarded_host": forwarded_host,
                        })
                        .to_string();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Running gateway under test.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<GatewayConfig>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the gateway on `gateway_addr` in front of a mock renderer on
/// `renderer_addr`. `tweak` adjusts the default configuration.
pub async fn start_gateway(
    gateway_addr: SocketAddr,
    renderer_addr: SocketAddr,
    tweak: impl FnOnce(&mut GatewayConfig),
) -> TestGateway {
    start_mock_renderer(renderer_addr).await;

    let mut config = GatewayConfig::default();
    config.listener.bind_address = gateway_addr.to_string();
    config.upstream.url = format!("http://{renderer_addr}");
    tweak(&mut config);

    let shutdown = Shutdown::new();
    let (tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(gateway_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;

    TestGateway {
        addr: gateway_addr,
        shutdown,
        config_updates: tx,
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn location(res: &reqwest::Response) -> &str {
    res.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
