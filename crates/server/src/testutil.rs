//! Test helpers for exercising network-facing components locally.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use mgnrega_client::{CircuitBreaker, UpstreamClient, UpstreamConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Loopback HTTP server answering every request with one fixed JSON body.
pub(crate) struct JsonStub {
    pub base_url: String,
    hits: Arc<AtomicU32>,
}

impl JsonStub {
    pub async fn serve(body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicU32::new(0));

        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });

        Self { base_url: format!("http://{addr}"), hits }
    }

    /// Number of requests answered so far.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Upstream client pointed at `base_url` with its own fresh breaker.
pub(crate) fn upstream_client(base_url: &str) -> Arc<UpstreamClient> {
    let config = UpstreamConfig::new("test-key", base_url);
    Arc::new(UpstreamClient::new(config, Arc::new(CircuitBreaker::new())).unwrap())
}
