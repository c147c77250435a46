use std::time::{Duration, Instant};

use reqwest::redirect::Policy;
use thiserror::Error;

use super::types::Probe;
use crate::config::ProbeConfig;

const USER_AGENT: &str = concat!("sitewatch/", env!("CARGO_PKG_VERSION"));

/// Why a probe produced no response
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Performs a single check against a target
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Exactly one attempt, no retries
    async fn check(&self, target: &str) -> Result<Probe, ProbeError>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let redirect = match config.max_redirects {
            0 => Policy::none(),
            max => Policy::limited(max),
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProbeError::Client)?;

        Ok(Self { client, timeout })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, target: &str) -> Result<Probe, ProbeError> {
        let start = Instant::now();

        let response = self.client.get(target).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(self.timeout)
            } else if e.is_connect() {
                ProbeError::Connect(e)
            } else {
                ProbeError::Request(e)
            }
        })?;

        // `send` resolves once headers are in; the body is never read.
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(Probe::from_status(response.status().as_u16(), latency_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer every connection with `status`, or never answer when `None`.
    async fn spawn_responder(status: Option<u16>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { return };
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;

                    match status {
                        Some(code) => {
                            let response = format!(
                                "HTTP/1.1 {code} Test\r\nLocation: /elsewhere\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        None => tokio::time::sleep(Duration::from_secs(30)).await,
                    }
                });
            }
        });

        addr
    }

    fn checker(timeout_seconds: u64, max_redirects: usize) -> HttpChecker {
        HttpChecker::new(&ProbeConfig {
            timeout_seconds,
            max_redirects,
            ..ProbeConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_ok_is_online() {
        let addr = spawn_responder(Some(200)).await;

        let probe = checker(5, 10).check(&format!("http://{addr}/")).await.unwrap();

        assert!(probe.online);
        assert_eq!(probe.status_code, Some(200));
        assert!(probe.latency_ms < 5_000);
    }

    #[tokio::test]
    async fn test_http_503_is_offline() {
        let addr = spawn_responder(Some(503)).await;

        let probe = checker(5, 10).check(&format!("http://{addr}/")).await.unwrap();

        assert!(!probe.online);
        assert_eq!(probe.status_code, Some(503));
    }

    #[tokio::test]
    async fn test_redirect_not_followed_is_offline() {
        let addr = spawn_responder(Some(301)).await;

        let probe = checker(5, 0).check(&format!("http://{addr}/")).await.unwrap();

        assert!(!probe.online);
        assert_eq!(probe.status_code, Some(301));
    }

    #[tokio::test]
    async fn test_connection_refused_is_probe_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = checker(5, 10).check(&format!("http://{addr}/")).await;

        assert!(matches!(result, Err(ProbeError::Connect(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn test_unresponsive_target_times_out() {
        let addr = spawn_responder(None).await;

        let start = Instant::now();
        let result = checker(1, 10).check(&format!("http://{addr}/")).await;

        assert!(matches!(result, Err(ProbeError::Timeout(_))), "got {result:?}");
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
