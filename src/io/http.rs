use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use anyhow::{Result, bail};

/// Status and body of a completed HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches bytes from a URL.
///
/// Non-success statuses come back as a normal [`HttpResponse`]; only
/// transport-level failures are errors. Retry policy belongs to the
/// implementation.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub timeout: Duration,
    pub max_retry: u32,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retry: 3,
        }
    }
}

/// [`HttpTransport`] backed by `reqwest` with rustls.
pub struct ReqwestTransport {
    client: Client,
    max_retry: u32,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            max_retry: settings.max_retry,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<HttpResponse> {
        let mut retry_count = 0;

        loop {
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(*name, value);
            }

            match request.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.bytes().await?.to_vec();
                    log::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
                    return Ok(HttpResponse { status, body });
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count > self.max_retry {
                        bail!("max retries exceeded: {}", e);
                    }
                    log::warn!(
                        "Connection error, retry {}/{}: {}",
                        retry_count,
                        self.max_retry,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
