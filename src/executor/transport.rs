//! Chunk Transport
//!
//! The boundary between the dispatcher and whatever carries a chunk to a worker.
//! `HttpTransport` speaks the JSON API in `protocol`; tests plug in their own.

use super::protocol::ENDPOINT_EXECUTE;
use super::types::{ExecuteRequest, ExecuteResponse};

use anyhow::Result;
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

pub trait Transport: Send + Sync + 'static {
    /// Sends one chunk to `destination` and returns the worker's result.
    ///
    /// Implementations must give up after `timeout`.
    fn send_operation(
        &self,
        request: ExecuteRequest,
        destination: SocketAddr,
        timeout: Duration,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Sends chunks as JSON over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Transport for HttpTransport {
    async fn send_operation(
        &self,
        request: ExecuteRequest,
        destination: SocketAddr,
        timeout: Duration,
    ) -> Result<Value> {
        let url = format!("http://{}{}", destination, ENDPOINT_EXECUTE);

        let response = self
            .http_client
            .post(url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let body: ExecuteResponse = response.json().await?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Worker {} answered {}: {}",
                destination,
                status,
                body.error.unwrap_or_default()
            ));
        }

        body.result
            .ok_or_else(|| anyhow::anyhow!("Worker {} sent no result", destination))
    }
}
