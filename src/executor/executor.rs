//! Remote Executor
//!
//! Runs one chunk on one worker. This is the unit of concurrency of a dispatch
//! round: the dispatcher spawns one execution per pending chunk and joins them all.
//!
//! Failures never escape: a timeout, a transport error or an answer of the wrong
//! shape all come back as `None`, and retrying is left to the dispatcher.

use super::transport::Transport;
use super::types::ExecuteRequest;

use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub struct RemoteExecutor<T> {
    transport: Arc<T>,
}

impl<T> Clone for RemoteExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

impl<T: Transport> RemoteExecutor<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Executes `request` on `destination` and returns the result, or `None` if
    /// no valid result arrived within `timeout`.
    pub async fn execute(
        &self,
        request: ExecuteRequest,
        destination: SocketAddr,
        timeout: Duration,
    ) -> Option<Value> {
        let op = request.op;
        let chunk_len = request.chunk.len();

        let sent = self.transport.send_operation(request, destination, timeout);

        match tokio::time::timeout(timeout, sent).await {
            Ok(Ok(result)) if op.accepts(chunk_len, &result) => {
                tracing::trace!("{} chunk of {} completed on {}", op, chunk_len, destination);
                Some(result)
            }
            Ok(Ok(result)) => {
                tracing::warn!(
                    "Discarding malformed {} result from {} for a chunk of {}: {}",
                    op,
                    destination,
                    chunk_len,
                    result
                );
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("{} chunk failed on {}: {}", op, destination, e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "{} chunk timed out on {} after {:?}",
                    op,
                    destination,
                    timeout
                );
                None
            }
        }
    }
}
