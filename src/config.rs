//! Dispatch Configuration
//!
//! Tunables for a `Dispatcher`. Values are passed explicitly into the dispatcher,
//! so several dispatchers with different tuning can run in the same process.

use anyhow::Result;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Below this many elements a chunk is not worth splitting further.
pub const DEFAULT_CHUNK_SIZE: usize = 6;
pub const DEFAULT_MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(224, 3, 29, 71);
pub const DEFAULT_MULTICAST_PORT: u16 = 10000;
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What a driver does with chunks that are still empty after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Evict the workers that failed, double the timeout and resend the chunks.
    Retry,
    /// Keep what arrived and drop the failed chunks from the output.
    Drop,
}

/// Where and how often discovery probes are sent.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub group: Ipv4Addr,
    pub port: u16,
    pub probe_interval: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_MULTICAST_GROUP,
            port: DEFAULT_MULTICAST_PORT,
            probe_interval: DEFAULT_PROBE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum number of elements per chunk.
    pub chunk_size: usize,
    pub discovery: DiscoveryConfig,
    /// Initial per-round timeout. Doubled after every round with failures.
    pub timeout: Duration,
    /// Destination port override. `None` sends to the port each worker announced.
    pub port: Option<u16>,
    pub filter_policy: FailurePolicy,
    pub reduce_policy: FailurePolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            discovery: DiscoveryConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            port: None,
            filter_policy: FailurePolicy::Retry,
            reduce_policy: FailurePolicy::Retry,
        }
    }
}

impl DispatchConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_filter_policy(mut self, policy: FailurePolicy) -> Self {
        self.filter_policy = policy;
        self
    }

    pub fn with_reduce_policy(mut self, policy: FailurePolicy) -> Self {
        self.reduce_policy = policy;
        self
    }

    /// Rejects settings the drivers cannot make progress with.
    ///
    /// A chunk size of 1 would never shrink the data between reduce levels,
    /// so the minimum is 2.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < 2 {
            anyhow::bail!("chunk_size must be at least 2 (got {})", self.chunk_size);
        }
        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than zero");
        }
        if self.discovery.probe_interval.is_zero() {
            anyhow::bail!("probe_interval must be greater than zero");
        }
        Ok(())
    }
}
