use anyhow::Result;
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::info;

use super::types::{DiscoveryMessage, RoundId, WorkerAddr};
use super::workers::WorkerSet;
use crate::config::DiscoveryConfig;

/// Source of worker addresses for a driver.
///
/// Every call starts a fresh discovery round and returns right away with a set
/// that is filled in the background. Callers wait on `WorkerSet::wait_ready`.
pub trait Discovery: Send + Sync {
    fn discover(&self) -> impl Future<Output = Result<Arc<WorkerSet>>> + Send;
}

/// Discovery over UDP: probes the multicast group and collects announcements.
pub struct MulticastDiscovery {
    config: DiscoveryConfig,
}

impl MulticastDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    fn probe_target(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.config.group, self.config.port))
    }
}

impl Discovery for MulticastDiscovery {
    async fn discover(&self) -> Result<Arc<WorkerSet>> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        let workers = Arc::new(WorkerSet::new());
        let round = RoundId::new();

        info!(
            "Starting discovery round {} via {}",
            round.0,
            self.probe_target()
        );

        tokio::spawn(listen(
            socket,
            Arc::downgrade(&workers),
            round,
            self.probe_target(),
            self.config.probe_interval,
        ));

        Ok(workers)
    }
}

/// Probes periodically and records announcements until the set is dropped.
async fn listen(
    socket: UdpSocket,
    workers: Weak<WorkerSet>,
    round: RoundId,
    target: SocketAddr,
    probe_interval: Duration,
) {
    let probe = match bincode::serialize(&DiscoveryMessage::Probe { round }) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::error!("Failed to serialize DiscoveryMessage::Probe: {}", e);
            return;
        }
    };

    let mut interval = tokio::time::interval(probe_interval);
    let mut buf = vec![0u8; 1024];

    loop {
        if workers.strong_count() == 0 {
            tracing::debug!("Discovery round {} superseded, stopping listener", round.0);
            return;
        }

        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = socket.send_to(&probe, target).await {
                    tracing::warn!("Failed to send discovery probe to {}: {}", target, e);
                } else {
                    tracing::trace!("Sent discovery probe to {}", target);
                }
            }
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, src)) => match bincode::deserialize::<DiscoveryMessage>(&buf[..len]) {
                    Ok(DiscoveryMessage::Announce { round: answered, exec_port }) if answered == round => {
                        let Some(workers) = workers.upgrade() else {
                            return;
                        };
                        let worker = WorkerAddr::new(src.ip(), exec_port);
                        if workers.insert(worker) {
                            info!("Discovered worker {} ({} known)", worker, workers.len());
                        }
                    }
                    Ok(other) => {
                        tracing::trace!("Ignoring discovery message from {}: {:?}", src, other);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to deserialize discovery message from {}: {}", src, e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to receive discovery packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

/// A fixed list of workers, handed out again on every round.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    workers: Vec<WorkerAddr>,
}

impl StaticDiscovery {
    pub fn new(workers: Vec<WorkerAddr>) -> Self {
        Self { workers }
    }
}

impl Discovery for StaticDiscovery {
    async fn discover(&self) -> Result<Arc<WorkerSet>> {
        tracing::debug!("Static discovery with {} worker(s)", self.workers.len());
        Ok(Arc::new(WorkerSet::from_workers(self.workers.iter().copied())))
    }
}

/// Worker-side half of discovery: answers probes with the executor's port.
pub struct Announcer {
    socket: Arc<UdpSocket>,
    exec_port: u16,
}

impl Announcer {
    /// Binds the discovery port and joins the group when it is a multicast address.
    /// A failed join is not fatal: unicast probes are still answered.
    pub async fn bind(config: &DiscoveryConfig, exec_port: u16) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;

        if config.group.is_multicast() {
            match socket.join_multicast_v4(config.group, Ipv4Addr::UNSPECIFIED) {
                Ok(()) => info!("Joined multicast group {}", config.group),
                Err(e) => tracing::warn!(
                    "Failed to join multicast group {}: {} (answering unicast probes only)",
                    config.group,
                    e
                ),
            }
        }

        Ok(Self {
            socket: Arc::new(socket),
            exec_port,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            "Announcing executor port {} on {}",
            self.exec_port,
            self.socket
                .local_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "<unbound>".to_string())
        );

        let mut buf = vec![0u8; 1024];

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, src)) => match bincode::deserialize::<DiscoveryMessage>(&buf[..len]) {
                    Ok(DiscoveryMessage::Probe { round }) => {
                        // Spread the answers of workers sharing a group.
                        let jitter = rand::random::<u64>() % 50;
                        tokio::time::sleep(Duration::from_millis(jitter)).await;

                        if let Err(e) = self.answer(round, src).await {
                            tracing::warn!("Failed to announce to {}: {}", src, e);
                        }
                    }
                    Ok(other) => {
                        tracing::trace!("Ignoring discovery message from {}: {:?}", src, other);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to deserialize message from {}: {}", src, e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to receive UDP packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    async fn answer(&self, round: RoundId, src: SocketAddr) -> Result<()> {
        let reply = DiscoveryMessage::Announce {
            round,
            exec_port: self.exec_port,
        };
        let encoded = bincode::serialize(&reply)?;
        self.socket.send_to(&encoded, src).await?;

        tracing::debug!("Announced to {} for round {}", src, round.0);
        Ok(())
    }
}
