use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use uuid::Uuid;

/// Execution endpoint of a worker, as learned from discovery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WorkerAddr(pub SocketAddr);

impl WorkerAddr {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(ip, port))
    }

    /// Address requests are sent to. A port override keeps the worker's IP
    /// and replaces the announced port.
    pub fn destination(&self, port: Option<u16>) -> SocketAddr {
        match port {
            Some(port) => SocketAddr::new(self.0.ip(), port),
            None => self.0,
        }
    }
}

impl fmt::Display for WorkerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one discovery round, so late answers to an older round are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoundId(pub Uuid);

impl RoundId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

/// Datagrams exchanged on the discovery port (bincode encoded).
///
/// - `Probe`: sent by a client to the multicast group, asking workers to announce.
/// - `Announce`: a worker's unicast answer, carrying the port its executor listens on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DiscoveryMessage {
    Probe { round: RoundId },

    Announce { round: RoundId, exec_port: u16 },
}
