//! Worker Discovery Module
//!
//! Finds the machines willing to execute chunks. A client probes a well-known
//! multicast group and workers answer with the port their executor listens on.
//!
//! ## Pieces
//! - **`WorkerSet`**: the live, ordered collection a driver snapshots and evicts from.
//! - **`Discovery`**: starts a round and hands back a `WorkerSet` filled in the background.
//!   `MulticastDiscovery` probes the network, `StaticDiscovery` serves a fixed seed list.
//! - **`Announcer`**: the worker side, answering probes.

pub mod service;
pub mod types;
pub mod workers;

#[cfg(test)]
mod tests;
