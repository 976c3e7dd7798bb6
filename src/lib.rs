//! Parallelogram: data-parallel map, filter and reduce on the local network.
//!
//! A client cuts its input into chunks and ships each chunk to a worker found
//! through multicast discovery. Workers run named functions from their
//! `FunctionRegistry` and answer over HTTP; the client stitches the answers back
//! together in input order.
//!
//! ## Architecture Modules
//! - **`config`**: defaults and the knobs of a `Dispatcher`.
//! - **`discovery`**: multicast probes and announcements, and the live `WorkerSet`.
//! - **`dispatch`**: chunking, assignment and the map, filter and reduce drivers.
//! - **`executor`**: running one chunk, locally or on a remote worker, and the
//!   worker's HTTP API.
//!
//! ```no_run
//! use parallelogram::{DispatchConfig, Dispatcher, FunctionRegistry, HttpTransport, MulticastDiscovery};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = DispatchConfig::default();
//! let dispatcher = Dispatcher::new(
//!     config.clone(),
//!     MulticastDiscovery::new(config.discovery.clone()),
//!     HttpTransport::new(),
//!     FunctionRegistry::with_builtins(),
//! )?;
//!
//! let squares: Vec<i64> = dispatcher.map("square", &[1, 2, 3]).await?;
//! let total: i64 = dispatcher.reduce("add", &squares).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod executor;

pub use config::{DiscoveryConfig, DispatchConfig, FailurePolicy};
pub use discovery::service::{Announcer, Discovery, MulticastDiscovery, StaticDiscovery};
pub use discovery::types::WorkerAddr;
pub use dispatch::orchestrator::Dispatcher;
pub use executor::registry::FunctionRegistry;
pub use executor::transport::{HttpTransport, Transport};
