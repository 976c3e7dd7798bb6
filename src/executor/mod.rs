//! Chunk Execution Module
//!
//! Everything involved in running one chunk of work, on either side of the wire.
//!
//! ## Submodules
//! - **`types`**: the operation kinds and the request/response carried per chunk.
//! - **`registry`**: maps function names to Rust closures; `builtins` fills in the standard set.
//! - **`local`**: single-machine map, filter and reduce over a chunk.
//! - **`transport`**: the `Transport` boundary and its HTTP implementation.
//! - **`executor`**: `RemoteExecutor`, one chunk on one worker within a timeout.
//! - **`handlers`** / **`protocol`**: the worker's HTTP API.

pub mod builtins;
pub mod executor;
pub mod handlers;
pub mod local;
pub mod protocol;
pub mod registry;
pub mod transport;
pub mod types;
