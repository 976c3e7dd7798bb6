//! Dispatch Module
//!
//! The client side of a data-parallel call. Input is cut into chunks, every chunk
//! is sent to a discovered worker, and the per-chunk results are combined in
//! input order.
//!
//! ## Submodules
//! - **`chunk`**: chunking, round-robin assignment and combining of chunk results.
//! - **`slots`**: `ResultSlots`, the index-aligned results of one call.
//! - **`orchestrator`**: `Dispatcher` with the map, filter and reduce drivers.
//!
//! ## Failure Handling
//! Map keeps retrying failed chunks: the workers that held them are evicted,
//! the timeout doubles, and a new discovery round starts once nobody is left.
//! Filter and reduce follow their configured `FailurePolicy`.

pub mod chunk;
pub mod orchestrator;
pub mod slots;
