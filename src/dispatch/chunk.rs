//! Chunking, assignment and combining: the pure helpers around a dispatch round.

use crate::discovery::types::WorkerAddr;

use anyhow::Result;
use serde_json::Value;

/// Splits `data` into contiguous chunks of at most `size` elements.
///
/// The last chunk may be shorter; empty input gives no chunks.
pub fn chunk_list<T: Clone>(data: &[T], size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "chunk size must be at least 1");
    data.chunks(size).map(|chunk| chunk.to_vec()).collect()
}

/// Round-robin: chunk `i` goes to `workers[i % workers.len()]`.
pub fn assign_chunks(workers: &[WorkerAddr], n_chunks: usize) -> Result<Vec<WorkerAddr>> {
    if n_chunks == 0 {
        return Ok(Vec::new());
    }
    if workers.is_empty() {
        anyhow::bail!("cannot assign {} chunk(s) to an empty worker set", n_chunks);
    }

    Ok((0..n_chunks).map(|i| workers[i % workers.len()]).collect())
}

/// Concatenates per-chunk map or filter outputs in chunk order.
///
/// Empty slots (chunks that were dropped) contribute nothing.
pub fn flatten(slots: Vec<Option<Value>>) -> Vec<Value> {
    slots
        .into_iter()
        .flatten()
        .flat_map(|result| match result {
            Value::Array(items) => items,
            other => vec![other],
        })
        .collect()
}

/// Collects per-chunk reduce results in chunk order, skipping empty slots.
pub fn collect_partials(slots: Vec<Option<Value>>) -> Vec<Value> {
    slots.into_iter().flatten().collect()
}
