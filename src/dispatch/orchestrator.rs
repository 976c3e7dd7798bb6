//! Dispatch Orchestrator
//!
//! Drives map, filter and reduce calls across the workers found by discovery.
//!
//! ## Round Lifecycle
//! 1. **Discover**: start a discovery round and wait until at least one worker is known.
//! 2. **Assign**: map every chunk index to a worker, round-robin over a snapshot of the set.
//! 3. **Dispatch**: spawn one `RemoteExecutor` per chunk whose slot is still empty.
//! 4. **Join**: wait for every executor of the round; this is the only synchronization point.
//! 5. **Recover**: evict the workers that held failed chunks, double the timeout,
//!    rediscover if nobody is left, and go back to 2 until every slot is filled.
//!
//! Reduce repeats the whole lifecycle over the partial results until they are
//! few enough to fold locally.

use super::chunk::{assign_chunks, chunk_list, collect_partials, flatten};
use super::slots::ResultSlots;
use crate::config::{DispatchConfig, FailurePolicy};
use crate::discovery::service::Discovery;
use crate::discovery::types::WorkerAddr;
use crate::discovery::workers::WorkerSet;
use crate::executor::executor::RemoteExecutor;
use crate::executor::local;
use crate::executor::registry::FunctionRegistry;
use crate::executor::transport::Transport;
use crate::executor::types::{ExecuteRequest, OpKind};

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Parameters of one driver invocation. The timeout grows as rounds fail.
struct Operation<'a> {
    kind: OpKind,
    function: &'a str,
    policy: FailurePolicy,
    timeout: Duration,
}

/// Client entry point for distributed map, filter and reduce.
pub struct Dispatcher<D, T> {
    config: DispatchConfig,
    discovery: D,
    executor: RemoteExecutor<T>,
    functions: Arc<FunctionRegistry>,
}

impl<D: Discovery, T: Transport> Dispatcher<D, T> {
    /// Creates a dispatcher.
    ///
    /// `functions` is the caller's own registry. It is only consulted for the
    /// local pass at the end of a reduce; map and filter functions only need to
    /// exist on the workers.
    pub fn new(
        config: DispatchConfig,
        discovery: D,
        transport: T,
        functions: Arc<FunctionRegistry>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            discovery,
            executor: RemoteExecutor::new(Arc::new(transport)),
            functions,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Applies the named map function to every element, preserving order.
    ///
    /// Failed chunks are retried until every chunk has a result; without
    /// reachable workers this waits indefinitely. Use `map_with_cancel` to bound it.
    pub async fn map<I, O>(&self, function: &str, data: &[I]) -> Result<Vec<O>>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.map_with_cancel(function, data, &CancellationToken::new())
            .await
    }

    pub async fn map_with_cancel<I, O>(
        &self,
        function: &str,
        data: &[I],
        cancel: &CancellationToken,
    ) -> Result<Vec<O>>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let op = self.operation(OpKind::Map, function, FailurePolicy::Retry);
        let chunks = chunk_list(&encode(data)?, self.config.chunk_size);

        let slots = self.run_chunks(op, &chunks, cancel).await?;
        decode_all(flatten(slots.into_inner()))
    }

    /// Keeps the elements the named predicate accepts, preserving order.
    pub async fn filter<V>(&self, function: &str, data: &[V]) -> Result<Vec<V>>
    where
        V: Serialize + DeserializeOwned,
    {
        self.filter_with_cancel(function, data, &CancellationToken::new())
            .await
    }

    pub async fn filter_with_cancel<V>(
        &self,
        function: &str,
        data: &[V],
        cancel: &CancellationToken,
    ) -> Result<Vec<V>>
    where
        V: Serialize + DeserializeOwned,
    {
        let op = self.operation(OpKind::Filter, function, self.config.filter_policy);
        let chunks = chunk_list(&encode(data)?, self.config.chunk_size);

        let slots = self.run_chunks(op, &chunks, cancel).await?;
        decode_all(flatten(slots.into_inner()))
    }

    /// Folds the data with the named reduce function, which should be associative.
    ///
    /// Empty input is an error.
    pub async fn reduce<V>(&self, function: &str, data: &[V]) -> Result<V>
    where
        V: Serialize + DeserializeOwned,
    {
        self.reduce_with_cancel(function, data, &CancellationToken::new())
            .await
    }

    pub async fn reduce_with_cancel<V>(
        &self,
        function: &str,
        data: &[V],
        cancel: &CancellationToken,
    ) -> Result<V>
    where
        V: Serialize + DeserializeOwned,
    {
        if data.is_empty() {
            anyhow::bail!("cannot reduce an empty sequence");
        }

        let chunk_size = self.config.chunk_size;
        if data.len() > chunk_size {
            // The last level is folded locally, so the function must exist here too.
            self.functions.get_kind(function, OpKind::Reduce)?;
        }

        let mut current = encode(data)?;
        let mut level = 1;

        loop {
            let chunks = chunk_list(&current, chunk_size);
            tracing::debug!(
                "Reduce level {}: {} element(s) in {} chunk(s)",
                level,
                current.len(),
                chunks.len()
            );

            let op = self.operation(OpKind::Reduce, function, self.config.reduce_policy);
            let slots = self.run_chunks(op, &chunks, cancel).await?;
            let mut partials = collect_partials(slots.into_inner());

            if partials.is_empty() {
                anyhow::bail!("every reduce chunk failed at level {}", level);
            }

            if chunks.len() == 1 {
                // The worker already reduced the whole input.
                return decode(partials.swap_remove(0));
            }

            if partials.len() <= chunk_size {
                info!(
                    "Reducing {} partial result(s) locally after {} level(s)",
                    partials.len(),
                    level
                );
                return decode(local::reduce(&self.functions, function, partials)?);
            }

            current = partials;
            level += 1;
        }
    }

    fn operation<'a>(&self, kind: OpKind, function: &'a str, policy: FailurePolicy) -> Operation<'a> {
        Operation {
            kind,
            function,
            policy,
            timeout: self.config.timeout,
        }
    }

    /// Runs rounds until every chunk has a result, or after the first round when
    /// the policy drops failures.
    async fn run_chunks(
        &self,
        mut op: Operation<'_>,
        chunks: &[Vec<Value>],
        cancel: &CancellationToken,
    ) -> Result<ResultSlots> {
        let mut slots = ResultSlots::new(chunks.len());
        if chunks.is_empty() {
            return Ok(slots);
        }

        let mut workers = self.acquire_workers(cancel).await?;
        let mut round = 1;

        loop {
            let assignment = assign_chunks(&workers.snapshot(), chunks.len())?;
            let pending = slots.pending();

            info!(
                "{} '{}' round {}: dispatching {} of {} chunk(s) to {} worker(s), timeout {:?}",
                op.kind,
                op.function,
                round,
                pending.len(),
                chunks.len(),
                workers.len(),
                op.timeout
            );

            self.dispatch_round(&op, chunks, &assignment, &pending, &mut slots, cancel)
                .await?;

            if slots.is_complete() {
                return Ok(slots);
            }

            let failed = slots.pending();

            if op.policy == FailurePolicy::Drop {
                tracing::warn!(
                    "{} '{}': dropping {} failed chunk(s)",
                    op.kind,
                    op.function,
                    failed.len()
                );
                return Ok(slots);
            }

            let faulty: HashSet<WorkerAddr> = failed.iter().map(|&index| assignment[index]).collect();
            for worker in &faulty {
                if workers.remove(worker) {
                    tracing::warn!("Evicting unresponsive worker {}", worker);
                }
            }

            op.timeout = op.timeout.saturating_mul(2);

            if workers.is_empty() {
                info!("No workers left, starting a new discovery round");
                workers = self.acquire_workers(cancel).await?;
            }

            round += 1;
        }
    }

    /// Starts a discovery round and blocks until it yields a worker.
    async fn acquire_workers(&self, cancel: &CancellationToken) -> Result<Arc<WorkerSet>> {
        let workers = self.discovery.discover().await?;

        tokio::select! {
            _ = workers.wait_ready() => {}
            _ = cancel.cancelled() => anyhow::bail!("cancelled while waiting for workers"),
        }

        info!("{} worker(s) available", workers.len());
        Ok(workers)
    }

    /// Sends every pending chunk to its assigned worker and waits for all of them.
    async fn dispatch_round(
        &self,
        op: &Operation<'_>,
        chunks: &[Vec<Value>],
        assignment: &[WorkerAddr],
        pending: &[usize],
        slots: &mut ResultSlots,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut executions = JoinSet::new();

        for &index in pending {
            let executor = self.executor.clone();
            let request = ExecuteRequest {
                op: op.kind,
                function: op.function.to_string(),
                chunk: chunks[index].clone(),
            };
            let destination = assignment[index].destination(self.config.port);
            let timeout = op.timeout;

            executions.spawn(async move {
                let result = executor.execute(request, destination, timeout).await;
                (index, result)
            });
        }

        loop {
            tokio::select! {
                joined = executions.join_next() => match joined {
                    None => return Ok(()),
                    Some(Ok((index, Some(result)))) => slots.fill(index, result),
                    Some(Ok((index, None))) => {
                        tracing::debug!("Chunk {} produced no result this round", index);
                    }
                    Some(Err(e)) => {
                        tracing::error!("Chunk execution task failed: {}", e);
                    }
                },
                _ = cancel.cancelled() => {
                    executions.abort_all();
                    anyhow::bail!("{} '{}' cancelled", op.kind, op.function);
                }
            }
        }
    }
}

fn encode<T: Serialize>(data: &[T]) -> Result<Vec<Value>> {
    data.iter()
        .map(|item| Ok(serde_json::to_value(item)?))
        .collect()
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>> {
    values.into_iter().map(decode).collect()
}
