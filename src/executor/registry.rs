//! Function Registry
//!
//! Maps function names (e.g. "add", "is_even") to Rust closures. Closures cannot
//! travel over the network, so callers and workers each hold a registry with the
//! same names and requests only carry the name.

use super::types::OpKind;

use anyhow::Result;
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub type MapFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;
pub type FilterFn = Arc<dyn Fn(&Value) -> Result<bool> + Send + Sync>;
pub type ReduceFn = Arc<dyn Fn(Value, Value) -> Result<Value> + Send + Sync>;

/// A registered function together with the operation it can serve.
#[derive(Clone)]
pub enum Function {
    Map(MapFn),
    Filter(FilterFn),
    Reduce(ReduceFn),
}

impl Function {
    pub fn kind(&self) -> OpKind {
        match self {
            Function::Map(_) => OpKind::Map,
            Function::Filter(_) => OpKind::Filter,
            Function::Reduce(_) => OpKind::Reduce,
        }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Function::{:?}", self.kind())
    }
}

pub struct FunctionRegistry {
    functions: DashMap<String, Function>,
}

impl FunctionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a registry holding the functions from `builtins`.
    pub fn with_builtins() -> Arc<Self> {
        let registry = Self::default();
        super::builtins::register_all(&registry);
        Arc::new(registry)
    }

    /// Registers an untyped function, replacing any previous one with the same name.
    pub fn register(&self, name: &str, function: Function) {
        tracing::debug!("Registered {} function: {}", function.kind(), name);
        self.functions.insert(name.to_string(), function);
    }

    /// Registers a map function. Elements are decoded into `T` and results encoded from `R`.
    pub fn register_map<T, R, F>(&self, name: &str, f: F)
    where
        T: DeserializeOwned + 'static,
        R: Serialize + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let map_fn: MapFn = Arc::new(move |value: Value| -> Result<Value> {
            let input: T = serde_json::from_value(value)?;
            Ok(serde_json::to_value(f(input))?)
        });
        self.register(name, Function::Map(map_fn));
    }

    /// Registers a filter predicate.
    pub fn register_filter<T, F>(&self, name: &str, f: F)
    where
        T: DeserializeOwned + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let filter_fn: FilterFn = Arc::new(move |value: &Value| -> Result<bool> {
            let input: T = serde_json::from_value(value.clone())?;
            Ok(f(&input))
        });
        self.register(name, Function::Filter(filter_fn));
    }

    /// Registers a binary reduce function. It should be associative, since chunks
    /// are reduced independently and their partial results reduced again.
    pub fn register_reduce<T, F>(&self, name: &str, f: F)
    where
        T: DeserializeOwned + Serialize + 'static,
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let reduce_fn: ReduceFn = Arc::new(move |acc: Value, next: Value| -> Result<Value> {
            let acc: T = serde_json::from_value(acc)?;
            let next: T = serde_json::from_value(next)?;
            Ok(serde_json::to_value(f(acc, next))?)
        });
        self.register(name, Function::Reduce(reduce_fn));
    }

    /// Looks up a function by name.
    pub fn get(&self, name: &str) -> Result<Function> {
        self.functions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| anyhow::anyhow!("Unknown function: {}", name))
    }

    /// Looks up a function by name and checks it serves `kind`.
    pub fn get_kind(&self, name: &str, kind: OpKind) -> Result<Function> {
        let function = self.get(name)?;
        if function.kind() != kind {
            anyhow::bail!(
                "Function '{}' is a {} function, not a {} function",
                name,
                function.kind(),
                kind
            );
        }
        Ok(function)
    }

    /// Returns a list of all registered function names.
    pub fn list_functions(&self) -> Vec<String> {
        self.functions
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self {
            functions: DashMap::new(),
        }
    }
}
