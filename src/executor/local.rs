//! Local Primitives
//!
//! Plain single-machine map, filter and reduce over one chunk. Workers run these
//! for every request; callers use `reduce` for the final pass over a short
//! sequence of partial results.

use super::registry::{Function, FunctionRegistry, ReduceFn};
use super::types::OpKind;

use anyhow::Result;
use serde_json::Value;

/// Applies the named function to a chunk, producing what a worker sends back:
/// an array for map and filter, a single value for reduce.
pub fn apply(
    registry: &FunctionRegistry,
    op: OpKind,
    function: &str,
    chunk: Vec<Value>,
) -> Result<Value> {
    match registry.get_kind(function, op)? {
        Function::Map(f) => {
            let mapped = chunk.into_iter().map(|v| f(v)).collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(mapped))
        }
        Function::Filter(f) => {
            let mut kept = Vec::with_capacity(chunk.len());
            for value in chunk {
                if f(&value)? {
                    kept.push(value);
                }
            }
            Ok(Value::Array(kept))
        }
        Function::Reduce(f) => fold(&f, chunk),
    }
}

/// Reduces a sequence to a single value with the named reduce function.
pub fn reduce(registry: &FunctionRegistry, function: &str, data: Vec<Value>) -> Result<Value> {
    let Function::Reduce(f) = registry.get_kind(function, OpKind::Reduce)? else {
        anyhow::bail!("Function '{}' is not a reduce function", function);
    };
    fold(&f, data)
}

fn fold(f: &ReduceFn, data: Vec<Value>) -> Result<Value> {
    let mut values = data.into_iter();
    let first = values
        .next()
        .ok_or_else(|| anyhow::anyhow!("cannot reduce an empty sequence"))?;
    values.try_fold(first, |acc, next| f(acc, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_keeps_order() {
        let registry = FunctionRegistry::with_builtins();

        let output = apply(
            &registry,
            OpKind::Filter,
            "is_even",
            vec![json!(1), json!(2), json!(3), json!(4), json!(5), json!(6)],
        )
        .unwrap();

        assert_eq!(output, json!([2, 4, 6]));
    }

    #[test]
    fn test_map_applies_to_every_element() {
        let registry = FunctionRegistry::with_builtins();

        let output = apply(&registry, OpKind::Map, "square", vec![json!(1), json!(2), json!(3)])
            .unwrap();

        assert_eq!(output, json!([1, 4, 9]));
    }

    #[test]
    fn test_reduce_folds_left() {
        let registry = FunctionRegistry::with_builtins();

        let output = reduce(&registry, "add", vec![json!(1), json!(2), json!(3), json!(4)]).unwrap();

        assert_eq!(output, json!(10));
    }

    #[test]
    fn test_reduce_single_element_is_identity() {
        let registry = FunctionRegistry::with_builtins();

        assert_eq!(reduce(&registry, "add", vec![json!(7)]).unwrap(), json!(7));
    }

    #[test]
    fn test_reduce_empty_is_rejected() {
        let registry = FunctionRegistry::with_builtins();

        let err = reduce(&registry, "add", vec![]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_wrong_function_kind_is_rejected() {
        let registry = FunctionRegistry::with_builtins();

        let err = apply(&registry, OpKind::Map, "add", vec![json!(1)]).unwrap_err();
        assert!(err.to_string().contains("not a map function"));
    }
}
