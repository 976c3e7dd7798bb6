//! Built-in functions every worker offers out of the box.
//!
//! Numeric functions work on raw JSON numbers so integer inputs stay integers;
//! they fall back to floating point when either side is fractional or the integer
//! result would overflow.

use super::registry::{Function, FunctionRegistry};

use anyhow::Result;
use serde_json::{Number, Value};
use std::sync::Arc;

pub fn register_all(registry: &FunctionRegistry) {
    registry.register(
        "add",
        reduce(|a, b| arithmetic(&a, &b, i64::checked_add, |x, y| x + y)),
    );
    registry.register(
        "mul",
        reduce(|a, b| arithmetic(&a, &b, i64::checked_mul, |x, y| x * y)),
    );
    registry.register(
        "max",
        reduce(|a, b| Ok(if as_f64(&b)? > as_f64(&a)? { b } else { a })),
    );
    registry.register(
        "min",
        reduce(|a, b| Ok(if as_f64(&b)? < as_f64(&a)? { b } else { a })),
    );
    registry.register("concat", reduce(concat));

    registry.register(
        "square",
        map(|v| arithmetic(&v, &v, i64::checked_mul, |x, y| x * y)),
    );
    registry.register(
        "double",
        map(|v| arithmetic(&v, &v, i64::checked_add, |x, y| x + y)),
    );
    registry.register(
        "negate",
        map(|v| arithmetic(&Value::from(0), &v, i64::checked_sub, |x, y| x - y)),
    );
    registry.register("identity", map(Ok));

    registry.register("is_even", filter(|v| Ok(as_i64(v)? % 2 == 0)));
    registry.register("is_odd", filter(|v| Ok(as_i64(v)? % 2 != 0)));
    registry.register("is_positive", filter(|v| Ok(as_f64(v)? > 0.0)));
}

fn map(f: impl Fn(Value) -> Result<Value> + Send + Sync + 'static) -> Function {
    Function::Map(Arc::new(f))
}

fn filter(f: impl Fn(&Value) -> Result<bool> + Send + Sync + 'static) -> Function {
    Function::Filter(Arc::new(f))
}

fn reduce(f: impl Fn(Value, Value) -> Result<Value> + Send + Sync + 'static) -> Function {
    Function::Reduce(Arc::new(f))
}

fn as_i64(value: &Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("expected an integer, got {}", value))
}

fn as_f64(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("expected a number, got {}", value))
}

fn arithmetic(
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(result) = int_op(x, y) {
            return Ok(Value::from(result));
        }
    }

    let result = float_op(as_f64(a)?, as_f64(b)?);
    Number::from_f64(result)
        .map(Value::Number)
        .ok_or_else(|| anyhow::anyhow!("result is not a finite number"))
}

fn concat(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            Ok(Value::String(a))
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Ok(Value::Array(a))
        }
        (a, b) => anyhow::bail!("cannot concatenate {} and {}", a, b),
    }
}
