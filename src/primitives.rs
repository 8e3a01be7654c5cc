//! Deterministic helpers in continuation-passing form.
//!
//! Each helper computes its result and passes it straight to `k`.

use tracing::info;

use crate::effects::{Cont, Step};
use crate::error::{InferenceError, Result};
use crate::value::Value;

fn arithmetic(
    op: &'static str,
    x: &Value,
    y: &Value,
    ints: fn(i64, i64) -> Option<i64>,
    floats: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (x, y) {
        (Value::Int(a), Value::Int(b)) => ints(*a, *b)
            .map(Value::Int)
            .ok_or_else(|| InferenceError::Arithmetic(format!("{} overflowed on {} and {}", op, a, b))),
        _ => Ok(Value::Float(floats(x.expect_f64(op)?, y.expect_f64(op)?))),
    }
}

/// `k(x + y)`. Strings concatenate; integers stay integers.
pub fn plus(k: Cont, x: Value, y: Value) -> Result<Step> {
    let sum = match (&x, &y) {
        (Value::Str(a), Value::Str(b)) => Value::Str(format!("{}{}", a, b)),
        _ => arithmetic("plus", &x, &y, i64::checked_add, |a, b| a + b)?,
    };
    k.resume(sum)
}

/// `k(x - y)`.
pub fn minus(k: Cont, x: Value, y: Value) -> Result<Step> {
    k.resume(arithmetic("minus", &x, &y, i64::checked_sub, |a, b| a - b)?)
}

/// `k(x * y)`.
pub fn times(k: Cont, x: Value, y: Value) -> Result<Step> {
    k.resume(arithmetic("times", &x, &y, i64::checked_mul, |a, b| a * b)?)
}

/// `k(x && y)`.
pub fn and(k: Cont, x: Value, y: Value) -> Result<Step> {
    let result = x.expect_bool("and")? && y.expect_bool("and")?;
    k.resume(Value::Bool(result))
}

/// Emit `x` as a `display` event and continue with `Value::Unit`.
pub fn display(k: Cont, x: Value) -> Result<Step> {
    info!(target: "probly::display", value = %x);
    k.resume(Value::Unit)
}

/// Apply a plain function to `args` and pass the result to `k`.
pub fn call_primitive<F>(k: Cont, f: F, args: &[Value]) -> Result<Step>
where
    F: FnOnce(&[Value]) -> Result<Value>,
{
    k.resume(f(args)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(step: Result<Step>) -> Value {
        match step.unwrap() {
            Step::Exit(value) => value,
            other => panic!("expected exit, got {:?}", other),
        }
    }

    #[test]
    fn arithmetic_keeps_integers_and_widens_mixed() {
        assert_eq!(collect(plus(Cont::exit(), Value::Int(2), Value::Int(3))), Value::Int(5));
        assert_eq!(collect(minus(Cont::exit(), Value::Int(2), Value::Float(0.5))), Value::Float(1.5));
        assert_eq!(collect(times(Cont::exit(), Value::Float(1.5), Value::Int(2))), Value::Float(3.0));
        assert_eq!(
            collect(plus(Cont::exit(), Value::from("ab"), Value::from("c"))),
            Value::from("abc")
        );
    }

    #[test]
    fn overflow_and_type_errors_propagate() {
        assert!(matches!(
            plus(Cont::exit(), Value::Int(i64::MAX), Value::Int(1)),
            Err(InferenceError::Arithmetic(_))
        ));
        assert!(matches!(
            and(Cont::exit(), Value::Bool(true), Value::Int(1)),
            Err(InferenceError::TypeMismatch { op: "and", .. })
        ));
    }

    #[test]
    fn and_display_and_call() {
        assert_eq!(
            collect(and(Cont::exit(), Value::Bool(true), Value::Bool(false))),
            Value::Bool(false)
        );
        assert_eq!(collect(display(Cont::exit(), Value::Int(1))), Value::Unit);
        let len = |args: &[Value]| Ok::<_, InferenceError>(Value::Int(args.len() as i64));
        assert_eq!(
            collect(call_primitive(Cont::exit(), len, &[Value::Unit, Value::Unit])),
            Value::Int(2)
        );
    }
}
