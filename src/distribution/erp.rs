//! Library of elementary random primitives.

use rand::{Rng, RngCore};

use super::sampling::{multinomial_sample, validate_weights};
use super::Distribution;
use crate::error::{InferenceError, Result};
use crate::value::Value;

fn bernoulli_weight(params: &[Value]) -> Result<f64> {
    let weight = params
        .first()
        .and_then(Value::as_f64)
        .ok_or_else(|| InferenceError::invalid_params("bernoulli", "expected [weight]"))?;
    if !(0.0..=1.0).contains(&weight) {
        return Err(InferenceError::invalid_params(
            "bernoulli",
            format!("weight {} outside [0, 1]", weight),
        ));
    }
    Ok(weight)
}

/// Coin flip. Params: `[weight]`, the probability of `true`.
pub fn bernoulli() -> Distribution {
    Distribution::new(
        "bernoulli",
        |params, rng| {
            let weight = bernoulli_weight(params)?;
            Ok(Value::Bool(rng.gen::<f64>() < weight))
        },
        |params, value| {
            let weight = bernoulli_weight(params)?;
            Ok(match value {
                Value::Bool(true) => weight.ln(),
                Value::Bool(false) => (1.0 - weight).ln(),
                _ => f64::NEG_INFINITY,
            })
        },
        |params| {
            let weight = bernoulli_weight(params)?;
            let mut support = Vec::with_capacity(2);
            if weight > 0.0 {
                support.push(Value::Bool(true));
            }
            if weight < 1.0 {
                support.push(Value::Bool(false));
            }
            Ok(support)
        },
    )
}

fn categorical_weights(params: &[Value]) -> Result<Vec<f64>> {
    let weights = params
        .iter()
        .map(|p| {
            p.as_f64().ok_or_else(|| {
                InferenceError::invalid_params("categorical", format!("weight {} is not a number", p))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    validate_weights("categorical", &weights)?;
    Ok(weights)
}

/// Draw an index `i` with probability proportional to `params[i]`.
///
/// Only indices with positive weight belong to the support.
pub fn categorical() -> Distribution {
    Distribution::new(
        "categorical",
        |params, rng: &mut dyn RngCore| {
            let weights = categorical_weights(params)?;
            Ok(Value::Int(multinomial_sample(&weights, rng)? as i64))
        },
        |params, value| {
            let weights = categorical_weights(params)?;
            let total: f64 = weights.iter().sum();
            let mass = value
                .as_int()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| weights.get(i).copied())
                .unwrap_or(0.0);
            Ok((mass / total).ln())
        },
        |params| {
            let weights = categorical_weights(params)?;
            Ok(weights
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > 0.0)
                .map(|(i, _)| Value::Int(i as i64))
                .collect())
        },
    )
}

/// Uniform choice among the items in `params`. Repeated items count once per occurrence.
pub fn uniform_draw() -> Distribution {
    Distribution::new(
        "uniform_draw",
        |params, rng| {
            if params.is_empty() {
                return Err(InferenceError::invalid_params("uniform_draw", "no items"));
            }
            Ok(params[rng.gen_range(0..params.len())].clone())
        },
        |params, value| {
            if params.is_empty() {
                return Err(InferenceError::invalid_params("uniform_draw", "no items"));
            }
            let hits = params.iter().filter(|p| *p == value).count();
            Ok((hits as f64 / params.len() as f64).ln())
        },
        |params| {
            let mut support: Vec<Value> = Vec::with_capacity(params.len());
            for p in params {
                if !support.contains(p) {
                    support.push(p.clone());
                }
            }
            Ok(support)
        },
    )
}
