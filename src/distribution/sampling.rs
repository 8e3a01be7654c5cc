//! Inverse-CDF selection over discrete weights.
//!
//! Boundary rule: with a threshold `x` in `[0, total)`, the selected index is
//! the first one whose cumulative weight is strictly greater than `x`. A
//! zero-weight entry can therefore never be selected, even when `x == 0`.

use rand::{Rng, RngCore};

use crate::error::{InferenceError, Result};

/// Index picked by `threshold` over (possibly unnormalized) nonnegative `weights`.
///
/// Falls back to the last positive weight when rounding leaves the threshold
/// just above the accumulated total. Returns `None` if no weight is positive.
pub fn select_index(weights: &[f64], threshold: f64) -> Option<usize> {
    let mut accum = 0.0;
    let mut last_positive = None;
    for (i, w) in weights.iter().enumerate() {
        if *w > 0.0 {
            last_positive = Some(i);
        }
        accum += w;
        if accum > threshold && *w > 0.0 {
            return Some(i);
        }
    }
    last_positive
}

/// Draw an index with probability proportional to `weights`.
pub fn multinomial_sample(weights: &[f64], rng: &mut dyn RngCore) -> Result<usize> {
    let total = validate_weights("multinomial", weights)?;
    let threshold = rng.gen::<f64>() * total;
    select_index(weights, threshold)
        .ok_or_else(|| InferenceError::invalid_params("multinomial", "no positive weight"))
}

/// Check that `weights` are finite, nonnegative and not all zero; returns their sum.
pub fn validate_weights(distribution: &str, weights: &[f64]) -> Result<f64> {
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(InferenceError::invalid_params(
            distribution,
            format!("weight {} is not a finite nonnegative number", bad),
        ));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(InferenceError::invalid_params(distribution, "weights sum to zero"));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_threshold_skips_leading_zero_weight() {
        // a `>=` comparison would return index 0 here
        assert_eq!(select_index(&[0.0, 0.4, 0.6], 0.0), Some(1));
        assert_eq!(select_index(&[0.5, 0.5], 0.0), Some(0));
    }

    #[test]
    fn threshold_on_a_boundary_moves_to_the_next_bucket() {
        assert_eq!(select_index(&[0.25, 0.75], 0.25), Some(1));
        assert_eq!(select_index(&[0.25, 0.75], 0.2499), Some(0));
    }

    #[test]
    fn rounding_overflow_falls_back_to_last_positive() {
        assert_eq!(select_index(&[0.3, 0.7, 0.0], 1.0), Some(1));
        assert_eq!(select_index(&[0.0, 0.0], 0.0), None);
    }

    #[test]
    fn multinomial_never_picks_zero_weight() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2_000 {
            let i = multinomial_sample(&[0.0, 2.0, 0.0, 1.0], &mut rng).unwrap();
            assert!(i == 1 || i == 3);
        }
    }

    #[test]
    fn rejects_bad_weights() {
        assert!(validate_weights("w", &[]).is_err());
        assert!(validate_weights("w", &[0.0, 0.0]).is_err());
        assert!(validate_weights("w", &[1.0, -0.5]).is_err());
        assert!(validate_weights("w", &[f64::NAN]).is_err());
        assert_eq!(validate_weights("w", &[1.0, 3.0]).unwrap(), 4.0);
    }
}
