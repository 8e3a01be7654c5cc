// Marginal accumulator
//
// Maps each terminal value of a program to the probability mass of the
// execution paths that produced it. Masses are held as natural logs and
// combined with log-sum-exp, so paths whose scores underflow `exp` still
// normalize. Entries keep first-reached order so the inverse-CDF sampler of
// the frozen distribution is deterministic for a given seed.

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use probly::{select_index, Distribution, InferenceError, LogProb, Result, Value};

/// `ln(exp(a) + exp(b))` without leaving log space.
fn log_add_exp(a: LogProb, b: LogProb) -> LogProb {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let hi = a.max(b);
    hi + (-(a - b).abs()).exp().ln_1p()
}

/// One line of a marginal listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalEntry {
    /// A terminal value.
    pub value: Value,
    /// Its (possibly unnormalized) mass.
    pub mass: f64,
}

/// Log-mass per terminal value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marginal {
    log_masses: IndexMap<Value, LogProb>,
}

impl Marginal {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an enumerable distribution back into a marginal.
    pub fn from_distribution(dist: &Distribution, params: &[Value]) -> Result<Self> {
        let mut marginal = Marginal::new();
        for value in dist.support(params)? {
            let score = dist.score(params, &value)?;
            marginal.add_log(value, score);
        }
        Ok(marginal)
    }

    /// Add `mass` to `value`, creating the entry at zero if needed.
    pub fn add(&mut self, value: Value, mass: f64) {
        self.add_log(value, mass.ln());
    }

    /// Add `exp(log_mass)` to `value`.
    pub fn add_log(&mut self, value: Value, log_mass: LogProb) {
        let entry = self.log_masses.entry(value).or_insert(f64::NEG_INFINITY);
        *entry = log_add_exp(*entry, log_mass);
    }

    /// Mass recorded for `value`.
    pub fn get(&self, value: &Value) -> Option<f64> {
        self.log_mass(value).map(f64::exp)
    }

    /// Log of the mass recorded for `value`.
    pub fn log_mass(&self, value: &Value) -> Option<LogProb> {
        self.log_masses.get(value).copied()
    }

    /// Sum of all masses.
    pub fn total(&self) -> f64 {
        self.log_total().exp()
    }

    /// Log of the sum of all masses; `-inf` when empty.
    pub fn log_total(&self) -> LogProb {
        self.log_masses
            .values()
            .fold(f64::NEG_INFINITY, |acc, l| log_add_exp(acc, *l))
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.log_masses.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.log_masses.is_empty()
    }

    /// Entries in first-reached order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, f64)> {
        self.log_masses.iter().map(|(v, l)| (v, l.exp()))
    }

    /// Owned listing, e.g. for serialization.
    pub fn entries(&self) -> Vec<MarginalEntry> {
        self.iter()
            .map(|(value, mass)| MarginalEntry {
                value: value.clone(),
                mass,
            })
            .collect()
    }

    /// Divide every entry by the total mass and drop entries with no mass.
    ///
    /// Fails with [`InferenceError::ZeroMass`] only when no entry has any
    /// mass, however small.
    pub fn normalized(self) -> Result<Self> {
        let log_total = self.log_total();
        if !log_total.is_finite() {
            return Err(InferenceError::ZeroMass);
        }
        let log_masses = self
            .log_masses
            .into_iter()
            .filter(|(_, l)| *l > f64::NEG_INFINITY)
            .map(|(value, l)| (value, l - log_total))
            .collect();
        Ok(Self { log_masses })
    }

    /// Freeze a normalized marginal into a distribution.
    ///
    /// `support` lists the entries, `score` is the entry's log mass (`-inf`
    /// for anything else) and `sample` inverts the CDF. Params are ignored.
    pub fn into_distribution(self) -> Distribution {
        let support: Arc<[Value]> = self.log_masses.keys().cloned().collect();
        let weights: Arc<[f64]> = self.log_masses.values().map(|l| l.exp()).collect();
        let table = Arc::new(self.log_masses);
        let sampled = Arc::clone(&support);
        Distribution::new(
            "enumerated",
            move |_, rng| {
                let threshold = rng.gen::<f64>();
                let index = select_index(&weights, threshold).ok_or(InferenceError::ZeroMass)?;
                Ok(sampled[index].clone())
            },
            move |_, value| Ok(table.get(value).copied().unwrap_or(f64::NEG_INFINITY)),
            move |_| Ok(support.to_vec()),
        )
    }
}

impl fmt::Display for Marginal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (value, mass) in self.iter() {
            writeln!(f, "{}: {:.6}", value, mass)?;
        }
        Ok(())
    }
}
