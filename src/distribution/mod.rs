//! Distributions (elementary random primitives)
//!
//! A [`Distribution`] bundles up to three functions over a parameter list:
//!
//! - `sample(params, rng)` draws a value,
//! - `score(params, value)` returns its log-probability,
//! - `support(params)` lists every value with nonzero probability.
//!
//! Any of the three may be absent. Strategies that need a missing function
//! report [`InferenceError::MissingCapability`] instead of guessing.

pub mod erp;
pub mod sampling;

use rand::RngCore;
use std::fmt;
use std::sync::Arc;

use crate::error::{Capability, InferenceError, Result};
use crate::value::Value;

/// Natural logarithm of a probability mass.
pub type LogProb = f64;

/// Sampling function of a distribution.
pub type SampleFn = Arc<dyn Fn(&[Value], &mut dyn RngCore) -> Result<Value> + Send + Sync>;

/// Scoring function of a distribution.
pub type ScoreFn = Arc<dyn Fn(&[Value], &Value) -> Result<LogProb> + Send + Sync>;

/// Support enumerator of a distribution.
pub type SupportFn = Arc<dyn Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync>;

/// An immutable distribution value. Cloning shares the underlying functions.
#[derive(Clone)]
pub struct Distribution {
    name: Arc<str>,
    sample: Option<SampleFn>,
    score: Option<ScoreFn>,
    support: Option<SupportFn>,
}

impl Distribution {
    /// Build a distribution carrying all three capabilities.
    pub fn new<S, C, U>(name: &str, sample: S, score: C, support: U) -> Self
    where
        S: Fn(&[Value], &mut dyn RngCore) -> Result<Value> + Send + Sync + 'static,
        C: Fn(&[Value], &Value) -> Result<LogProb> + Send + Sync + 'static,
        U: Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        Self::builder(name)
            .sample(sample)
            .score(score)
            .support(support)
            .build()
    }

    /// Start building a distribution with only some capabilities.
    pub fn builder(name: &str) -> DistributionBuilder {
        DistributionBuilder {
            name: Arc::from(name),
            sample: None,
            score: None,
            support: None,
        }
    }

    /// The point mass at `value`.
    pub fn delta(value: Value) -> Self {
        let sampled = value.clone();
        let scored = value.clone();
        Self::new(
            "delta",
            move |_, _| Ok(sampled.clone()),
            move |_, v| Ok(if *v == scored { 0.0 } else { f64::NEG_INFINITY }),
            move |_| Ok(vec![value.clone()]),
        )
    }

    /// Display name, used in errors and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this distribution carries `capability`.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Sample => self.sample.is_some(),
            Capability::Score => self.score.is_some(),
            Capability::Support => self.support.is_some(),
        }
    }

    /// Fail with [`InferenceError::MissingCapability`] unless every capability is present.
    pub fn require(&self, capabilities: &[Capability]) -> Result<()> {
        match capabilities.iter().find(|c| !self.has(**c)) {
            Some(missing) => Err(self.missing(*missing)),
            None => Ok(()),
        }
    }

    fn missing(&self, capability: Capability) -> InferenceError {
        InferenceError::MissingCapability {
            distribution: self.name.to_string(),
            capability,
        }
    }

    /// Draw one value.
    pub fn sample(&self, params: &[Value], rng: &mut dyn RngCore) -> Result<Value> {
        let sample = self.sample.as_ref().ok_or_else(|| self.missing(Capability::Sample))?;
        sample(params, rng)
    }

    /// Log-probability of `value`.
    pub fn score(&self, params: &[Value], value: &Value) -> Result<LogProb> {
        let score = self.score.as_ref().ok_or_else(|| self.missing(Capability::Score))?;
        score(params, value)
    }

    /// Every value with nonzero probability under `params`.
    pub fn support(&self, params: &[Value]) -> Result<Vec<Value>> {
        let support = self.support.as_ref().ok_or_else(|| self.missing(Capability::Support))?;
        support(params)
    }
}

impl fmt::Debug for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Distribution")
            .field("name", &self.name)
            .field("sample", &self.sample.is_some())
            .field("score", &self.score.is_some())
            .field("support", &self.support.is_some())
            .finish()
    }
}

/// Builder for distributions with a partial capability set.
pub struct DistributionBuilder {
    name: Arc<str>,
    sample: Option<SampleFn>,
    score: Option<ScoreFn>,
    support: Option<SupportFn>,
}

impl DistributionBuilder {
    /// Set the sampling function.
    pub fn sample<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &mut dyn RngCore) -> Result<Value> + Send + Sync + 'static,
    {
        self.sample = Some(Arc::new(f));
        self
    }

    /// Set the scoring function.
    pub fn score<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &Value) -> Result<LogProb> + Send + Sync + 'static,
    {
        self.score = Some(Arc::new(f));
        self
    }

    /// Set the support enumerator.
    pub fn support<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.support = Some(Arc::new(f));
        self
    }

    /// Freeze the distribution.
    pub fn build(self) -> Distribution {
        Distribution {
            name: self.name,
            sample: self.sample,
            score: self.score,
            support: self.support,
        }
    }
}
