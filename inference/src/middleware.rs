// Middleware layers for inference strategies
//
// These wrappers add cross-cutting concerns (tracing, effect counts) to any
// strategy without touching program code or the strategy itself.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use probly::{Cont, Distribution, Handler, LogProb, Result, Resumption, Value};

use crate::strategy::Strategy;

/// Tracing middleware that logs every effect the inner strategy handles
pub struct Trace<S> {
    inner: S,
    prefix: String,
    started: Option<Instant>,
}

impl<S> Trace<S> {
    /// Wrap `inner`, tagging events with `"infer"`.
    pub fn new(inner: S) -> Self {
        Self::with_prefix(inner, "infer")
    }

    /// Wrap `inner`, tagging events with `prefix`.
    pub fn with_prefix(inner: S, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
            started: None,
        }
    }
}

impl<S: Strategy> Handler for Trace<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn draw(&mut self, k: Cont, dist: &Distribution, params: &[Value]) -> Result<Resumption> {
        trace!(prefix = %self.prefix, distribution = dist.name(), params = params.len(), "draw: start");
        let result = self.inner.draw(k, dist, params);
        match &result {
            Ok(Resumption::Resume(_, value)) => {
                debug!(prefix = %self.prefix, distribution = dist.name(), %value, "draw: resumed")
            }
            Ok(Resumption::Halt(_)) => {
                debug!(prefix = %self.prefix, distribution = dist.name(), "draw: halted")
            }
            Err(e) => warn!(prefix = %self.prefix, distribution = dist.name(), error = %e, "draw: failed"),
        }
        result
    }

    fn weight(&mut self, k: Cont, log_weight: LogProb) -> Result<Resumption> {
        debug!(prefix = %self.prefix, log_weight, "weight");
        let result = self.inner.weight(k, log_weight);
        if let Err(e) = &result {
            warn!(prefix = %self.prefix, log_weight, error = %e, "weight: failed");
        }
        result
    }

    fn exit(&mut self, value: Value) -> Result<Resumption> {
        debug!(prefix = %self.prefix, %value, "exit");
        let result = self.inner.exit(value);
        if let Err(e) = &result {
            warn!(prefix = %self.prefix, error = %e, "exit: failed");
        }
        result
    }
}

impl<S: Strategy> Strategy for Trace<S> {
    fn begin(&mut self) {
        debug!(prefix = %self.prefix, strategy = self.inner.name(), "begin");
        self.started = Some(Instant::now());
        self.inner.begin();
    }

    fn finish(&mut self) -> Result<Distribution> {
        let elapsed = self.started.take().map_or(Duration::ZERO, |t| t.elapsed());
        let result = self.inner.finish();
        match &result {
            Ok(dist) => debug!(prefix = %self.prefix, ?elapsed, distribution = dist.name(), "finish"),
            Err(e) => warn!(prefix = %self.prefix, ?elapsed, error = %e, "finish: failed"),
        }
        result
    }
}

/// Counters shared between a [`Metrics`] wrapper and whoever reads them.
#[derive(Debug, Default)]
pub struct EffectCounts {
    draws: Cell<u64>,
    weights: Cell<u64>,
    exits: Cell<u64>,
    errors: Cell<u64>,
}

impl EffectCounts {
    /// Draw effects handled successfully.
    pub fn draws(&self) -> u64 {
        self.draws.get()
    }

    /// Weight effects handled successfully.
    pub fn weights(&self) -> u64 {
        self.weights.get()
    }

    /// Exits handled successfully, i.e. completed execution paths.
    pub fn exits(&self) -> u64 {
        self.exits.get()
    }

    /// Effects the inner strategy rejected.
    pub fn errors(&self) -> u64 {
        self.errors.get()
    }

    fn record<T>(&self, counter: &Cell<u64>, result: &Result<T>) {
        let counter = if result.is_ok() { counter } else { &self.errors };
        counter.set(counter.get() + 1);
    }
}

/// Metrics collection middleware
pub struct Metrics<S> {
    inner: S,
    counts: Rc<EffectCounts>,
}

impl<S> Metrics<S> {
    /// Wrap `inner` with fresh counters.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: Rc::new(EffectCounts::default()),
        }
    }

    /// Handle on the counters; stays readable after the strategy is consumed.
    pub fn counts(&self) -> Rc<EffectCounts> {
        Rc::clone(&self.counts)
    }
}

impl<S: Strategy> Handler for Metrics<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn draw(&mut self, k: Cont, dist: &Distribution, params: &[Value]) -> Result<Resumption> {
        let result = self.inner.draw(k, dist, params);
        self.counts.record(&self.counts.draws, &result);
        result
    }

    fn weight(&mut self, k: Cont, log_weight: LogProb) -> Result<Resumption> {
        let result = self.inner.weight(k, log_weight);
        self.counts.record(&self.counts.weights, &result);
        result
    }

    fn exit(&mut self, value: Value) -> Result<Resumption> {
        let result = self.inner.exit(value);
        self.counts.record(&self.counts.exits, &result);
        result
    }
}

impl<S: Strategy> Strategy for Metrics<S> {
    fn begin(&mut self) {
        self.inner.begin();
    }

    fn finish(&mut self) -> Result<Distribution> {
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;
    use crate::enumerate::Enumerate;
    use crate::forward::Forward;
    use crate::strategy::infer;
    use probly::primitives::and;
    use probly::{bernoulli, draw, weight, Step};

    fn two_flips(k: Cont) -> Result<Step> {
        draw(
            Cont::new(move |a| {
                let k = k.clone();
                draw(
                    Cont::new(move |b| and(k.clone(), a.clone(), b)),
                    bernoulli(),
                    vec![Value::Float(0.5)],
                )
            }),
            bernoulli(),
            vec![Value::Float(0.5)],
        )
    }

    #[test]
    fn metrics_count_every_path_once() {
        let strategy = Metrics::new(Enumerate::new(&InferenceConfig::default()));
        let counts = strategy.counts();
        infer(strategy, two_flips).unwrap();
        assert_eq!(counts.exits(), 4);
        assert_eq!(counts.draws(), 3);
        assert_eq!(counts.errors(), 0);
    }

    #[test]
    fn metrics_count_rejected_effects() {
        let strategy = Metrics::new(Forward::new(&InferenceConfig::default()));
        let counts = strategy.counts();
        assert!(infer(strategy, |k| weight(k, 0.0)).is_err());
        assert_eq!(counts.errors(), 1);
        assert_eq!(counts.weights(), 0);
    }

    #[test]
    fn counters_survive_the_strategy_and_reset_with_new_wrappers() {
        let strategy = Metrics::new(Enumerate::new(&InferenceConfig::default()));
        let counts = strategy.counts();
        infer(strategy, |k| weight(k, -1.0)).unwrap();
        assert_eq!(counts.weights(), 1);
        assert_eq!(counts.exits(), 1);
        assert_eq!(Rc::strong_count(&counts), 1);

        let fresh = Metrics::new(Enumerate::new(&InferenceConfig::default()));
        assert_eq!(fresh.counts().weights(), 0);
    }

    #[test]
    fn trace_is_transparent() {
        let traced = infer(Trace::new(Enumerate::new(&InferenceConfig::default())), two_flips).unwrap();
        let plain = infer(Enumerate::new(&InferenceConfig::default()), two_flips).unwrap();
        for value in [true, false] {
            let v = Value::Bool(value);
            assert_eq!(traced.score(&[], &v).unwrap(), plain.score(&[], &v).unwrap());
        }
    }
}
