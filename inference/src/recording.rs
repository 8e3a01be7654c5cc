// Recording layer for testing - captures every effect a strategy handles

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use probly::{Cont, Distribution, Handler, LogProb, Result, Resumption, Value};

use crate::strategy::Strategy;

/// One effect as seen by the wrapped strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum RecordedEffect {
    Draw { distribution: String, params: Vec<Value> },
    Weight { log_weight: LogProb },
    Exit { value: Value },
}

/// Shared handle on a recorded effect trace.
#[derive(Debug, Clone, Default)]
pub struct EffectLog(Rc<RefCell<Vec<RecordedEffect>>>);

impl EffectLog {
    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<RecordedEffect> {
        self.0.borrow().clone()
    }

    /// Number of recorded effects.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Forget every recorded effect.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Exits recorded so far, in the order paths finished.
    pub fn exits(&self) -> Vec<Value> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                RecordedEffect::Exit { value } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: RecordedEffect) {
        self.0.borrow_mut().push(event);
    }
}

/// Strategy wrapper that appends each effect to an [`EffectLog`] before
/// delegating to the inner strategy.
pub struct Recording<S> {
    inner: S,
    log: EffectLog,
}

impl<S> Recording<S> {
    /// Wrap `inner` with an empty log.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: EffectLog::default(),
        }
    }

    /// Handle on the log; stays readable after the strategy is consumed.
    pub fn log(&self) -> EffectLog {
        self.log.clone()
    }
}

impl<S: Strategy> Handler for Recording<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn draw(&mut self, k: Cont, dist: &Distribution, params: &[Value]) -> Result<Resumption> {
        self.log.push(RecordedEffect::Draw {
            distribution: dist.name().to_string(),
            params: params.to_vec(),
        });
        self.inner.draw(k, dist, params)
    }

    fn weight(&mut self, k: Cont, log_weight: LogProb) -> Result<Resumption> {
        self.log.push(RecordedEffect::Weight { log_weight });
        self.inner.weight(k, log_weight)
    }

    fn exit(&mut self, value: Value) -> Result<Resumption> {
        self.log.push(RecordedEffect::Exit {
            value: value.clone(),
        });
        self.inner.exit(value)
    }
}

impl<S: Strategy> Strategy for Recording<S> {
    fn begin(&mut self) {
        self.log.clear();
        self.inner.begin();
    }

    fn finish(&mut self) -> Result<Distribution> {
        self.inner.finish()
    }
}
