//! Direct sampling
//!
//! Runs the program once, resolving every draw by sampling on the spot. Soft
//! constraints are rejected because there is no normalization to apply them to.

use rand::rngs::StdRng;
use tracing::trace;

use probly::{
    Cont, Distribution, Effect, Handler, InferenceError, LogProb, Result, Resumption, Value,
};

use crate::config::InferenceConfig;
use crate::strategy::Strategy;

/// Forward-sampling strategy. Produces the point mass at the program's value.
pub struct Forward {
    rng: StdRng,
    result: Option<Value>,
    draws: u64,
}

impl Forward {
    /// Strategy drawing from the RNG described by `config`.
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            rng: config.rng(),
            result: None,
            draws: 0,
        }
    }
}

impl Handler for Forward {
    fn name(&self) -> &'static str {
        "forward"
    }

    fn draw(&mut self, k: Cont, dist: &Distribution, params: &[Value]) -> Result<Resumption> {
        let value = dist.sample(params, &mut self.rng)?;
        self.draws += 1;
        trace!(distribution = dist.name(), %value, "sampled");
        Ok(Resumption::Resume(k, value))
    }

    fn weight(&mut self, _k: Cont, log_weight: LogProb) -> Result<Resumption> {
        Err(InferenceError::unsupported(
            "forward",
            Effect::Weight,
            format!("cannot apply weight {} without normalization", log_weight),
        ))
    }

    fn exit(&mut self, value: Value) -> Result<Resumption> {
        trace!(%value, draws = self.draws, "program exited");
        self.result = Some(value);
        Ok(Resumption::Halt(None))
    }
}

impl Strategy for Forward {
    fn begin(&mut self) {
        self.result = None;
        self.draws = 0;
    }

    fn finish(&mut self) -> Result<Distribution> {
        self.result.take().map(Distribution::delta).ok_or_else(|| {
            InferenceError::ProtocolViolation("forward sampling finished without an exit".into())
        })
    }
}
