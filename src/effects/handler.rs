// Effect handler abstraction
//
// A handler gives meaning to the effects a program performs. Handlers never
// invoke continuations themselves: they answer with a `Resumption` and the
// driver performs the call once the handler is no longer borrowed.

use rand::RngCore;

use super::cps::Cont;
use crate::distribution::{Distribution, LogProb};
use crate::error::{InferenceError, Result};
use crate::value::Value;

/// How the driver proceeds after a handler processed an effect.
#[derive(Debug)]
pub enum Resumption {
    /// Invoke `Cont` with `Value`.
    Resume(Cont, Value),
    /// Stop driving. Carries the program's value when the handler hands it
    /// back directly instead of keeping it for itself.
    Halt(Option<Value>),
}

/// The core effect handler trait that every inference strategy implements
pub trait Handler {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Random choice from `dist`.
    fn draw(&mut self, k: Cont, dist: &Distribution, params: &[Value]) -> Result<Resumption>;

    /// Soft constraint on the current execution path.
    fn weight(&mut self, k: Cont, log_weight: LogProb) -> Result<Resumption>;

    /// The program reached its final continuation with `value`.
    fn exit(&mut self, value: Value) -> Result<Resumption>;
}

/// Handler in effect when no inference strategy is installed.
///
/// Draws sample immediately from the thread RNG. Soft constraints are a
/// programming error here and fail with [`InferenceError::NoActiveInference`].
pub struct DefaultHandler<R: RngCore> {
    rng: R,
}

impl DefaultHandler<rand::rngs::ThreadRng> {
    /// Default handler backed by the thread-local RNG.
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for DefaultHandler<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> DefaultHandler<R> {
    /// Default handler drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> Handler for DefaultHandler<R> {
    fn name(&self) -> &'static str {
        "default"
    }

    fn draw(&mut self, k: Cont, dist: &Distribution, params: &[Value]) -> Result<Resumption> {
        let value = dist.sample(params, &mut self.rng)?;
        Ok(Resumption::Resume(k, value))
    }

    fn weight(&mut self, _k: Cont, _log_weight: LogProb) -> Result<Resumption> {
        Err(InferenceError::NoActiveInference)
    }

    fn exit(&mut self, value: Value) -> Result<Resumption> {
        Ok(Resumption::Halt(Some(value)))
    }
}

