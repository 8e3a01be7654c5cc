// Continuation calling convention
//
// Program code never returns a value directly. Each operation receives the
// rest of the program as a `Cont` and hands back a `Step` describing what
// must happen next. Random choices and soft constraints become `Step::Draw`
// and `Step::Weight`; the driver forwards them to whichever handler is active.

use std::fmt;
use std::rc::Rc;

use crate::distribution::{Distribution, LogProb};
use crate::error::{Effect, Result};
use crate::value::Value;

/// Parameters handed to a distribution.
pub type Params = Vec<Value>;

/// The rest of a program, waiting for a value.
///
/// Continuations are reference counted: exhaustive enumeration resumes the
/// same program point once for every value in a support. Each resumption is
/// still a fresh call; nothing is shared between them except captured state.
#[derive(Clone)]
pub struct Cont(Rc<dyn Fn(Value) -> Result<Step>>);

impl Cont {
    /// Wrap a closure as a continuation.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Step> + 'static,
    {
        Cont(Rc::new(f))
    }

    /// The continuation strategies pass to a program: reaching it performs
    /// the exit effect with the program's return value.
    pub fn exit() -> Self {
        Cont::new(|value| Ok(Step::Exit(value)))
    }

    /// Run the rest of the program with `value`.
    pub fn resume(&self, value: Value) -> Result<Step> {
        (self.0)(value)
    }
}

impl fmt::Debug for Cont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cont(..)")
    }
}

/// What a program asks for next.
#[derive(Debug)]
pub enum Step {
    /// Choose a value from `dist` and continue with it.
    Draw {
        k: Cont,
        dist: Distribution,
        params: Params,
    },
    /// Add `log_weight` to the current path and continue with `Value::Unit`.
    Weight { k: Cont, log_weight: LogProb },
    /// The program finished with this value.
    Exit(Value),
}

impl Step {
    /// The effect this step performs.
    pub fn effect(&self) -> Effect {
        match self {
            Step::Draw { .. } => Effect::Draw,
            Step::Weight { .. } => Effect::Weight,
            Step::Exit(_) => Effect::Exit,
        }
    }
}

/// Random choice: `k` receives a value drawn from `dist` under `params`.
pub fn draw(k: Cont, dist: Distribution, params: Params) -> Result<Step> {
    Ok(Step::Draw { k, dist, params })
}

/// Soft constraint: scale the current execution path by `exp(log_weight)`.
pub fn weight(k: Cont, log_weight: LogProb) -> Result<Step> {
    Ok(Step::Weight { k, log_weight })
}

/// Hard constraint: keep the path only if `condition` holds.
pub fn condition(k: Cont, condition: bool) -> Result<Step> {
    weight(k, if condition { 0.0 } else { f64::NEG_INFINITY })
}
