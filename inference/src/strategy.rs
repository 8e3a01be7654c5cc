// Inference strategies and their entry points
//
// A strategy is a handler with a lifecycle: `begin` resets it, the program
// runs to its halt with the strategy installed, and `finish` turns what the
// strategy observed into a distribution. The previous handler is restored
// before `finish` runs and also when the program fails.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

use probly::effects::router;
use probly::{drive, Cont, Distribution, Handler, InferenceError, Result, Step};

use crate::config::InferenceConfig;
use crate::enumerate::Enumerate;
use crate::forward::Forward;

/// A handler that produces a distribution over a program's return value.
pub trait Strategy: Handler + 'static {
    /// Reset per-run state. Called before the program starts.
    fn begin(&mut self);

    /// Build the result once the program's last path has exited.
    fn finish(&mut self) -> Result<Distribution>;
}

/// Run `program` under `strategy` and return the resulting distribution.
pub fn infer<S, P>(mut strategy: S, program: P) -> Result<Distribution>
where
    S: Strategy,
    P: FnOnce(Cont) -> Result<Step>,
{
    strategy.begin();
    let name = strategy.name();
    let shared = Rc::new(RefCell::new(strategy));

    let outcome = {
        let _scope = router::install(shared.clone());
        program(Cont::exit()).and_then(drive)
    };

    match outcome {
        Ok(None) => {}
        Ok(Some(value)) => {
            return Err(InferenceError::ProtocolViolation(format!(
                "{} halted with a value it should have consumed: {}",
                name, value
            )))
        }
        Err(err) => {
            warn!(strategy = name, error = %err, "inference aborted");
            return Err(err);
        }
    }

    let distribution = shared.borrow_mut().finish();
    debug!(strategy = name, "inference finished");
    distribution
}

/// Direct sampling with the default configuration.
pub fn forward<P>(program: P) -> Result<Distribution>
where
    P: FnOnce(Cont) -> Result<Step>,
{
    forward_with_config(&InferenceConfig::default(), program)
}

/// Direct sampling.
pub fn forward_with_config<P>(config: &InferenceConfig, program: P) -> Result<Distribution>
where
    P: FnOnce(Cont) -> Result<Step>,
{
    infer(Forward::new(config), program)
}

/// Exhaustive enumeration with the default configuration.
pub fn enumerate<P>(program: P) -> Result<Distribution>
where
    P: FnOnce(Cont) -> Result<Step>,
{
    enumerate_with_config(&InferenceConfig::default(), program)
}

/// Exhaustive enumeration.
pub fn enumerate_with_config<P>(config: &InferenceConfig, program: P) -> Result<Distribution>
where
    P: FnOnce(Cont) -> Result<Step>,
{
    infer(Enumerate::new(config), program)
}

/// Continuation-passing entry point for direct sampling.
///
/// `k` receives the resulting distribution; its step is returned to whoever
/// drives the caller, so this can be used from inside another program.
pub fn run_direct_sampling<K, P>(k: K, program: P) -> Result<Step>
where
    K: FnOnce(Distribution) -> Result<Step>,
    P: FnOnce(Cont) -> Result<Step>,
{
    k(forward(program)?)
}

/// Continuation-passing entry point for exhaustive enumeration.
pub fn run_enumeration<K, P>(k: K, program: P) -> Result<Step>
where
    K: FnOnce(Distribution) -> Result<Step>,
    P: FnOnce(Cont) -> Result<Step>,
{
    k(enumerate(program)?)
}
