// Trampoline driving a program step by step
//
// Each effect is dispatched from this loop rather than from inside the
// program's own call frames, so long programs and deep searches do not grow
// the host stack.

use tracing::{debug, trace};

use super::cps::{Cont, Step};
use super::handler::Resumption;
use super::router;
use crate::error::{InferenceError, Result};
use crate::value::Value;

/// Dispatch `step` and everything it leads to until the active handler halts.
pub fn drive(mut step: Step) -> Result<Option<Value>> {
    let mut dispatched: u64 = 0;
    loop {
        dispatched += 1;
        match router::dispatch(step)? {
            Resumption::Resume(k, value) => {
                trace!(%value, "resume");
                step = k.resume(value)?;
            }
            Resumption::Halt(value) => {
                debug!(dispatched, "driver halted");
                return Ok(value);
            }
        }
    }
}

/// Run `program` under whichever handler is active and return its value.
///
/// At top level this means the default handler: draws are sampled and soft
/// constraints are rejected. Inference strategies keep the program's value to
/// themselves, so calling this while one is installed is a protocol violation.
pub fn run<P>(program: P) -> Result<Value>
where
    P: FnOnce(Cont) -> Result<Step>,
{
    let step = program(Cont::exit())?;
    drive(step)?.ok_or_else(|| {
        InferenceError::ProtocolViolation(format!(
            "program value was consumed by the {} handler",
            router::active_name()
        ))
    })
}
