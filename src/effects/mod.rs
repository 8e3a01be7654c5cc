//! Effect dispatch for probabilistic programs
//!
//! Programs are written in continuation-passing style ([`cps`]): every random
//! choice is a [`draw`] and every soft constraint a [`weight`]. Neither names
//! an inference strategy. The [`driver`] forwards each step through the
//! [`router`] to the active [`Handler`], which decides what the effect means.

pub mod cps;
pub mod driver;
pub mod handler;
pub mod router;

pub use cps::{condition, draw, weight, Cont, Params, Step};
pub use driver::{drive, run};
pub use handler::{DefaultHandler, Handler, Resumption};
pub use router::{HandlerScope, SharedHandler};
