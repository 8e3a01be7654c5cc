//! Effect-handler core for probabilistic programs
//!
//! Program code written in continuation-passing style expresses random
//! choices ([`draw`]) and soft constraints ([`weight`]) without naming any
//! inference strategy. Whatever [`Handler`] is installed in the effect router
//! decides what those effects mean: sample on the spot, enumerate every
//! alternative, or reject the effect outright.
//!
//! This crate provides the distribution abstraction, the calling convention,
//! the router and its trampoline driver. Inference strategies live in the
//! `probly-inference` crate.

pub mod distribution;
pub mod effects;
pub mod error;
pub mod primitives;
pub mod value;

// Re-export main APIs
pub use distribution::erp::{bernoulli, categorical, uniform_draw};
pub use distribution::sampling::{multinomial_sample, select_index};
pub use distribution::{Distribution, DistributionBuilder, LogProb};
pub use effects::{
    condition, draw, drive, run, weight, Cont, DefaultHandler, Handler, HandlerScope, Params,
    Resumption, SharedHandler, Step,
};
pub use error::{Capability, Effect, InferenceError, Result};
pub use value::Value;
