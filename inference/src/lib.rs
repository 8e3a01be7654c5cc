//! Inference strategies for probly programs
//!
//! A strategy installs itself as the active effect handler, runs a program to
//! completion and turns what it observed into a [`Distribution`] over the
//! program's return value.
//!
//! Two strategies are provided. [`Forward`] runs the program once and samples
//! every draw on the spot. [`Enumerate`] explores every path through every
//! finite support and weighs each return value by the probability of the
//! paths reaching it. Middleware wrappers add tracing, effect counts and
//! effect recording to any strategy.
//!
//! [`Distribution`]: probly::Distribution

pub mod config;
pub mod enumerate;
pub mod forward;
pub mod marginal;
pub mod middleware;
pub mod recording;
pub mod strategy;

// Re-export main APIs
pub use config::InferenceConfig;
pub use enumerate::{Enumerate, SearchPhase, SearchStats};
pub use forward::Forward;
pub use marginal::{Marginal, MarginalEntry};
pub use middleware::{EffectCounts, Metrics, Trace};
pub use recording::{EffectLog, RecordedEffect, Recording};
pub use strategy::{
    enumerate, enumerate_with_config, forward, forward_with_config, infer, run_direct_sampling,
    run_enumeration, Strategy,
};
