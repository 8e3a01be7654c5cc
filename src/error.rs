//! Error taxonomy for effect dispatch and inference.
//!
//! Every variant aborts the inference run that raised it. Handlers are still
//! restored on the way out (see [`crate::effects::router::HandlerScope`]).

use std::fmt;
use thiserror::Error;

/// The effects a probabilistic program can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// A random choice from a distribution.
    Draw,
    /// A soft constraint adding to the path's log-score.
    Weight,
    /// The program reached its final continuation.
    Exit,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Effect::Draw => "draw",
            Effect::Weight => "weight",
            Effect::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// The functions a [`Distribution`](crate::Distribution) may or may not carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Draw a value.
    Sample,
    /// Log-probability of a value.
    Score,
    /// Finite listing of the values with nonzero probability.
    Support,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Sample => "sample",
            Capability::Score => "score",
            Capability::Support => "support",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while running a probabilistic program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("weight effect used outside of any inference strategy")]
    NoActiveInference,

    #[error("{strategy} cannot handle the {effect} effect: {reason}")]
    UnsupportedEffect {
        strategy: &'static str,
        effect: Effect,
        reason: String,
    },

    #[error("distribution {distribution} has no {capability} function")]
    MissingCapability {
        distribution: String,
        capability: Capability,
    },

    #[error("invalid parameters for {distribution}: {reason}")]
    InvalidParams { distribution: String, reason: String },

    #[error("type mismatch in {op}: expected {expected}, found {found}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("cannot normalize a marginal with zero total mass")]
    ZeroMass,

    #[error("handler {0} was re-entered while handling an effect")]
    Reentrant(&'static str),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl InferenceError {
    /// Shorthand for [`InferenceError::UnsupportedEffect`].
    pub fn unsupported(strategy: &'static str, effect: Effect, reason: impl Into<String>) -> Self {
        InferenceError::UnsupportedEffect {
            strategy,
            effect,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`InferenceError::InvalidParams`].
    pub fn invalid_params(distribution: impl Into<String>, reason: impl Into<String>) -> Self {
        InferenceError::InvalidParams {
            distribution: distribution.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for effect and inference operations
pub type Result<T> = std::result::Result<T, InferenceError>;
