//! Exhaustive enumeration
//!
//! Every `draw` forks the search: one search state per support value is
//! pushed onto a LIFO work list, then the most recent state is resumed. Every
//! `exit` adds the finished path's score (in log space) to the marginal and resumes
//! the next pending state. When the work list runs dry the driver halts and
//! [`Strategy::finish`] normalizes the marginal into a distribution.
//!
//! Enumeration terminates only if every support met along every path is finite
//! and the program terminates on every path. Nothing here detects the
//! alternative.

use tracing::{debug, info, trace};

use probly::{
    Capability, Cont, Distribution, Effect, Handler, InferenceError, LogProb, Result, Resumption,
    Value,
};

use crate::config::InferenceConfig;
use crate::marginal::Marginal;
use crate::strategy::Strategy;

/// A pending alternative: resume `k` with `value` on a path scored `score`.
struct SearchState {
    k: Cont,
    value: Value,
    score: LogProb,
}

/// Where the search currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    /// Exploring a path with no alternatives pending.
    Running,
    /// Exploring a path while other alternatives wait on the work list.
    Queued,
    /// The work list is exhausted.
    Done,
}

/// Counters describing one enumeration run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Paths that reached the exit.
    pub paths: u64,
    /// Draw effects handled.
    pub forks: u64,
    /// Largest work list observed.
    pub peak_pending: usize,
}

/// Exhaustive enumeration strategy.
pub struct Enumerate {
    report_marginal: bool,
    score: LogProb,
    pending: Vec<SearchState>,
    marginal: Marginal,
    stats: SearchStats,
    done: bool,
}

impl Enumerate {
    /// Fresh strategy with an empty work list and marginal.
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            report_marginal: config.report_marginal,
            score: 0.0,
            pending: Vec::new(),
            marginal: Marginal::new(),
            stats: SearchStats::default(),
            done: false,
        }
    }

    /// Current phase of the search.
    pub fn phase(&self) -> SearchPhase {
        if self.done {
            SearchPhase::Done
        } else if self.pending.is_empty() {
            SearchPhase::Running
        } else {
            SearchPhase::Queued
        }
    }

    /// Counters for the current run.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Log-score of the path being explored.
    pub fn score(&self) -> LogProb {
        self.score
    }

    /// Number of alternatives waiting on the work list.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Unnormalized marginal accumulated so far.
    pub fn marginal(&self) -> &Marginal {
        &self.marginal
    }

    fn next_in_queue(&mut self) -> Resumption {
        match self.pending.pop() {
            Some(state) => {
                self.score = state.score;
                Resumption::Resume(state.k, state.value)
            }
            None => {
                self.done = true;
                debug!(paths = self.stats.paths, forks = self.stats.forks, "search exhausted");
                Resumption::Halt(None)
            }
        }
    }
}

impl Handler for Enumerate {
    fn name(&self) -> &'static str {
        "enumerate"
    }

    fn draw(&mut self, k: Cont, dist: &Distribution, params: &[Value]) -> Result<Resumption> {
        if !dist.has(Capability::Support) {
            return Err(InferenceError::unsupported(
                "enumerate",
                Effect::Draw,
                format!("distribution {} cannot list its support", dist.name()),
            ));
        }
        dist.require(&[Capability::Score])?;

        // score every alternative before queueing any of them
        let states = dist
            .support(params)?
            .into_iter()
            .map(|value| {
                let score = self.score + dist.score(params, &value)?;
                Ok(SearchState {
                    k: k.clone(),
                    value,
                    score,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        trace!(
            distribution = dist.name(),
            alternatives = states.len(),
            score = self.score,
            "fork"
        );
        self.stats.forks += 1;
        self.pending.extend(states);
        self.stats.peak_pending = self.stats.peak_pending.max(self.pending.len());
        Ok(self.next_in_queue())
    }

    fn weight(&mut self, k: Cont, log_weight: LogProb) -> Result<Resumption> {
        // -inf rejects the path; NaN and +inf have no meaning as a weight
        if log_weight.is_nan() || log_weight == f64::INFINITY {
            return Err(InferenceError::Arithmetic(format!(
                "log-weight {} is not a finite number or -inf",
                log_weight
            )));
        }
        self.score += log_weight;
        trace!(log_weight, score = self.score, "weight");
        Ok(Resumption::Resume(k, Value::Unit))
    }

    fn exit(&mut self, value: Value) -> Result<Resumption> {
        trace!(%value, score = self.score, "path exited");
        self.marginal.add_log(value, self.score);
        self.stats.paths += 1;
        Ok(self.next_in_queue())
    }
}

impl Strategy for Enumerate {
    fn begin(&mut self) {
        self.score = 0.0;
        self.pending.clear();
        self.marginal = Marginal::new();
        self.stats = SearchStats::default();
        self.done = false;
    }

    fn finish(&mut self) -> Result<Distribution> {
        if !self.pending.is_empty() {
            return Err(InferenceError::ProtocolViolation(format!(
                "enumeration finished with {} unexplored alternatives",
                self.pending.len()
            )));
        }
        let marginal = std::mem::take(&mut self.marginal).normalized()?;
        if self.report_marginal {
            info!(paths = self.stats.paths, values = marginal.len(), "enumerated distribution");
            for (value, probability) in marginal.iter() {
                info!(%value, probability, "marginal");
            }
        } else {
            debug!(paths = self.stats.paths, values = marginal.len(), "enumerated distribution");
        }
        Ok(marginal.into_distribution())
    }
}
