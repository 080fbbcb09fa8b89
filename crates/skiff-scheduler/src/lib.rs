//! Placement policy for the skiff control plane.
//!
//! The [`Scheduler`] is stateless with respect to the cluster: it is handed
//! the registered node agents on every call and delegates the choice to a
//! [`PlacementStrategy`]. It never sees node snapshots.

use thiserror::Error;

pub mod strategy;

use strategy::{Candidate, PlacementStrategy, UniformRandom};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no node agents registered")]
    NoCandidates,
}

pub struct Scheduler {
    strategy: Box<dyn PlacementStrategy>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_strategy(Box::new(UniformRandom))
    }

    pub fn with_strategy(strategy: Box<dyn PlacementStrategy>) -> Self {
        tracing::info!(strategy = strategy.name(), "scheduler initialized");
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Pick one node among `candidates`, returning its index.
    ///
    /// Fails only when there is nothing to choose from. An index the
    /// strategy reports outside the slice counts as no selection.
    pub fn select(&self, candidates: &[Candidate]) -> Result<usize, ScheduleError> {
        let idx = self
            .strategy
            .select(candidates)
            .filter(|&i| i < candidates.len())
            .ok_or(ScheduleError::NoCandidates)?;
        tracing::debug!(
            node = candidates[idx].node_name,
            strategy = self.strategy.name(),
            "node selected"
        );
        Ok(idx)
    }
}
