use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// A registered node agent, presented to the placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub node_name: &'a str,
}

/// Trait for pluggable placement strategies.
/// The Scheduler hands over every registered agent and the strategy picks one.
/// Strategies see names only; node snapshots are not part of the decision.
pub trait PlacementStrategy: Send + Sync {
    /// Select one candidate from the list. Returns the index into `candidates`.
    fn select(&self, candidates: &[Candidate]) -> Option<usize>;

    /// Human-readable name for logging / metrics.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// UniformRandom: every candidate equally likely (default)
// ---------------------------------------------------------------------------

pub struct UniformRandom;

impl PlacementStrategy for UniformRandom {
    fn select(&self, candidates: &[Candidate]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(rand::thread_rng().gen_range(0..candidates.len()))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

// ---------------------------------------------------------------------------
// RoundRobin: cycle through candidates in registration order
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlacementStrategy for RoundRobin {
    fn select(&self, candidates: &[Candidate]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        let turn = self.next.fetch_add(1, Ordering::Relaxed);
        Some(turn % candidates.len())
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

/// Parse a strategy name string into a boxed strategy.
pub fn parse_strategy(name: &str) -> Result<Box<dyn PlacementStrategy>, String> {
    match name {
        "random" => Ok(Box::new(UniformRandom)),
        "round_robin" => Ok(Box::new(RoundRobin::new())),
        other => Err(format!(
            "unknown placement strategy '{}', available: random, round_robin",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates<'a>(names: &[&'a str]) -> Vec<Candidate<'a>> {
        names.iter().map(|&n| Candidate { node_name: n }).collect()
    }

    #[test]
    fn test_empty_candidates_yield_nothing() {
        assert_eq!(UniformRandom.select(&[]), None);
        assert_eq!(RoundRobin::new().select(&[]), None);
    }

    #[test]
    fn test_uniform_random_stays_in_range() {
        let cands = candidates(&["node-01", "node-02", "node-03"]);
        for _ in 0..1_000 {
            let idx = UniformRandom.select(&cands).unwrap();
            assert!(idx < cands.len());
        }
    }

    #[test]
    fn test_uniform_random_is_roughly_uniform() {
        let cands = candidates(&["node-01", "node-02", "node-03"]);
        let draws = 30_000;
        let mut hits = [0usize; 3];
        for _ in 0..draws {
            hits[UniformRandom.select(&cands).unwrap()] += 1;
        }

        // Pearson chi-square with 2 degrees of freedom; 18.42 is the 0.9999 quantile.
        let expected = draws as f64 / 3.0;
        let chi_square: f64 = hits
            .iter()
            .map(|&h| {
                let d = h as f64 - expected;
                d * d / expected
            })
            .sum();
        assert!(chi_square < 18.42, "hits={hits:?} chi_square={chi_square}");
    }

    #[test]
    fn test_round_robin_cycles() {
        let rr = RoundRobin::new();
        let cands = candidates(&["a", "b", "c"]);
        let picks: Vec<usize> = (0..7).map(|_| rr.select(&cands).unwrap()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(parse_strategy("random").unwrap().name(), "random");
        assert_eq!(parse_strategy("round_robin").unwrap().name(), "round_robin");

        let err = parse_strategy("least_loaded").err().unwrap();
        assert!(err.contains("least_loaded"));
        assert!(err.contains("round_robin"));
    }
}
