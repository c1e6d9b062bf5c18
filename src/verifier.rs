use crate::consts::SCORE_EPSILON;
use crate::optimizer::SearchState;
use crate::scorer::{Allocation, TokenCollection};
use serde::Serialize;
use std::fmt;

/// Penalty counters aggregated over participant allocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateStats {
    pub num_returned_tokens: u64,
    pub num_returned_categories: u64,
    pub num_duplicate_category_tokens: u64,
}

impl StateStats {
    /// Counters of a single allocation against its reference.
    pub fn for_allocation(current: &Allocation, initial: &Allocation) -> Self {
        let width = current.width();
        Self {
            num_returned_tokens: current.num_same_id(initial.tokens()) as u64,
            num_returned_categories: current.num_in_same_categories(initial.tokens(), width),
            num_duplicate_category_tokens: current.num_in_duplicate_categories(width),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn accumulate(&mut self, other: &StateStats) {
        self.num_returned_tokens += other.num_returned_tokens;
        self.num_returned_categories += other.num_returned_categories;
        self.num_duplicate_category_tokens += other.num_duplicate_category_tokens;
    }
}

impl fmt::Display for StateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "numInitTokens={}, numInInitCategories={}, numInDupeCategories={}",
            self.num_returned_tokens,
            self.num_returned_categories,
            self.num_duplicate_category_tokens
        )
    }
}

/// Sums the counters over all non-pool allocations of the state.
pub fn compute_stats(state: &SearchState) -> StateStats {
    let mut stats = StateStats::default();
    for (current, initial) in state.current().iter().zip(state.initial()) {
        if current.is_pool() {
            continue;
        }
        stats.accumulate(&StateStats::for_allocation(current, initial));
    }
    stats
}

/// Closed-form maximum of the aggregate score for this input.
///
/// Per allocation, the duplication term is at least the token count (one
/// token per category) and the other two terms are at least zero. The pool
/// scores its own ceiling. With unit weights this is `-num_tokens`.
pub fn score_bound(state: &SearchState) -> f64 {
    state
        .current()
        .iter()
        .map(|a| a.score_ceiling(state.weights()))
        .sum()
}

/// True when no owner holds a returned token, a returned category or a
/// duplicate category, and the score sits on its closed-form bound. Such a
/// state cannot be improved.
pub fn is_trivial_optimum(state: &SearchState) -> bool {
    verdict(state).is_trivial_optimum
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalityVerdict {
    pub stats: StateStats,
    pub score: f64,
    pub bound: f64,
    pub is_trivial_optimum: bool,
}

/// Evaluates the final state against the closed-form bound. Pure; callers
/// decide how to report it.
pub fn verdict(state: &SearchState) -> OptimalityVerdict {
    let stats = compute_stats(state);
    let score = state.score();
    let bound = score_bound(state);
    let on_bound = (score - bound).abs() < SCORE_EPSILON;

    OptimalityVerdict {
        stats,
        score,
        bound,
        is_trivial_optimum: stats.is_zero() && on_bound,
    }
}
