pub mod anneal;
pub mod runner;

pub use self::anneal::{anneal, AnnealOutcome, AnnealingState, CoolingSchedule, ProgressCallback, ProgressReport};
pub use self::runner::{Holding, Reshuffler, RunOutcome, RunReport};

use crate::config::PenaltyWeights;
use crate::error::{ReshufflerError, RsResult};
use crate::scorer::{Allocation, AllocationSet, TokenCollection};
use fastrand::Rng;
use std::sync::Arc;

/// Annealing state: the reference allocations, the current allocations and a
/// cached aggregate score.
///
/// Allocations are shared between states behind `Arc` and never mutated in
/// place. A move copies only the two allocations it touches, so accepting or
/// rejecting a neighbor never leaves two states aliasing mutable data.
#[derive(Clone)]
pub struct SearchState {
    initial: Arc<[Arc<Allocation>]>,
    current: Vec<Arc<Allocation>>,
    rng: Rng,
    weights: PenaltyWeights,
    // Always equal to `current.score_against(initial, weights)`.
    cached_score: f64,
}

impl SearchState {
    pub fn new(initial: Vec<Allocation>, rng: Rng, weights: PenaltyWeights) -> RsResult<Self> {
        validate_initial(&initial)?;

        let initial: Arc<[Arc<Allocation>]> = initial.into_iter().map(Arc::new).collect();
        let current = initial.to_vec();
        let cached_score = current.score_against(&initial[..], &weights);

        Ok(Self {
            initial,
            current,
            rng,
            weights,
            cached_score,
        })
    }

    pub fn initial(&self) -> &[Arc<Allocation>] {
        &self.initial
    }

    pub fn current(&self) -> &[Arc<Allocation>] {
        &self.current
    }

    pub fn weights(&self) -> &PenaltyWeights {
        &self.weights
    }

    pub fn num_allocations(&self) -> usize {
        self.initial.len()
    }

    pub fn num_tokens(&self) -> usize {
        self.current.num_tokens()
    }

    /// Cached aggregate score, higher is better.
    #[inline(always)]
    pub fn score(&self) -> f64 {
        self.cached_score
    }

    /// Aggregate score computed from scratch. Only for checking the cache.
    pub fn recompute_score(&self) -> f64 {
        self.current.score_against(&self.initial[..], &self.weights)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Exchanges token `token_a` of allocation `alloc_a` with token `token_b`
    /// of allocation `alloc_b`, keeping the cached score current.
    pub fn exchange(&mut self, alloc_a: usize, token_a: usize, alloc_b: usize, token_b: usize) {
        debug_assert_ne!(alloc_a, alloc_b);

        let mut a = Allocation::clone(&self.current[alloc_a]);
        let mut b = Allocation::clone(&self.current[alloc_b]);
        let initial_a = &self.initial[alloc_a];
        let initial_b = &self.initial[alloc_b];

        self.cached_score -= a.score(initial_a, &self.weights);
        self.cached_score -= b.score(initial_b, &self.weights);

        a.exchange_tokens(&mut b, token_a, token_b);

        self.cached_score += a.score(initial_a, &self.weights);
        self.cached_score += b.score(initial_b, &self.weights);

        self.current[alloc_a] = Arc::new(a);
        self.current[alloc_b] = Arc::new(b);
    }

    /// Random pairwise token exchange between two distinct allocations.
    ///
    /// Advances this state's RNG; the returned state carries the advanced RNG
    /// too, so the random stream is the same whichever state survives.
    pub fn neighbor(&mut self) -> SearchState {
        let n = self.num_allocations();
        let (alloc_a, alloc_b) = loop {
            // Exchanging within one allocation is a no-op, draw again.
            let a = self.rng.usize(0..n);
            let b = self.rng.usize(0..n);
            if a != b {
                break (a, b);
            }
        };

        let token_a = self.current[alloc_a].draw_random_token_index(&mut self.rng);
        let token_b = self.current[alloc_b].draw_random_token_index(&mut self.rng);

        let mut next = self.clone();
        next.exchange(alloc_a, token_a, alloc_b, token_b);
        next
    }
}

impl AnnealingState for SearchState {
    #[inline(always)]
    fn energy(&self) -> f64 {
        -self.cached_score
    }

    fn neighbor(&mut self) -> Self {
        SearchState::neighbor(self)
    }
}

fn validate_initial(initial: &[Allocation]) -> RsResult<()> {
    if initial.len() < 2 {
        return Err(ReshufflerError::Validation(format!(
            "at least two owners are required to exchange tokens, got {}",
            initial.len()
        )));
    }

    if let Some(empty) = initial.iter().find(|a| a.tokens().is_empty()) {
        return Err(ReshufflerError::Validation(format!(
            "owner {} holds no tokens",
            empty.owner()
        )));
    }

    let width = initial[0].width();
    if let Some(other) = initial.iter().find(|a| a.width() != width) {
        return Err(ReshufflerError::Validation(format!(
            "owner {} uses {} categories, expected {}",
            other.owner(),
            other.width(),
            width
        )));
    }

    let dupes = initial.duplicate_token_ids();
    if !dupes.is_empty() {
        return Err(ReshufflerError::DuplicateTokens(dupes));
    }

    Ok(())
}
