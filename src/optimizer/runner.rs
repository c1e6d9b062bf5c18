use super::anneal::{anneal, CoolingSchedule, ProgressCallback};
use super::SearchState;
use crate::config::Config;
use crate::consts::PROGRESS_REPORTS_PER_RUN;
use crate::error::RsResult;
use crate::core_types::CategoryId;
use crate::scorer::{Allocation, TokenCollection};
use crate::verifier::{self, OptimalityVerdict, StateStats};
use fastrand::Rng;
use std::time::Instant;
use strum_macros::Display;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RunOutcome {
    TrivialOptimum,
    NotProvablyOptimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub owner: String,
    pub num_tokens: usize,
    pub num_highlighted: usize,
}

pub struct RunReport {
    pub state: SearchState,
    pub start_stats: StateStats,
    pub start_score: f64,
    pub final_stats: StateStats,
    pub iterations: usize,
    pub accepted: usize,
    pub best_energy: f64,
    pub verdict: OptimalityVerdict,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_trivial_optimum(&self) -> bool {
        self.outcome == RunOutcome::TrivialOptimum
    }

    /// Final per-owner counts of tokens in `highlighted`, for owners holding any.
    pub fn holdings(&self, highlighted: &[CategoryId]) -> Vec<Holding> {
        self.state
            .current()
            .iter()
            .filter_map(|a| {
                let n = a.num_in_categories(highlighted);
                (n > 0).then(|| Holding {
                    owner: a.owner().to_string(),
                    num_tokens: a.num_tokens(),
                    num_highlighted: n,
                })
            })
            .collect()
    }

    pub fn log_holdings(&self, highlighted: &[CategoryId]) {
        for h in self.holdings(highlighted) {
            info!("{} numTokens={}, numGrails={}", h.owner, h.num_tokens, h.num_highlighted);
        }
    }
}

/// Drives one seeded annealing run over a set of allocations.
pub struct Reshuffler {
    config: Config,
}

impl Reshuffler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Anneals `initial` under `seed`. The same inputs, seed and config always
    /// produce the same final state.
    pub fn run<CB: ProgressCallback + ?Sized>(
        &self,
        initial: Vec<Allocation>,
        seed: i64,
        callback: &mut CB,
    ) -> RsResult<RunReport> {
        self.config.weights.validate()?;
        let schedule = CoolingSchedule::from_params(&self.config.anneal)?;

        let mut state = SearchState::new(initial, Rng::with_seed(seed as u64), self.config.weights)?;
        let start_stats = verifier::compute_stats(&state);
        let start_score = state.score();

        info!(
            "Annealing {} tokens across {} owners: T0={}, factor={}, iterations={}",
            state.num_tokens(),
            state.num_allocations(),
            schedule.temperature(),
            schedule.annealing_factor(),
            schedule.max_iterations()
        );
        info!("Start: score={:.0} ({})", start_score, start_stats);

        // Acceptance draws come from a stream forked off the state's own RNG.
        let mut rng = Rng::with_seed(state.rng_mut().u64(..));
        let report_every = self
            .config
            .anneal
            .verbose
            .then(|| (schedule.max_iterations() / PROGRESS_REPORTS_PER_RUN).max(1));

        let started = Instant::now();
        let outcome = anneal(state, &schedule, &mut rng, report_every, callback);
        let elapsed = started.elapsed();

        let state = outcome.state;
        let verdict = verifier::verdict(&state);

        info!(
            "Finished {} iterations in {:.2?} ({} accepted): score={:.0}",
            outcome.iterations,
            elapsed,
            outcome.accepted,
            state.score()
        );

        let run_outcome = if verdict.is_trivial_optimum {
            info!(
                "Trivial optimum reached: score={:.0} ({})",
                verdict.score, verdict.stats
            );
            RunOutcome::TrivialOptimum
        } else {
            warn!(
                "Final state is not a trivial optimum: score={:.0}, bound={:.0} ({})",
                verdict.score, verdict.bound, verdict.stats
            );
            RunOutcome::NotProvablyOptimal
        };

        Ok(RunReport {
            start_stats,
            start_score,
            final_stats: verdict.stats,
            iterations: outcome.iterations,
            accepted: outcome.accepted,
            best_energy: outcome.best_energy,
            verdict,
            outcome: run_outcome,
            state,
        })
    }
}
