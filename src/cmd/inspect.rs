use crate::reports;
use clap::Args;
use fastrand::Rng;
use reshuffler::config::{InputParams, PenaltyWeights};
use reshuffler::error::RsResult;
use reshuffler::optimizer::SearchState;
use reshuffler::scorer::{Allocation, AllocationSet};
use reshuffler::verifier;

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub weights: PenaltyWeights,
}

/// Prints the input distribution and the statistics of the initial state.
pub fn run(weights: PenaltyWeights, params: &InputParams, initial: Vec<Allocation>) -> RsResult<i32> {
    reports::print_category_report(&initial.num_per_category(params.num_categories));

    // The RNG is never drawn from here.
    let state = SearchState::new(initial, Rng::with_seed(0), weights)?;
    let stats = verifier::compute_stats(&state);

    reports::print_owner_report(&state, &params.grail_categories);
    println!(
        "\nInitial: owners={}, tokens={}, score={:.0}, bound={:.0} ({})",
        state.num_allocations(),
        state.num_tokens(),
        state.score(),
        verifier::score_bound(&state),
        stats
    );
    Ok(0)
}
