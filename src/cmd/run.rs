use crate::reports;
use clap::Args;
use reshuffler::config::{Config, InputParams};
use reshuffler::consts::DEFAULT_SEED_HEX;
use reshuffler::error::RsResult;
use reshuffler::export::RenderedOutputs;
use reshuffler::optimizer::{ProgressCallback, ProgressReport, Reshuffler, RunOutcome};
use reshuffler::scorer::Allocation;
use reshuffler::seed::fold_seed;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Exit code of a run that finished but cannot prove its result optimal.
pub const EXIT_NOT_OPTIMAL: i32 = 2;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: Config,

    /// Hexadecimal seed; at most 256 bits.
    #[arg(long, default_value = DEFAULT_SEED_HEX)]
    pub seed_hex: String,

    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Exit with 0 even when the final state is not a trivial optimum.
    #[arg(long, default_value_t = false)]
    pub allow_non_optimal: bool,
}

struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_progress(&mut self, r: &ProgressReport) {
        info!(
            "Iter {:>10}/{} | T={:.4} | score={:.0} | best={:.0} | accepted={}",
            r.iteration, r.max_iterations, r.temperature, -r.energy, -r.best_energy, r.accepted
        );
    }
}

pub fn run(
    args: &RunArgs,
    config: Config,
    params: &InputParams,
    initial: Vec<Allocation>,
) -> RsResult<i32> {
    let seed = fold_seed(&args.seed_hex)?;

    let reshuffler = Reshuffler::new(config);
    let report = reshuffler.run(initial, seed, &mut LogProgress)?;

    report.log_holdings(&params.grail_categories);
    reports::print_owner_report(&report.state, &params.grail_categories);
    reports::print_stats_comparison(
        &report.start_stats,
        report.start_score,
        &report.verdict,
        &report.state,
    );

    // Nothing touches the disk until both tables are rendered.
    let outputs = RenderedOutputs::render(&report.state, &params.grail_categories)?;
    outputs.write_to_dir(&args.out_dir, &args.seed_hex)?;

    match report.outcome {
        RunOutcome::TrivialOptimum => Ok(0),
        RunOutcome::NotProvablyOptimal if args.allow_non_optimal => {
            warn!("⚠️  Final state is not a trivial optimum, accepted by --allow-non-optimal.");
            Ok(0)
        }
        RunOutcome::NotProvablyOptimal => {
            error!("❌ Final state is not a trivial optimum.");
            Ok(EXIT_NOT_OPTIMAL)
        }
    }
}
