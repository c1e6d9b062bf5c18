use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use reshuffler::config::{InputParams, PenaltyWeights};
use reshuffler::error::{ReshufflerError, RsResult};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Validated allocation table (`Owner,TokenId,CategoryId`).
    #[arg(global = true, short, long)]
    input: Option<PathBuf>,

    /// Airdrop table (`TokenId,Airdrop receiver,ProjectId`).
    #[arg(global = true, long)]
    airdrops: Option<PathBuf>,

    /// Transfer log (`From,TokenId`).
    #[arg(global = true, long)]
    transfers: Option<PathBuf>,

    #[command(flatten)]
    input_params: InputParams,

    /// JSON file with penalty weights; explicit weight flags override it.
    #[arg(global = true, long)]
    weights: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Anneal the allocations and write the reallocation tables.
    Run(cmd::run::RunArgs),
    /// Load and validate the input, print its statistics.
    Inspect(cmd::inspect::InspectArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let code = execute(cli, &matches).unwrap_or_else(|e| {
        error!("❌ {}", e);
        1
    });
    process::exit(code);
}

fn execute(cli: Cli, matches: &ArgMatches) -> RsResult<i32> {
    let sub_matches = matches
        .subcommand()
        .map(|(_, m)| m)
        .ok_or_else(|| ReshufflerError::Config("missing subcommand".to_string()))?;

    let source = cmd::InputSource::from_flags(cli.input, cli.airdrops, cli.transfers)?;
    let initial = source.load(&cli.input_params)?;

    match cli.command {
        Commands::Run(args) => {
            let mut config = args.config.clone();
            config.weights = resolve_weights(&args.config.weights, cli.weights.as_deref(), sub_matches)?;
            cmd::run::run(&args, config, &cli.input_params, initial)
        }
        Commands::Inspect(args) => {
            let weights = resolve_weights(&args.weights, cli.weights.as_deref(), sub_matches)?;
            cmd::inspect::run(weights, &cli.input_params, initial)
        }
    }
}

fn resolve_weights(
    cli_weights: &PenaltyWeights,
    path: Option<&str>,
    sub_matches: &ArgMatches,
) -> RsResult<PenaltyWeights> {
    let weights = match path {
        Some(path) => {
            info!("⚖️  Loading Weights from: {}", path);
            let mut file_weights = PenaltyWeights::load_from_file(path)?;
            file_weights.merge_from_cli(cli_weights, sub_matches);
            file_weights
        }
        None => *cli_weights,
    };
    weights.validate()?;
    Ok(weights)
}
