use fastrand::Rng;
use reshuffler::config::{AnnealParams, Config, PenaltyWeights};
use reshuffler::core_types::{CategoryId, TokenIdGenerator};
use reshuffler::error::ReshufflerError;
use reshuffler::optimizer::{Holding, ProgressCallback, ProgressReport, Reshuffler, RunOutcome, SearchState};
use reshuffler::scorer::Allocation;
use reshuffler::verifier;
use rstest::rstest;
use std::io::Write;
use std::sync::{Arc, Mutex};

fn build(width: usize, owners: &[&[CategoryId]], pool: Option<usize>) -> Vec<Allocation> {
    let mut ids = TokenIdGenerator::new();
    owners
        .iter()
        .enumerate()
        .map(|(i, cats)| {
            let a = Allocation::new(format!("0x{:02x}", i), ids.tokens_from_categories(cats), width)
                .unwrap();
            if pool == Some(i) {
                a.into_pool()
            } else {
                a
            }
        })
        .collect()
}

fn quick_config() -> Config {
    Config {
        anneal: AnnealParams {
            temperature: 10.0,
            annealing_factor: 0.9995,
            ..Default::default()
        },
        weights: PenaltyWeights::default(),
    }
}

// --- VERIFIER ---

#[test]
fn test_initial_state_is_not_optimal() {
    let state = SearchState::new(
        build(4, &[&[0, 1], &[2, 3]], None),
        Rng::with_seed(0),
        PenaltyWeights::default(),
    )
    .unwrap();

    let stats = verifier::compute_stats(&state);
    assert_eq!(stats.num_returned_tokens, 4);
    assert_eq!(stats.num_returned_categories, 4);
    assert_eq!(stats.num_duplicate_category_tokens, 0);
    assert_eq!(verifier::score_bound(&state), -4.0);
    assert!(!verifier::is_trivial_optimum(&state));
}

#[test]
fn test_full_swap_is_trivial_optimum() {
    let mut state = SearchState::new(
        build(4, &[&[0, 1], &[2, 3]], None),
        Rng::with_seed(0),
        PenaltyWeights::default(),
    )
    .unwrap();
    state.exchange(0, 0, 1, 0);
    state.exchange(0, 1, 1, 1);

    assert!(verifier::compute_stats(&state).is_zero());
    assert_eq!(state.score(), -4.0);
    assert!(verifier::is_trivial_optimum(&state));
}

#[test]
fn test_pool_is_left_out_of_stats() {
    let state = SearchState::new(
        build(3, &[&[0, 0], &[1], &[2]], Some(0)),
        Rng::with_seed(0),
        PenaltyWeights::default(),
    )
    .unwrap();

    let stats = verifier::compute_stats(&state);
    assert_eq!(stats.num_returned_tokens, 2);
    assert_eq!(stats.num_duplicate_category_tokens, 0);
    // Pool ceiling -2, participants -1 each.
    assert_eq!(verifier::score_bound(&state), -4.0);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs.text())
}

#[test]
fn test_verdict_queries_do_not_log() {
    let state = SearchState::new(
        build(4, &[&[0, 1], &[2, 3]], None),
        Rng::with_seed(0),
        PenaltyWeights::default(),
    )
    .unwrap();

    let ((optimal, verdict), logs) =
        with_captured_logs(|| (verifier::is_trivial_optimum(&state), verifier::verdict(&state)));

    assert!(!optimal);
    assert!(!verdict.is_trivial_optimum);
    assert_eq!(verdict.bound, -4.0);
    assert!(logs.is_empty(), "unexpected logs:\n{}", logs);
}

#[test]
fn test_run_logs_verdict_once() {
    let (report, logs) = with_captured_logs(|| {
        Reshuffler::new(quick_config()).run(build(1, &[&[0, 0], &[0, 0]], None), 7, &mut ())
    });

    assert!(!report.unwrap().is_trivial_optimum());
    assert_eq!(logs.matches("not a trivial optimum").count(), 1);
}

// --- END TO END ---

#[rstest]
#[case::two_owners(4, vec![vec![0, 1], vec![2, 3]], None)]
#[case::four_owners(12, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8], vec![9, 10, 11]], None)]
#[case::uneven(6, vec![vec![0, 0], vec![1, 2], vec![3], vec![4, 5, 4]], None)]
#[case::with_pool(4, vec![vec![2, 3, 2], vec![0], vec![1]], Some(0))]
fn test_run_reaches_trivial_optimum(
    #[case] width: usize,
    #[case] owners: Vec<Vec<CategoryId>>,
    #[case] pool: Option<usize>,
) {
    let owners: Vec<&[CategoryId]> = owners.iter().map(Vec::as_slice).collect();
    let report = Reshuffler::new(quick_config())
        .run(build(width, &owners, pool), 42, &mut ())
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::TrivialOptimum);
    assert!(report.final_stats.is_zero());
    assert_eq!(report.state.score(), verifier::score_bound(&report.state));
    assert!(report.start_score <= report.state.score());
    assert_eq!(report.iterations, 2 * 4604);
}

#[test]
fn test_impossible_instance_is_not_provably_optimal() {
    // A single category: every owner keeps duplicates.
    let report = Reshuffler::new(quick_config())
        .run(build(1, &[&[0, 0], &[0, 0]], None), 7, &mut ())
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::NotProvablyOptimal);
    assert!(!report.is_trivial_optimum());
    assert_eq!(report.final_stats.num_duplicate_category_tokens, 2);
}

#[test]
fn test_holdings_follow_the_tokens() {
    let report = Reshuffler::new(quick_config())
        .run(build(4, &[&[0, 1], &[2, 3]], None), 42, &mut ())
        .unwrap();
    assert!(report.is_trivial_optimum());

    // Categories 2 and 3 both moved to the first owner.
    assert_eq!(
        report.holdings(&[2, 3]),
        vec![Holding {
            owner: "0x00".to_string(),
            num_tokens: 2,
            num_highlighted: 2,
        }]
    );
    assert!(report.holdings(&[7]).is_empty());

    let (_, logs) = with_captured_logs(|| report.log_holdings(&[0, 1]));
    assert!(logs.contains("0x01 numTokens=2, numGrails=2"), "logs:\n{}", logs);
}

#[test]
fn test_progress_reports_when_verbose() {
    struct Collect(Vec<ProgressReport>);
    impl ProgressCallback for Collect {
        fn on_progress(&mut self, report: &ProgressReport) {
            self.0.push(*report);
        }
    }

    let mut config = quick_config();
    config.anneal.verbose = true;
    config.anneal.max_iterations = Some(2000);

    let mut collect = Collect(Vec::new());
    Reshuffler::new(config)
        .run(build(4, &[&[0, 1], &[2, 3]], None), 1, &mut collect)
        .unwrap();

    assert_eq!(collect.0.len(), 20);
    assert_eq!(collect.0[0].iteration, 100);
    assert_eq!(collect.0[19].iteration, 2000);
    assert!(collect.0.windows(2).all(|w| w[1].temperature < w[0].temperature));
    assert!(collect.0.iter().all(|r| r.best_energy <= r.energy));
}

#[test]
fn test_silent_unless_verbose() {
    struct Fail;
    impl ProgressCallback for Fail {
        fn on_progress(&mut self, _report: &ProgressReport) {
            panic!("no progress expected");
        }
    }

    Reshuffler::new(quick_config())
        .run(build(4, &[&[0, 1], &[2, 3]], None), 1, &mut Fail)
        .unwrap();
}

#[rstest]
#[case(0.0, 0.999)]
#[case(10.0, 1.0)]
#[case(0.5, 0.9)]
fn test_bad_schedule_is_rejected(#[case] temperature: f64, #[case] annealing_factor: f64) {
    let mut config = quick_config();
    config.anneal.temperature = temperature;
    config.anneal.annealing_factor = annealing_factor;

    let result = Reshuffler::new(config).run(build(4, &[&[0, 1], &[2, 3]], None), 1, &mut ());
    assert!(matches!(result, Err(ReshufflerError::Schedule(_))));
}

#[test]
fn test_negative_weight_is_rejected() {
    let mut config = quick_config();
    config.weights.weight_returned_token = -1.0;

    let result = Reshuffler::new(config).run(build(4, &[&[0, 1], &[2, 3]], None), 1, &mut ());
    assert!(matches!(result, Err(ReshufflerError::Config(_))));
}
