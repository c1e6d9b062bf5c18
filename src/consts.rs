/// Number of categories (projects) a token can belong to in the default data set.
pub const DEFAULT_NUM_CATEGORIES: usize = 21;

/// Starting temperature of the annealing schedule.
pub const DEFAULT_TEMPERATURE: f64 = 10.0;

/// Geometric cooling factor applied once per iteration.
pub const DEFAULT_ANNEALING_FACTOR: f64 = 0.999999;

/// Number of progress reports emitted over a verbose run.
pub const PROGRESS_REPORTS_PER_RUN: usize = 20;

/// Categories whose tokens are singled out in reports (the "grails").
pub const DEFAULT_GRAIL_CATEGORIES: [usize; 3] = [11, 17, 19];

/// Absolute tolerance when comparing a cached score against a closed-form bound.
pub const SCORE_EPSILON: f64 = 1e-6;

/// Seeds are at most 256 bits, i.e. 64 hex digits.
pub const MAX_SEED_HEX_DIGITS: usize = 64;

/// Default seed: 256 zero bits.
pub const DEFAULT_SEED_HEX: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
