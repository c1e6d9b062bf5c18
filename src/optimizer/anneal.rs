use crate::config::AnnealParams;
use crate::error::{ReshufflerError, RsResult};
use fastrand::Rng;

/// What the control loop needs from a state: an energy to minimise and a way
/// to propose a neighbor.
pub trait AnnealingState: Sized {
    fn energy(&self) -> f64;
    fn neighbor(&mut self) -> Self;
}

/// Geometric cooling, `T(t) = T0 * factor^t`, with a fixed iteration budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolingSchedule {
    temperature: f64,
    annealing_factor: f64,
    max_iterations: usize,
}

impl CoolingSchedule {
    /// Schedule running for twice the number of steps needed to cool from
    /// `temperature` down to 1.
    ///
    /// At `T = 1`, the smallest energy difference between two distinct
    /// neighbors is accepted with probability `<= 1/e`; the second half of the
    /// budget lets the tail of the schedule settle.
    pub fn new(temperature: f64, annealing_factor: f64) -> RsResult<Self> {
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(ReshufflerError::Schedule(format!(
                "temperature must be positive and finite, got {}",
                temperature
            )));
        }
        if !(annealing_factor > 0.0 && annealing_factor < 1.0) {
            return Err(ReshufflerError::Schedule(format!(
                "annealing factor must lie in (0, 1), got {}",
                annealing_factor
            )));
        }

        let max_iterations = 2 * iterations_to_lukewarm(temperature, annealing_factor);
        if max_iterations == 0 {
            return Err(ReshufflerError::Schedule(format!(
                "temperature {} never cools down to 1, the iteration budget is empty",
                temperature
            )));
        }

        Ok(Self {
            temperature,
            annealing_factor,
            max_iterations,
        })
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> RsResult<Self> {
        if max_iterations == 0 {
            return Err(ReshufflerError::Schedule(
                "max iterations must be positive".to_string(),
            ));
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    pub fn from_params(params: &AnnealParams) -> RsResult<Self> {
        let schedule = Self::new(params.temperature, params.annealing_factor)?;
        match params.max_iterations {
            Some(n) => schedule.with_max_iterations(n),
            None => Ok(schedule),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn annealing_factor(&self) -> f64 {
        self.annealing_factor
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn temperature_at(&self, iteration: usize) -> f64 {
        self.temperature * self.annealing_factor.powf(iteration as f64)
    }
}

/// Steps for `T0 * factor^t` to reach 1. Zero when `T0 <= 1`.
pub fn iterations_to_lukewarm(temperature: f64, annealing_factor: f64) -> usize {
    let steps = -temperature.ln() / annealing_factor.ln();
    if steps.is_finite() && steps > 0.0 {
        steps as usize
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub iteration: usize,
    pub max_iterations: usize,
    pub temperature: f64,
    pub energy: f64,
    pub best_energy: f64,
    pub accepted: usize,
}

/// Receives periodic updates from the control loop. The loop always runs to
/// its full budget.
pub trait ProgressCallback {
    fn on_progress(&mut self, report: &ProgressReport);
}

impl ProgressCallback for () {
    fn on_progress(&mut self, _report: &ProgressReport) {}
}

pub struct AnnealOutcome<S> {
    /// State after the last iteration.
    pub state: S,
    pub iterations: usize,
    pub accepted: usize,
    pub best_energy: f64,
}

/// Simulated annealing with Metropolis acceptance.
///
/// `rng` drives acceptance only; the state draws its moves from its own RNG.
/// With `report_every = Some(k)` the callback fires every `k` iterations.
pub fn anneal<S, CB>(
    initial: S,
    schedule: &CoolingSchedule,
    rng: &mut Rng,
    report_every: Option<usize>,
    callback: &mut CB,
) -> AnnealOutcome<S>
where
    S: AnnealingState,
    CB: ProgressCallback + ?Sized,
{
    let mut state = initial;
    let mut energy = state.energy();
    let mut best_energy = energy;
    let mut temperature = schedule.temperature;
    let mut accepted = 0;

    for iteration in 0..schedule.max_iterations {
        let candidate = state.neighbor();
        let candidate_energy = candidate.energy();
        let delta = candidate_energy - energy;

        if delta <= 0.0 || rng.f64() < (-delta / temperature).exp() {
            state = candidate;
            energy = candidate_energy;
            accepted += 1;
            if energy < best_energy {
                best_energy = energy;
            }
        }

        temperature *= schedule.annealing_factor;

        if let Some(every) = report_every {
            if (iteration + 1) % every == 0 {
                callback.on_progress(&ProgressReport {
                    iteration: iteration + 1,
                    max_iterations: schedule.max_iterations,
                    temperature,
                    energy,
                    best_energy,
                    accepted,
                });
            }
        }
    }

    AnnealOutcome {
        state,
        iterations: schedule.max_iterations,
        accepted,
        best_energy,
    }
}
