//! Derivative-free global optimizers for the alignment search.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use super::params::{ParameterBounds, PARAMETER_COUNT};

/// Black-box minimiser driven by [`UniverseCreator`](super::UniverseCreator).
///
/// Implementations must only propose points inside the supplied bounds and
/// must never report a best cost worse than one reported earlier.
pub trait GlobalOptimizer {
    /// Next candidate to evaluate.
    fn propose(&mut self, bounds: &ParameterBounds) -> [f64; PARAMETER_COUNT];

    /// Feed back the cost of a candidate returned by [`GlobalOptimizer::propose`].
    fn report(&mut self, candidate: &[f64; PARAMETER_COUNT], cost: f64);

    /// Best candidate seen so far and its cost.
    fn best(&self) -> Option<([f64; PARAMETER_COUNT], f64)>;
}

/// Relative mutation step a fresh search starts with.
const INITIAL_STEP: f64 = 0.25;

/// Below this relative step the search restarts with [`INITIAL_STEP`].
const MIN_STEP: f64 = 1e-12;

/// Uniform samples drawn before local search starts.
const DEFAULT_EXPLORATION_SAMPLES: usize = 32;

/// Seeded (1+1) evolution strategy with a uniform exploration phase.
///
/// Mutations are Gaussian, scaled per parameter by the bound width, and the
/// step size follows the one-fifth success rule.
#[derive(Debug, Clone)]
pub struct EvolutionaryOptimizer {
    rng: ChaCha8Rng,
    exploration_samples: usize,
    proposals: usize,
    step: f64,
    pending_mutation: bool,
    best: Option<([f64; PARAMETER_COUNT], f64)>,
}

impl EvolutionaryOptimizer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            exploration_samples: DEFAULT_EXPLORATION_SAMPLES,
            proposals: 0,
            step: INITIAL_STEP,
            pending_mutation: false,
            best: None,
        }
    }

    pub fn with_exploration_samples(mut self, samples: usize) -> Self {
        self.exploration_samples = samples;
        self
    }

    /// Current relative mutation step.
    pub fn step(&self) -> f64 {
        self.step
    }

    fn sample_uniform(&mut self, bounds: &ParameterBounds) -> [f64; PARAMETER_COUNT] {
        std::array::from_fn(|index| {
            let (lo, hi) = (bounds.min[index], bounds.max[index]);
            if lo < hi {
                self.rng.random_range(lo..=hi)
            } else {
                lo
            }
        })
    }

    fn mutate(
        &mut self,
        parent: &[f64; PARAMETER_COUNT],
        bounds: &ParameterBounds,
    ) -> [f64; PARAMETER_COUNT] {
        let mut child: [f64; PARAMETER_COUNT] = std::array::from_fn(|index| {
            let noise: f64 = self.rng.sample(StandardNormal);
            parent[index] + noise * self.step * bounds.width(index)
        });
        bounds.clamp(&mut child);
        child
    }
}

impl GlobalOptimizer for EvolutionaryOptimizer {
    fn propose(&mut self, bounds: &ParameterBounds) -> [f64; PARAMETER_COUNT] {
        self.proposals += 1;
        match self.best {
            Some((parent, _)) if self.proposals > self.exploration_samples => {
                self.pending_mutation = true;
                self.mutate(&parent, bounds)
            }
            _ => {
                self.pending_mutation = false;
                self.sample_uniform(bounds)
            }
        }
    }

    fn report(&mut self, candidate: &[f64; PARAMETER_COUNT], cost: f64) {
        if cost.is_nan() {
            return;
        }

        let improved = match self.best {
            Some((_, best_cost)) => cost < best_cost,
            None => true,
        };
        if improved {
            self.best = Some((*candidate, cost));
        }

        if self.pending_mutation {
            self.step *= if improved {
                (1.0_f64 / 3.0).exp()
            } else {
                (-1.0_f64 / 12.0).exp()
            };
            if self.step < MIN_STEP {
                self.step = INITIAL_STEP;
            }
            self.step = self.step.min(1.0);
        }
    }

    fn best(&self) -> Option<([f64; PARAMETER_COUNT], f64)> {
        self.best
    }
}
