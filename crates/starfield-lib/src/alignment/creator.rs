use std::collections::HashMap;

use tracing::{debug, info};

use crate::catalog::RealUniverse;
use crate::error::Result;
use crate::universe::{InfoQuality, System, Universe};

use super::cost::AlignmentCost;
use super::optimizer::{EvolutionaryOptimizer, GlobalOptimizer};
use super::params::{transform_position, AlignmentParams, ParameterBounds};
use super::AlignmentConfig;

/// Outcome of one [`UniverseCreator::get`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum CreatorResult {
    /// Still searching; carries the best cost found so far.
    Searching { iteration: u64, best_cost: f64 },
    /// Converged; every catalog star transformed into the fictional frame.
    Finished(Universe),
}

/// Drives a [`GlobalOptimizer`] towards the transform that best maps the real
/// catalog onto the anchors of a reference fictional universe.
///
/// `get` must be called sequentially by a single owner; each call advances
/// the search by [`AlignmentConfig::evaluations_per_step`] evaluations.
#[derive(Debug)]
pub struct UniverseCreator<O: GlobalOptimizer = EvolutionaryOptimizer> {
    real_universe: RealUniverse,
    anchor_names: HashMap<usize, String>,
    cost: AlignmentCost,
    bounds: ParameterBounds,
    optimizer: O,
    config: AlignmentConfig,
    iteration: u64,
}

impl UniverseCreator<EvolutionaryOptimizer> {
    /// Creator using the built-in optimizer seeded from `config.seed`.
    pub fn new(
        real_universe: RealUniverse,
        fiction: &Universe,
        config: AlignmentConfig,
    ) -> Result<Self> {
        let optimizer = EvolutionaryOptimizer::new(config.seed);
        Self::with_optimizer(real_universe, fiction, config, optimizer)
    }
}

impl<O: GlobalOptimizer> UniverseCreator<O> {
    /// Creator driving a caller-supplied optimizer.
    ///
    /// Fails when the configuration is invalid or no anchor can be resolved.
    pub fn with_optimizer(
        real_universe: RealUniverse,
        fiction: &Universe,
        config: AlignmentConfig,
        optimizer: O,
    ) -> Result<Self> {
        config.validate()?;
        let anchors = config.anchor_matching.resolve(&real_universe, fiction)?;

        let mut anchor_names = HashMap::new();
        for anchor in &anchors {
            anchor_names
                .entry(anchor.real_index)
                .or_insert_with(|| fiction.systems[anchor.system_index].name().to_string());
        }

        let bounds = ParameterBounds::for_alignment(&config, &real_universe, fiction)?;
        let cost = AlignmentCost::new(anchors, config.cost_formula)?;

        info!(
            stars = real_universe.len(),
            anchors = cost.anchors().len(),
            max_iterations = config.max_iterations,
            "starting catalog alignment"
        );

        Ok(Self {
            real_universe,
            anchor_names,
            cost,
            bounds,
            optimizer,
            config,
            iteration: 0,
        })
    }

    /// Advance the search, or return the materialised universe once the
    /// search has converged.
    pub fn get(&mut self) -> CreatorResult {
        if !self.is_converged() {
            for _ in 0..self.config.evaluations_per_step {
                if self.is_converged() {
                    break;
                }
                let candidate = self.optimizer.propose(&self.bounds);
                let cost = self
                    .cost
                    .evaluate(&AlignmentParams::from_vector(&candidate));
                self.optimizer.report(&candidate, cost);
                self.iteration += 1;
            }
        }

        if self.is_converged() {
            info!(
                iteration = self.iteration,
                best_cost = self.best_cost(),
                "catalog alignment finished"
            );
            return CreatorResult::Finished(self.materialize());
        }

        debug!(
            iteration = self.iteration,
            best_cost = self.best_cost(),
            "catalog alignment in progress"
        );
        CreatorResult::Searching {
            iteration: self.iteration,
            best_cost: self.best_cost(),
        }
    }

    /// Call [`UniverseCreator::get`] until the search finishes.
    pub fn run_to_completion(&mut self) -> Universe {
        loop {
            if let CreatorResult::Finished(universe) = self.get() {
                return universe;
            }
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Best cost so far, or infinity before any successful evaluation.
    pub fn best_cost(&self) -> f64 {
        self.optimizer
            .best()
            .map_or(f64::INFINITY, |(_, cost)| cost)
    }

    pub fn best_params(&self) -> Option<AlignmentParams> {
        self.optimizer
            .best()
            .map(|(values, _)| AlignmentParams::from_vector(&values))
    }

    pub fn bounds(&self) -> &ParameterBounds {
        &self.bounds
    }

    pub fn cost(&self) -> &AlignmentCost {
        &self.cost
    }

    pub fn is_converged(&self) -> bool {
        self.iteration >= self.config.max_iterations || self.best_cost() <= self.config.tolerance
    }

    /// Transform every catalog star with the best parameters found.
    ///
    /// Anchored stars take the name of their fictional counterpart and are
    /// marked confirmed; the rest keep their catalog name as speculation.
    pub fn materialize(&self) -> Universe {
        let params = self
            .best_params()
            .unwrap_or_else(|| AlignmentParams::from_vector(&self.bounds.midpoint()));
        let matrix = params.matrix();

        let systems = self
            .real_universe
            .stars
            .iter()
            .enumerate()
            .map(|(index, star)| {
                let position = transform_position(&matrix, star.coordinates);
                match self.anchor_names.get(&index) {
                    Some(name) => {
                        System::new(position, name.clone()).with_quality(InfoQuality::Confirmed)
                    }
                    None => System::new(position, star.id.display())
                        .with_quality(InfoQuality::Speculation),
                }
            })
            .collect();

        Universe::new(systems)
    }
}
