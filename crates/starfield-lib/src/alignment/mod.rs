//! Catalog alignment.
//!
//! Fits a rotate/scale/translate transform that maps real catalog coordinates
//! onto the fictional frame, using a handful of anchor stars whose fictional
//! position is known, and materialises the whole catalog as a [`Universe`].
//!
//! [`Universe`]: crate::universe::Universe

pub mod cost;
pub mod creator;
pub mod optimizer;
pub mod params;

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use cost::{Anchor, AnchorMatching, AnchorPair, AlignmentCost, CostFormula};
pub use creator::{CreatorResult, UniverseCreator};
pub use optimizer::{EvolutionaryOptimizer, GlobalOptimizer};
pub use params::{AlignmentParams, ParameterBounds, PARAMETER_COUNT};

/// Tunables for a [`UniverseCreator`] run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Hard cap on cost evaluations.
    pub max_iterations: u64,
    /// The search stops once the best cost is at or below this value.
    pub tolerance: f64,
    /// Cost evaluations performed by each [`UniverseCreator::get`] call.
    pub evaluations_per_step: u64,
    /// Seed for the default optimizer.
    pub seed: u64,
    /// Bounds shared by the three Euler angles, in radians.
    pub rotation_bounds: [f64; 2],
    /// Bounds shared by the three axis scale factors.
    pub scale_bounds: [f64; 2],
    /// Explicit bounds shared by the translation components. When absent they
    /// are derived from the extents of both catalogs.
    pub translation_bounds: Option<[f64; 2]>,
    /// Slack added on both sides of derived translation bounds.
    pub translation_margin: f64,
    pub cost_formula: CostFormula,
    pub anchor_matching: AnchorMatching,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200_000,
            tolerance: 1e-6,
            evaluations_per_step: 1_000,
            seed: 0x5eed,
            rotation_bounds: [-PI, PI],
            scale_bounds: [0.1, 10.0],
            translation_bounds: None,
            translation_margin: 10.0,
            cost_formula: CostFormula::default(),
            anchor_matching: AnchorMatching::default(),
        }
    }
}

impl AlignmentConfig {
    /// Load a configuration from a JSON file; missing fields keep defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the search ill-defined.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> { Err(Error::InvalidConfig { message }) };

        if self.max_iterations == 0 {
            return invalid("max_iterations must be at least 1".to_string());
        }
        if self.evaluations_per_step == 0 {
            return invalid("evaluations_per_step must be at least 1".to_string());
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return invalid(format!("tolerance {} must be non-negative", self.tolerance));
        }
        if self.scale_bounds[0] <= 0.0 {
            return invalid(format!(
                "scale bounds must be positive, got {:?}",
                self.scale_bounds
            ));
        }
        if !self.translation_margin.is_finite() || self.translation_margin < 0.0 {
            return invalid(format!(
                "translation margin {} must be non-negative",
                self.translation_margin
            ));
        }
        Ok(())
    }
}
