use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::RealUniverse;
use crate::error::{Error, Result};
use crate::universe::{Position, Universe};

use super::params::{transform_position, AlignmentParams};

/// How the per-anchor squared errors are folded into one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFormula {
    /// Weighted sum of squared distances.
    #[default]
    SumSquared,
    /// Weighted mean of squared distances.
    MeanSquared,
    /// Square root of the weighted mean of squared distances.
    RootMeanSquared,
}

/// Declared correspondence between a catalog star and a fictional system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    pub catalog_id: String,
    pub system: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Rule used to pair catalog stars with fictional systems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorMatching {
    /// A star anchors onto the first fictional system whose name equals the
    /// star's catalog display string.
    #[default]
    ByName,
    /// Only the listed pairs are anchors; every pair must resolve.
    Explicit { pairs: Vec<AnchorPair> },
}

/// Resolved anchor used by the cost function.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub real_index: usize,
    pub system_index: usize,
    pub real: Position,
    pub target: Position,
    pub weight: f64,
}

impl AnchorMatching {
    /// Pair catalog stars with fictional systems.
    ///
    /// Fails with [`Error::NoAnchors`] when nothing matches, since the cost
    /// would have no error term.
    pub fn resolve(&self, real: &RealUniverse, fiction: &Universe) -> Result<Vec<Anchor>> {
        let anchors = match self {
            AnchorMatching::ByName => real
                .stars
                .iter()
                .enumerate()
                .filter_map(|(real_index, star)| {
                    let system_index = fiction
                        .systems
                        .iter()
                        .position(|system| system.name() == star.id.display())?;
                    Some(Anchor {
                        real_index,
                        system_index,
                        real: star.coordinates,
                        target: fiction.systems[system_index].position(),
                        weight: 1.0,
                    })
                })
                .collect::<Vec<_>>(),
            AnchorMatching::Explicit { pairs } => pairs
                .iter()
                .map(|pair| {
                    if !pair.weight.is_finite() || pair.weight < 0.0 {
                        return Err(Error::DatasetValidation {
                            message: format!(
                                "anchor {} -> {} has invalid weight {}",
                                pair.catalog_id, pair.system, pair.weight
                            ),
                        });
                    }
                    let real_index = real.index_by_id(&pair.catalog_id)?;
                    let system_index = fiction.index_by_name(&pair.system)?;
                    Ok(Anchor {
                        real_index,
                        system_index,
                        real: real.stars[real_index].coordinates,
                        target: fiction.systems[system_index].position(),
                        weight: pair.weight,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        if anchors.is_empty() {
            return Err(Error::NoAnchors);
        }
        if anchors.iter().map(|anchor| anchor.weight).sum::<f64>() <= 0.0 {
            return Err(Error::DatasetValidation {
                message: "anchor weights sum to zero".to_string(),
            });
        }

        debug!(anchor_count = anchors.len(), "resolved alignment anchors");
        Ok(anchors)
    }
}

/// Geometric alignment error of a candidate transform.
#[derive(Debug, Clone)]
pub struct AlignmentCost {
    anchors: Vec<Anchor>,
    formula: CostFormula,
    total_weight: f64,
}

impl AlignmentCost {
    pub fn new(anchors: Vec<Anchor>, formula: CostFormula) -> Result<Self> {
        if anchors.is_empty() {
            return Err(Error::NoAnchors);
        }
        let total_weight = anchors.iter().map(|anchor| anchor.weight).sum();
        Ok(Self {
            anchors,
            formula,
            total_weight,
        })
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn formula(&self) -> CostFormula {
        self.formula
    }

    /// Score `params`; lower is better and zero is a perfect fit.
    pub fn evaluate(&self, params: &AlignmentParams) -> f64 {
        let matrix = params.matrix();
        let weighted_sum: f64 = self
            .anchors
            .iter()
            .map(|anchor| {
                let moved = transform_position(&matrix, anchor.real);
                anchor.weight * moved.distance_squared_to(&anchor.target)
            })
            .sum();

        match self.formula {
            CostFormula::SumSquared => weighted_sum,
            CostFormula::MeanSquared => weighted_sum / self.total_weight,
            CostFormula::RootMeanSquared => (weighted_sum / self.total_weight).sqrt(),
        }
    }
}
