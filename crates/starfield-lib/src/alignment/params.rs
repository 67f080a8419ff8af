use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use crate::catalog::{extent_of, RealUniverse};
use crate::error::{Error, Result};
use crate::universe::{Position, Universe};

use super::AlignmentConfig;

/// Dimension of the alignment search space.
///
/// Layout: `0..3` Euler angles (roll, pitch, yaw), `3..6` per-axis scale,
/// `6..9` translation.
pub const PARAMETER_COUNT: usize = 9;

/// Candidate transform from the real catalog frame into the fictional frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentParams {
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    pub translation: [f64; 3],
}

impl AlignmentParams {
    pub fn identity() -> Self {
        Self {
            rotation: [0.0; 3],
            scale: [1.0; 3],
            translation: [0.0; 3],
        }
    }

    pub fn from_vector(values: &[f64; PARAMETER_COUNT]) -> Self {
        Self {
            rotation: [values[0], values[1], values[2]],
            scale: [values[3], values[4], values[5]],
            translation: [values[6], values[7], values[8]],
        }
    }

    pub fn to_vector(&self) -> [f64; PARAMETER_COUNT] {
        let mut values = [0.0; PARAMETER_COUNT];
        values[0..3].copy_from_slice(&self.rotation);
        values[3..6].copy_from_slice(&self.scale);
        values[6..9].copy_from_slice(&self.translation);
        values
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_euler_angles(self.rotation[0], self.rotation[1], self.rotation[2])
    }

    /// Homogeneous matrix that rotates, then scales, then translates.
    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::from(self.translation))
            * Matrix4::new_nonuniform_scaling(&Vector3::from(self.scale))
            * self.rotation().to_homogeneous()
    }

    /// Transform a single position.
    pub fn apply(&self, position: Position) -> Position {
        transform_position(&self.matrix(), position)
    }
}

pub(crate) fn transform_position(matrix: &Matrix4<f64>, position: Position) -> Position {
    let point = matrix.transform_point(&Point3::new(position.x, position.y, position.z));
    Position::new(point.x, point.y, point.z)
}

/// Inclusive per-parameter search bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBounds {
    pub min: [f64; PARAMETER_COUNT],
    pub max: [f64; PARAMETER_COUNT],
}

impl ParameterBounds {
    pub fn new(min: [f64; PARAMETER_COUNT], max: [f64; PARAMETER_COUNT]) -> Result<Self> {
        for index in 0..PARAMETER_COUNT {
            let (lo, hi) = (min[index], max[index]);
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(Error::InvalidBounds {
                    index,
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Bounds for aligning `real` onto `fiction`.
    ///
    /// Translations must be able to move any scaled, rotated catalog star onto
    /// any fictional system, so they span the fictional extent widened by the
    /// largest reachable catalog radius and the configured margin.
    pub fn for_alignment(
        config: &AlignmentConfig,
        real: &RealUniverse,
        fiction: &Universe,
    ) -> Result<Self> {
        let mut min = [0.0; PARAMETER_COUNT];
        let mut max = [0.0; PARAMETER_COUNT];

        for axis in 0..3 {
            min[axis] = config.rotation_bounds[0];
            max[axis] = config.rotation_bounds[1];
            min[3 + axis] = config.scale_bounds[0];
            max[3 + axis] = config.scale_bounds[1];
        }

        let translation = match config.translation_bounds {
            Some(bounds) => [[bounds[0]; 3], [bounds[1]; 3]],
            None => derived_translation_bounds(config, real, fiction),
        };
        min[6..9].copy_from_slice(&translation[0]);
        max[6..9].copy_from_slice(&translation[1]);

        Self::new(min, max)
    }

    pub fn width(&self, index: usize) -> f64 {
        self.max[index] - self.min[index]
    }

    pub fn midpoint(&self) -> [f64; PARAMETER_COUNT] {
        std::array::from_fn(|index| self.min[index] + self.width(index) / 2.0)
    }

    pub fn contains(&self, values: &[f64; PARAMETER_COUNT]) -> bool {
        values
            .iter()
            .enumerate()
            .all(|(index, value)| *value >= self.min[index] && *value <= self.max[index])
    }

    pub fn clamp(&self, values: &mut [f64; PARAMETER_COUNT]) {
        for (index, value) in values.iter_mut().enumerate() {
            *value = value.clamp(self.min[index], self.max[index]);
        }
    }
}

fn derived_translation_bounds(
    config: &AlignmentConfig,
    real: &RealUniverse,
    fiction: &Universe,
) -> [[f64; 3]; 2] {
    let origin = Position::default();
    let reach = real
        .stars
        .iter()
        .map(|star| star.coordinates.distance_to(&origin))
        .fold(0.0_f64, f64::max)
        * config.scale_bounds[1].abs();

    let (low, high) = extent_of(fiction.systems.iter().map(|system| system.position()))
        .unwrap_or((origin, origin));
    let slack = reach + config.translation_margin;

    [
        [low.x - slack, low.y - slack, low.z - slack],
        [high.x + slack, high.y + slack, high.z + slack],
    ]
}
