use std::cmp::Ordering;

use crate::error::{Error, Result};

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Number of suggestions attached to [`Error::UnknownSystem`].
const MAX_SUGGESTIONS: usize = 3;

/// Cartesian coordinates of a star system.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Position {
    fn from(value: [f64; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

/// How much is known about a system's placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoQuality {
    Confirmed,
    Speculation,
    #[default]
    Unknown,
}

impl InfoQuality {
    /// Lowercase label used by the CSV datasets.
    pub fn label(self) -> &'static str {
        match self {
            InfoQuality::Confirmed => "confirmed",
            InfoQuality::Speculation => "speculation",
            InfoQuality::Unknown => "unknown",
        }
    }

    /// Parse a dataset label; empty input maps to [`InfoQuality::Unknown`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Some(InfoQuality::Confirmed),
            "speculation" => Some(InfoQuality::Speculation),
            "" | "unknown" => Some(InfoQuality::Unknown),
            _ => None,
        }
    }
}

/// A single star system of the fictional universe.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    name: String,
    position: Position,
    info_quality: InfoQuality,
}

impl System {
    pub fn new(position: Position, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            info_quality: InfoQuality::Unknown,
        }
    }

    pub fn with_quality(mut self, info_quality: InfoQuality) -> Self {
        self.info_quality = info_quality;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn info_quality(&self) -> InfoQuality {
        self.info_quality
    }
}

/// Ordered collection of star systems.
///
/// Names are not required to be unique; every name based lookup resolves to
/// the first system carrying that name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Universe {
    pub systems: Vec<System>,
}

impl Universe {
    pub fn new(systems: Vec<System>) -> Self {
        Self { systems }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Index of the first system named `name`.
    pub fn index_by_name(&self, name: &str) -> Result<usize> {
        self.systems
            .iter()
            .position(|system| system.name == name)
            .ok_or_else(|| Error::UnknownSystem {
                name: name.to_string(),
                suggestions: self.fuzzy_matches(name, MAX_SUGGESTIONS),
            })
    }

    /// Position of the first system named `name`.
    pub fn position_by_name(&self, name: &str) -> Result<Position> {
        self.index_by_name(name)
            .map(|index| self.systems[index].position)
    }

    /// Return up to `limit` system names similar to `name`, best match first.
    pub fn fuzzy_matches(&self, name: &str, limit: usize) -> Vec<String> {
        fuzzy_name_matches(self.systems.iter().map(System::name), name, limit)
    }
}

pub(crate) fn fuzzy_name_matches<'a>(
    candidates: impl Iterator<Item = &'a str>,
    name: &str,
    limit: usize,
) -> Vec<String> {
    let needle = name.to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| {
            let score = strsim::jaro_winkler(&needle, &candidate.to_lowercase());
            (score, candidate)
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(b.1))
    });
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

/// Smallest jump range for which `destination` becomes reachable from `start`.
///
/// Every pair of systems is a candidate edge, so the answer is the largest
/// single hop on the path that minimises its largest hop.
pub fn min_jump_range(universe: &Universe, start: &str, destination: &str) -> Result<f64> {
    let start = universe.index_by_name(start)?;
    let destination = universe.index_by_name(destination)?;

    let count = universe.len();
    let mut bottleneck = vec![f64::INFINITY; count];
    let mut finalized = vec![false; count];
    bottleneck[start] = 0.0;

    for _ in 0..count {
        let Some(current) = (0..count)
            .filter(|&index| !finalized[index])
            .min_by(|&a, &b| bottleneck[a].total_cmp(&bottleneck[b]))
        else {
            break;
        };
        if current == destination {
            break;
        }
        finalized[current] = true;

        let from = universe.systems[current].position;
        for other in 0..count {
            if finalized[other] {
                continue;
            }
            let hop = from.distance_to(&universe.systems[other].position);
            let candidate = bottleneck[current].max(hop);
            if candidate < bottleneck[other] {
                bottleneck[other] = candidate;
            }
        }
    }

    Ok(bottleneck[destination])
}
