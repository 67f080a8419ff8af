//! Real-world star catalog.
//!
//! Stars are identified either by their Hipparcos number or by a Gliese
//! catalog code. The display string is rendered once when the identifier is
//! built so lookups and output never re-dispatch on the variant.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::universe::{fuzzy_name_matches, Position};

/// The two catalog identifier schemes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// Hipparcos catalog number.
    Hip(u32),
    /// Gliese (or Gliese-Jahreiss) catalog code, e.g. `551` or `412A`.
    Gliese(String),
}

/// Catalog identifier with a cached display string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogId {
    kind: CatalogKind,
    display: String,
}

impl CatalogId {
    pub fn new(kind: CatalogKind) -> Self {
        let display = match &kind {
            CatalogKind::Hip(number) => format!("HIP {number}"),
            CatalogKind::Gliese(code) => format!("Gliese {code}"),
        };
        Self { kind, display }
    }

    pub fn hip(number: u32) -> Self {
        Self::new(CatalogKind::Hip(number))
    }

    pub fn gliese(code: impl Into<String>) -> Self {
        Self::new(CatalogKind::Gliese(code.into()))
    }

    pub fn kind(&self) -> &CatalogKind {
        &self.kind
    }

    /// User-facing identifier, e.g. `HIP 71683`.
    pub fn display(&self) -> &str {
        &self.display
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl FromStr for CatalogId {
    type Err = Error;

    /// Accepts `HIP 123`, `HIP123`, `Gliese 551`, `Gl 551` and `GJ 551`,
    /// case-insensitively.
    fn from_str(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidCatalogId {
            value: value.to_string(),
        };
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(rest) = lower.strip_prefix("hip") {
            let number = rest.trim().parse::<u32>().map_err(|_| invalid())?;
            return Ok(Self::hip(number));
        }

        for prefix in ["gliese", "gj", "gl"] {
            if lower.starts_with(prefix) {
                let code = trimmed[prefix.len()..].trim();
                if code.is_empty() {
                    return Err(invalid());
                }
                return Ok(Self::gliese(code));
            }
        }

        Err(invalid())
    }
}

/// One entry of the real-world catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RealStar {
    pub id: CatalogId,
    /// Coordinates in the catalog's native frame and unit.
    pub coordinates: Position,
}

/// Ordered real star catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RealUniverse {
    pub stars: Vec<RealStar>,
}

impl RealUniverse {
    pub fn new(stars: Vec<RealStar>) -> Self {
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Index of the first star matching `id`.
    ///
    /// `id` may be the display string or any spelling [`CatalogId::from_str`]
    /// accepts.
    pub fn index_by_id(&self, id: &str) -> Result<usize> {
        let parsed = id.parse::<CatalogId>().ok();
        self.stars
            .iter()
            .position(|star| star.id.display() == id || parsed.as_ref() == Some(&star.id))
            .ok_or_else(|| {
                let suggestions =
                    fuzzy_name_matches(self.stars.iter().map(|star| star.id.display()), id, 1);
                Error::UnknownCatalogEntry {
                    id: match suggestions.first() {
                        Some(best) => format!("{id} (did you mean '{best}'?)"),
                        None => id.to_string(),
                    },
                }
            })
    }

    pub fn position_by_id(&self, id: &str) -> Result<Position> {
        self.index_by_id(id).map(|index| self.stars[index].coordinates)
    }

    /// Axis-aligned bounding box as `(min, max)`, or `None` when empty.
    pub fn extent(&self) -> Option<(Position, Position)> {
        extent_of(self.stars.iter().map(|star| star.coordinates))
    }
}

pub(crate) fn extent_of(mut positions: impl Iterator<Item = Position>) -> Option<(Position, Position)> {
    let first = positions.next()?;
    Some(positions.fold((first, first), |(min, max), p| {
        (
            Position::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Position::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        )
    }))
}
