//! CSV datasets for universes, real catalogs and anchor lists.
//!
//! | File | Header |
//! |---|---|
//! | universe | `name,x,y,z[,quality]` |
//! | real catalog | `catalog_id,x,y,z` |
//! | anchors | `catalog_id,system[,weight]` |

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alignment::AnchorPair;
use crate::catalog::{CatalogId, RealStar, RealUniverse};
use crate::error::{Error, Result};
use crate::universe::{InfoQuality, Position, System, Universe};

#[derive(Debug, Serialize, Deserialize)]
struct UniverseRow {
    name: String,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    quality: String,
}

#[derive(Debug, Deserialize)]
struct RealRow {
    catalog_id: String,
    x: f64,
    y: f64,
    z: f64,
}

/// Load a fictional universe from a CSV file.
pub fn load_universe(path: &Path) -> Result<Universe> {
    let universe = universe_from_reader(File::open(path)?)?;
    debug!(path = %path.display(), systems = universe.len(), "loaded universe");
    Ok(universe)
}

/// Parse a fictional universe from CSV.
pub fn universe_from_reader<R: Read>(reader: R) -> Result<Universe> {
    let rows: Vec<UniverseRow> = read_rows(reader, "universe")?;
    let systems = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let quality = InfoQuality::from_label(&row.quality).ok_or_else(|| {
                Error::DatasetValidation {
                    message: format!(
                        "universe row {}: unknown quality '{}'",
                        index + 2,
                        row.quality
                    ),
                }
            })?;
            let position = finite_position("universe", index, row.x, row.y, row.z)?;
            Ok(System::new(position, row.name).with_quality(quality))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Universe::new(systems))
}

/// Load a real star catalog from a CSV file.
pub fn load_real_universe(path: &Path) -> Result<RealUniverse> {
    let catalog = real_universe_from_reader(File::open(path)?)?;
    debug!(path = %path.display(), stars = catalog.len(), "loaded real catalog");
    Ok(catalog)
}

/// Parse a real star catalog from CSV.
pub fn real_universe_from_reader<R: Read>(reader: R) -> Result<RealUniverse> {
    let rows: Vec<RealRow> = read_rows(reader, "catalog")?;
    let stars = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let id = row.catalog_id.parse::<CatalogId>()?;
            let coordinates = finite_position("catalog", index, row.x, row.y, row.z)?;
            Ok(RealStar { id, coordinates })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RealUniverse::new(stars))
}

/// Load explicit anchor pairs from a CSV file.
pub fn load_anchors(path: &Path) -> Result<Vec<AnchorPair>> {
    anchors_from_reader(File::open(path)?)
}

/// Parse explicit anchor pairs from CSV; `weight` defaults to 1.
pub fn anchors_from_reader<R: Read>(reader: R) -> Result<Vec<AnchorPair>> {
    read_rows(reader, "anchors")
}

/// Write `universe` in the format read by [`universe_from_reader`].
pub fn write_universe<W: Write>(universe: &Universe, writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    for system in &universe.systems {
        let position = system.position();
        csv_writer.serialize(UniverseRow {
            name: system.name().to_string(),
            x: position.x,
            y: position.y,
            z: position.z,
            quality: system.info_quality().label().to_string(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R, kind: &str) -> Result<Vec<T>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    csv_reader
        .deserialize()
        .enumerate()
        .map(|(index, record)| {
            record.map_err(|err| Error::DatasetValidation {
                message: format!("{kind} row {}: {err}", index + 2),
            })
        })
        .collect()
}

fn finite_position(kind: &str, index: usize, x: f64, y: f64, z: f64) -> Result<Position> {
    if x.is_finite() && y.is_finite() && z.is_finite() {
        Ok(Position::new(x, y, z))
    } else {
        Err(Error::DatasetValidation {
            message: format!("{kind} row {}: coordinates must be finite", index + 2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_quality_column_is_optional() {
        let csv = "name,x,y,z\nSol,0,0,0\nAlpha Centauri,1.5,0,-2\n";
        let universe = universe_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(universe.len(), 2);
        assert_eq!(universe.systems[1].position(), Position::new(1.5, 0.0, -2.0));
        assert_eq!(universe.systems[1].info_quality(), InfoQuality::Unknown);
    }

    #[test]
    fn universe_rejects_bad_rows() {
        let csv = "name,x,y,z,quality\nSol,0,0,0,confirmed\nVega,abc,0,0,\n";
        let err = universe_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("universe row 3"), "{err}");

        let csv = "name,x,y,z,quality\nSol,0,0,0,rumour\n";
        let err = universe_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unknown quality 'rumour'"), "{err}");
    }

    #[test]
    fn catalog_parses_identifiers() {
        let csv = "catalog_id,x,y,z\nHIP 71683,-0.5,-0.4,-1.2\nGJ 551,1,2,3\n";
        let catalog = real_universe_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.stars[0].id, CatalogId::hip(71683));
        assert_eq!(catalog.stars[1].id.display(), "Gliese 551");

        let csv = "catalog_id,x,y,z\nTycho 1,0,0,0\n";
        assert!(matches!(
            real_universe_from_reader(csv.as_bytes()),
            Err(Error::InvalidCatalogId { .. })
        ));
    }

    #[test]
    fn anchors_default_weight() {
        let csv = "catalog_id,system\nHIP 71683,Alpha Centauri\n";
        let anchors = anchors_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].system, "Alpha Centauri");
        assert_eq!(anchors[0].weight, 1.0);
    }

    #[test]
    fn written_universe_reads_back() {
        let universe = Universe::new(vec![
            System::new(Position::new(0.0, 1.0, 2.0), "Sol").with_quality(InfoQuality::Confirmed),
            System::new(Position::new(-3.5, 0.25, 8.0), "Gliese 9")
                .with_quality(InfoQuality::Speculation),
        ]);
        let mut buffer = Vec::new();
        write_universe(&universe, &mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("name,x,y,z,quality\n"));
        assert_eq!(universe_from_reader(buffer.as_slice()).unwrap(), universe);
    }
}
