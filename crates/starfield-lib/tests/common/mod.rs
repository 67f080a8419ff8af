//! Shared fixtures for integration tests.

use starfield_lib::{Position, System, Universe};

/// Universe with one system per point, named `S0`, `S1`, ...
pub fn universe_from_points(points: &[(f64, f64, f64)]) -> Universe {
    Universe::new(
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| System::new(Position::new(x, y, z), format!("S{i}")))
            .collect(),
    )
}

/// Small hand-placed neighbourhood with two disconnected clusters.
#[allow(dead_code)]
pub fn neighbourhood() -> Universe {
    Universe::new(vec![
        System::new(Position::new(0.0, 0.0, 0.0), "Sol"),
        System::new(Position::new(1.3, 0.4, -0.8), "Alpha Centauri"),
        System::new(Position::new(2.9, 1.1, -0.2), "Porrima"),
        System::new(Position::new(2.0, 2.5, 1.0), "Cheyenne"),
        System::new(Position::new(4.1, 2.2, 0.9), "Narion"),
        System::new(Position::new(3.3, 4.0, 2.2), "Volii"),
        System::new(Position::new(40.0, 40.0, 40.0), "Kryx"),
        System::new(Position::new(41.0, 40.5, 39.5), "Valo"),
    ])
}
