use std::collections::BTreeSet;

use approx::assert_abs_diff_eq;
use starfield_lib::alignment::AnchorPair;
use starfield_lib::{
    AlignmentConfig, AnchorMatching, CatalogId, ConnectionId, CreatorResult, Graph,
    InfoQuality, Position, RealStar, RealUniverse, System, Universe, UniverseCreator,
};

fn star(id: CatalogId, x: f64, y: f64, z: f64) -> RealStar {
    RealStar {
        id,
        coordinates: Position::new(x, y, z),
    }
}

#[test]
fn single_anchor_converges_to_translation() {
    let real = RealUniverse::new(vec![star(CatalogId::hip(71683), 0.0, 0.0, 0.0)]);
    let fiction = Universe::new(vec![System::new(Position::new(5.0, 5.0, 5.0), "Alpha Centauri")]);
    let config = AlignmentConfig {
        max_iterations: 20_000,
        tolerance: 1e-8,
        evaluations_per_step: 500,
        scale_bounds: [0.5, 2.0],
        anchor_matching: AnchorMatching::Explicit {
            pairs: vec![AnchorPair {
                catalog_id: "HIP 71683".to_string(),
                system: "Alpha Centauri".to_string(),
                weight: 1.0,
            }],
        },
        ..AlignmentConfig::default()
    };

    let mut creator = UniverseCreator::new(real, &fiction, config).expect("anchors resolve");
    let universe = creator.run_to_completion();

    assert!(creator.best_cost() <= 1e-8, "cost {}", creator.best_cost());
    assert!(creator.iteration() < 20_000, "should stop on tolerance");

    let params = creator.best_params().expect("search evaluated candidates");
    for component in params.translation {
        assert_abs_diff_eq!(component, 5.0, epsilon = 1e-3);
    }

    assert_eq!(universe.len(), 1);
    let system = &universe.systems[0];
    assert_eq!(system.name(), "Alpha Centauri");
    assert_eq!(system.info_quality(), InfoQuality::Confirmed);
    assert_abs_diff_eq!(system.position().x, 5.0, epsilon = 1e-3);
}

#[test]
fn recovers_axis_scale_and_translation() {
    let points = [
        (8.0, 0.0, 0.0),
        (-8.0, 0.0, 0.0),
        (0.0, 8.0, 0.0),
        (0.0, -8.0, 0.0),
        (0.0, 0.0, 8.0),
        (0.0, 0.0, -8.0),
    ];
    let scale = [2.0, 1.5, 0.75];
    let translation = [10.0, -5.0, 3.0];

    let real = RealUniverse::new(
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| star(CatalogId::hip(i as u32 + 1), x, y, z))
            .collect(),
    );
    let fiction = Universe::new(
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| {
                System::new(
                    Position::new(
                        x * scale[0] + translation[0],
                        y * scale[1] + translation[1],
                        z * scale[2] + translation[2],
                    ),
                    format!("HIP {}", i + 1),
                )
            })
            .collect(),
    );
    let config = AlignmentConfig {
        max_iterations: 60_000,
        tolerance: 1e-10,
        rotation_bounds: [0.0, 0.0],
        scale_bounds: [0.5, 3.5],
        translation_bounds: Some([-12.0, 12.0]),
        seed: 17,
        ..AlignmentConfig::default()
    };

    let mut creator = UniverseCreator::new(real, &fiction, config).expect("anchors resolve");
    let universe = creator.run_to_completion();

    assert!(creator.best_cost() < 1e-6, "cost {}", creator.best_cost());
    let params = creator.best_params().unwrap();
    for axis in 0..3 {
        assert_abs_diff_eq!(params.scale[axis], scale[axis], epsilon = 1e-2);
        assert_abs_diff_eq!(params.translation[axis], translation[axis], epsilon = 1e-2);
    }
    for (built, target) in universe.systems.iter().zip(&fiction.systems) {
        assert_eq!(built.name(), target.name());
        assert!(built.position().distance_to(&target.position()) < 1e-2);
    }
}

#[test]
fn searching_reports_non_increasing_cost_until_cap() {
    let real = RealUniverse::new(vec![
        star(CatalogId::hip(1), 0.0, 0.0, 0.0),
        star(CatalogId::gliese("2"), 3.0, 1.0, 0.0),
        star(CatalogId::hip(3), -1.0, 4.0, 2.0),
    ]);
    let fiction = Universe::new(vec![
        System::new(Position::new(1.0, 2.0, 3.0), "HIP 1"),
        System::new(Position::new(-2.0, 6.0, 1.0), "Gliese 2"),
        System::new(Position::new(0.5, -3.0, 7.0), "HIP 3"),
    ]);
    let config = AlignmentConfig {
        max_iterations: 1_000,
        evaluations_per_step: 100,
        tolerance: 0.0,
        ..AlignmentConfig::default()
    };

    let mut creator = UniverseCreator::new(real, &fiction, config).expect("anchors resolve");
    let mut previous = f64::INFINITY;
    let mut calls = 0;
    let universe = loop {
        calls += 1;
        match creator.get() {
            CreatorResult::Searching {
                iteration,
                best_cost,
            } => {
                assert_eq!(iteration, calls * 100);
                assert!(best_cost <= previous);
                previous = best_cost;
            }
            CreatorResult::Finished(universe) => break universe,
        }
    };

    assert_eq!(calls, 10);
    assert_eq!(creator.iteration(), 1_000);
    assert!(creator.best_cost() <= previous);
    assert_eq!(universe.len(), 3);
    assert!(creator
        .bounds()
        .contains(&creator.best_params().unwrap().to_vector()));
}

#[test]
fn aligned_universe_rebuilds_identical_graph() {
    let catalog = [
        (CatalogId::hip(10), 0.0, 0.0, 0.0),
        (CatalogId::hip(11), 1.0, 0.0, 0.0),
        (CatalogId::gliese("12"), 1.0, 2.0, 0.0),
        (CatalogId::hip(13), 4.0, 2.0, 0.0),
        (CatalogId::gliese("14"), 4.0, 2.0, 2.0),
    ];
    let offset = 5.0;
    let real = RealUniverse::new(
        catalog
            .iter()
            .map(|(id, x, y, z)| star(id.clone(), *x, *y, *z))
            .collect(),
    );
    let literal = Universe::new(
        catalog
            .iter()
            .map(|(id, x, y, z)| {
                System::new(
                    Position::new(x + offset, y + offset, z + offset),
                    id.display(),
                )
            })
            .collect(),
    );
    // Only three of the five stars are known anchors.
    let fiction = Universe::new(literal.systems[..3].to_vec());

    let config = AlignmentConfig {
        max_iterations: 20_000,
        tolerance: 1e-10,
        rotation_bounds: [0.0, 0.0],
        scale_bounds: [1.0, 1.0],
        ..AlignmentConfig::default()
    };
    let mut creator = UniverseCreator::new(real, &fiction, config).expect("anchors resolve");
    let aligned = creator.run_to_completion();

    assert_eq!(aligned.systems[3].info_quality(), InfoQuality::Speculation);
    assert_eq!(aligned.systems[3].name(), "HIP 13");

    let edges = |universe: &Universe| -> BTreeSet<ConnectionId> {
        Graph::new(universe, 2.5)
            .expect("graph builds")
            .connections()
            .map(|connection| connection.id())
            .collect()
    };
    assert_eq!(edges(&aligned), edges(&literal));
    assert!(!edges(&literal).is_empty());
}

#[test]
fn catalog_without_anchors_is_rejected() {
    let real = RealUniverse::new(vec![star(CatalogId::hip(1), 0.0, 0.0, 0.0)]);
    let fiction = Universe::new(vec![System::new(Position::default(), "Sol")]);
    let err = UniverseCreator::new(real, &fiction, AlignmentConfig::default()).unwrap_err();
    assert!(err.to_string().contains("no anchors"));
}
