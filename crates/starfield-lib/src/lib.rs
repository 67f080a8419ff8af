//! Starfield navigator library entry points.
//!
//! This crate builds jump-range limited graphs over star systems, answers
//! shortest-path and proximity queries over them, and constructs the
//! fictional universe itself by aligning a real star catalog onto a few known
//! anchor systems. Higher-level consumers (the CLI) should only depend on the
//! items exported here instead of reimplementing behavior.
//!

pub mod alignment;
pub mod catalog;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod output;
pub mod path;
pub mod spatial;
pub mod universe;

pub use alignment::{
    AlignmentConfig, AlignmentParams, AnchorMatching, CostFormula, CreatorResult,
    EvolutionaryOptimizer, GlobalOptimizer, ParameterBounds, UniverseCreator,
};
pub use catalog::{CatalogId, CatalogKind, RealStar, RealUniverse};
pub use dataset::{load_anchors, load_real_universe, load_universe, write_universe};
pub use error::{Error, Result};
pub use graph::{Connection, ConnectionId, Graph, NeighborInfo, Node};
pub use output::{RouteStep, RouteSummary};
pub use path::{JumpPath, ShortestPath, ShortestPathTree};
pub use spatial::{ClosestQuery, DEFAULT_CLOSEST_LIMIT};
pub use universe::{min_jump_range, InfoQuality, Position, System, Universe};
