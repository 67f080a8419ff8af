use std::collections::HashMap;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};
use crate::spatial::{ClosestQuery, SpatialIndex};
use crate::universe::{Position, Universe};

/// Key of an undirected connection.
///
/// The two node indices are sorted and packed with the triangular-number
/// pairing `hi * (hi - 1) / 2 + lo`, so `(a, b)` and `(b, a)` share a key and
/// no two distinct pairs collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Key for the unordered pair `{a, b}`.
    ///
    /// Callers must not pass `a == b`; such a pair can never be stored.
    pub fn new(a: usize, b: usize) -> Self {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (lo, hi) = (lo as u64, hi as u64);
        Self(hi * hi.saturating_sub(1) / 2 + lo)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Undirected weighted edge between two nodes.
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    pub node_index0: usize,
    pub node_index1: usize,
    pub weight: f64,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        ConnectionId::new(self.node_index0, self.node_index1)
    }

    pub fn contains_node_index(&self, node_index: usize) -> bool {
        self.node_index0 == node_index || self.node_index1 == node_index
    }

    /// The endpoint opposite `node_index`, if `node_index` is an endpoint.
    pub fn other(&self, node_index: usize) -> Option<usize> {
        if self.node_index0 == node_index {
            Some(self.node_index1)
        } else if self.node_index1 == node_index {
            Some(self.node_index0)
        } else {
            None
        }
    }
}

/// Connections compare equal regardless of endpoint order.
impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.weight == other.weight
    }
}

/// Graph vertex, one per system of the source universe.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub position: Position,
    pub connections: Vec<ConnectionId>,
}

/// Weight of a direct connection as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborInfo {
    pub distance: f64,
    pub other_index: usize,
}

/// Jump-range limited connectivity graph.
///
/// The graph is immutable after construction apart from explicit
/// [`Graph::add_connection`] overrides. The spatial index behind the
/// proximity queries is built on first use.
#[derive(Debug)]
pub struct Graph {
    jump_range: f64,
    nodes: Vec<Node>,
    connections: HashMap<ConnectionId, Connection>,
    spatial: OnceCell<SpatialIndex>,
}

impl Graph {
    /// Build a graph connecting every pair of systems no further apart than
    /// `jump_range`, weighted by their Euclidean distance.
    pub fn new(universe: &Universe, jump_range: f64) -> Result<Self> {
        if !jump_range.is_finite() || jump_range < 0.0 {
            return Err(Error::InvalidJumpRange { jump_range });
        }

        let mut nodes: Vec<Node> = universe
            .systems
            .iter()
            .map(|system| Node {
                name: system.name().to_string(),
                position: system.position(),
                connections: Vec::new(),
            })
            .collect();

        let mut connections = HashMap::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let distance = nodes[i].position.distance_to(&nodes[j].position);
                if distance > jump_range {
                    continue;
                }
                insert_connection(
                    &mut nodes,
                    &mut connections,
                    Connection {
                        node_index0: i,
                        node_index1: j,
                        weight: distance,
                    },
                );
            }
        }

        debug!(
            node_count = nodes.len(),
            edge_count = connections.len(),
            jump_range,
            "built jump graph"
        );

        Ok(Self {
            jump_range,
            nodes,
            connections,
            spatial: OnceCell::new(),
        })
    }

    pub fn jump_range(&self) -> f64 {
        self.jump_range
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Result<&Node> {
        self.nodes.get(index).ok_or(Error::NodeIndexOutOfRange {
            index,
            node_count: self.nodes.len(),
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Iterate over every stored connection in unspecified order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Index of the first node named `name`.
    pub fn node_index_by_name(&self, name: &str) -> Result<usize> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .ok_or_else(|| Error::UnknownSystem {
                name: name.to_string(),
                suggestions: crate::universe::fuzzy_name_matches(
                    self.nodes.iter().map(|node| node.name.as_str()),
                    name,
                    3,
                ),
            })
    }

    /// Insert or override a connection between two named systems.
    ///
    /// The jump range is ignored, which allows declaring known routes that
    /// exceed straight-line limits.
    pub fn add_connection(&mut self, name_a: &str, name_b: &str, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::NegativeWeight {
                name_a: name_a.to_string(),
                name_b: name_b.to_string(),
                weight,
            });
        }

        let a = self.node_index_by_name(name_a)?;
        let b = self.node_index_by_name(name_b)?;
        if a == b {
            return Err(Error::SelfConnection {
                name: name_a.to_string(),
            });
        }

        insert_connection(
            &mut self.nodes,
            &mut self.connections,
            Connection {
                node_index0: a,
                node_index1: b,
                weight,
            },
        );
        debug!(from = name_a, to = name_b, weight, "added manual connection");
        Ok(())
    }

    /// True iff `i` and `j` share a direct connection.
    pub fn are_neighbors(&self, node_index0: usize, node_index1: usize) -> bool {
        node_index0 != node_index1
            && self
                .connections
                .contains_key(&ConnectionId::new(node_index0, node_index1))
    }

    /// Weight of the direct connection between two nodes.
    pub fn get_neighbor_info(&self, node_index0: usize, node_index1: usize) -> Result<NeighborInfo> {
        if node_index0 == node_index1 {
            return Err(Error::NotNeighbors {
                node_index0,
                node_index1,
            });
        }
        self.connections
            .get(&ConnectionId::new(node_index0, node_index1))
            .map(|connection| NeighborInfo {
                distance: connection.weight,
                other_index: node_index1,
            })
            .ok_or(Error::NotNeighbors {
                node_index0,
                node_index1,
            })
    }

    /// Direct neighbours of a node with their connection weights.
    pub fn neighbors(&self, node_index: usize) -> Result<Vec<NeighborInfo>> {
        let node = self.node(node_index)?;
        Ok(node
            .connections
            .iter()
            .filter_map(|id| self.connections.get(id))
            .filter_map(|connection| {
                connection
                    .other(node_index)
                    .map(|other_index| NeighborInfo {
                        distance: connection.weight,
                        other_index,
                    })
            })
            .collect())
    }

    /// Nodes closest to the named system by straight-line distance, using the
    /// default cutoff.
    pub fn get_closest(&self, system: &str) -> Result<Vec<usize>> {
        self.get_closest_with(system, &ClosestQuery::default())
    }

    /// Nodes closest to the named system by straight-line distance.
    ///
    /// The named system itself is never part of the result.
    pub fn get_closest_with(&self, system: &str, query: &ClosestQuery) -> Result<Vec<usize>> {
        let origin = self.node_index_by_name(system)?;
        let position = self.nodes[origin].position;
        Ok(self
            .spatial()
            .closest(position, Some(origin), query)
            .into_iter()
            .map(|(index, _)| index)
            .collect())
    }

    /// Nodes within `radius` of the named system, closest first.
    pub fn systems_within(&self, system: &str, radius: f64) -> Result<Vec<(usize, f64)>> {
        let origin = self.node_index_by_name(system)?;
        let position = self.nodes[origin].position;
        Ok(self.spatial().within_radius(position, radius, Some(origin)))
    }
}

impl Graph {
    fn spatial(&self) -> &SpatialIndex {
        self.spatial
            .get_or_init(|| SpatialIndex::build(self.nodes.iter().map(|node| &node.position)))
    }
}

fn insert_connection(
    nodes: &mut [Node],
    connections: &mut HashMap<ConnectionId, Connection>,
    connection: Connection,
) {
    let id = connection.id();
    if connections.insert(id, connection).is_none() {
        nodes[connection.node_index0].connections.push(id);
        nodes[connection.node_index1].connections.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::System;

    fn universe(points: &[(f64, f64, f64)]) -> Universe {
        Universe::new(
            points
                .iter()
                .enumerate()
                .map(|(i, &(x, y, z))| System::new(Position::new(x, y, z), format!("S{i}")))
                .collect(),
        )
    }

    #[test]
    fn connection_id_is_order_independent_and_unique() {
        assert_eq!(ConnectionId::new(3, 7), ConnectionId::new(7, 3));

        let mut seen = std::collections::HashSet::new();
        for hi in 1..40 {
            for lo in 0..hi {
                assert!(seen.insert(ConnectionId::new(lo, hi)), "collision at {lo},{hi}");
            }
        }
    }

    #[test]
    fn connection_equality_ignores_direction() {
        let a = Connection {
            node_index0: 1,
            node_index1: 4,
            weight: 2.5,
        };
        let b = Connection {
            node_index0: 4,
            node_index1: 1,
            weight: 2.5,
        };
        assert_eq!(a, b);
        assert_eq!(a.other(4), Some(1));
        assert_eq!(a.other(2), None);
        assert!(a.contains_node_index(1));
    }

    #[test]
    fn edges_only_within_jump_range() {
        let universe = universe(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let graph = Graph::new(&universe, 2.0).unwrap();

        assert_eq!(graph.connection_count(), 1);
        assert!(graph.are_neighbors(0, 1));
        assert!(graph.are_neighbors(1, 0));
        assert!(!graph.are_neighbors(1, 2));
        assert!(!graph.are_neighbors(0, 0));
    }

    #[test]
    fn edge_at_exact_jump_range_is_kept() {
        let universe = universe(&[(0.0, 0.0, 0.0), (3.0, 4.0, 0.0)]);
        let graph = Graph::new(&universe, 5.0).unwrap();
        assert!(graph.are_neighbors(0, 1));
    }

    #[test]
    fn rejects_invalid_jump_range() {
        let universe = universe(&[(0.0, 0.0, 0.0)]);
        assert!(matches!(
            Graph::new(&universe, -1.0),
            Err(Error::InvalidJumpRange { .. })
        ));
        assert!(matches!(
            Graph::new(&universe, f64::NAN),
            Err(Error::InvalidJumpRange { .. })
        ));
    }

    #[test]
    fn add_connection_overrides_without_duplicates() {
        let universe = universe(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let mut graph = Graph::new(&universe, 2.0).unwrap();

        graph.add_connection("S0", "S2", 4.0).unwrap();
        graph.add_connection("S2", "S0", 3.0).unwrap();

        assert_eq!(graph.connection_count(), 2);
        assert_eq!(graph.get_neighbor_info(0, 2).unwrap().distance, 3.0);
        assert_eq!(graph.nodes()[0].connections.len(), 2);
        assert_eq!(graph.nodes()[2].connections.len(), 1);
    }

    #[test]
    fn add_connection_validates_input() {
        let universe = universe(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]);
        let mut graph = Graph::new(&universe, 2.0).unwrap();

        assert!(matches!(
            graph.add_connection("S0", "S1", -1.0),
            Err(Error::NegativeWeight { .. })
        ));
        assert!(matches!(
            graph.add_connection("S0", "S0", 1.0),
            Err(Error::SelfConnection { .. })
        ));
        assert!(matches!(
            graph.add_connection("S0", "Vega", 1.0),
            Err(Error::UnknownSystem { .. })
        ));
    }

    #[test]
    fn neighbor_info_requires_adjacency() {
        let universe = universe(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let graph = Graph::new(&universe, 2.0).unwrap();

        let info = graph.get_neighbor_info(1, 0).unwrap();
        assert_eq!(info.other_index, 0);
        assert_eq!(info.distance, 1.0);

        assert!(matches!(
            graph.get_neighbor_info(0, 2),
            Err(Error::NotNeighbors { .. })
        ));
    }

    #[test]
    fn neighbors_lists_adjacent_nodes() {
        let universe = universe(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let graph = Graph::new(&universe, 1.2).unwrap();

        let mut others: Vec<usize> = graph
            .neighbors(0)
            .unwrap()
            .into_iter()
            .map(|info| info.other_index)
            .collect();
        others.sort_unstable();
        assert_eq!(others, vec![1, 2]);
        assert!(graph.neighbors(9).is_err());
    }
}
