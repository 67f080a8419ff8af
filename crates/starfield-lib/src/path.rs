use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Connection, Graph};

/// Best known distance from a fixed source and the predecessor on that path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortestPath {
    /// Accumulated weight from the source; [`ShortestPath::NO_DISTANCE`] while
    /// unreached.
    pub distance: f64,
    /// Previous node on the best path; `None` for the source and unreached
    /// nodes.
    pub previous: Option<usize>,
}

impl ShortestPath {
    /// Sentinel distance marking a node as unreached.
    pub const NO_DISTANCE: f64 = f64::MAX;

    pub fn is_reached(&self) -> bool {
        self.distance != Self::NO_DISTANCE
    }
}

impl Default for ShortestPath {
    fn default() -> Self {
        Self {
            distance: Self::NO_DISTANCE,
            previous: None,
        }
    }
}

/// Single-source Dijkstra result, one entry per graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathTree {
    source: usize,
    entries: Vec<ShortestPath>,
}

impl ShortestPathTree {
    /// Tree with every node unreached except `source`.
    pub fn new(source: usize, node_count: usize) -> Self {
        let mut entries = vec![ShortestPath::default(); node_count];
        if let Some(entry) = entries.get_mut(source) {
            entry.distance = 0.0;
        }
        Self { source, entries }
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn entries(&self) -> &[ShortestPath] {
        &self.entries
    }

    pub fn entry(&self, node_index: usize) -> Option<&ShortestPath> {
        self.entries.get(node_index)
    }

    /// Distance from the source, or [`ShortestPath::NO_DISTANCE`] when
    /// unreached or out of range.
    pub fn distance_from_source(&self, node_index: usize) -> f64 {
        self.entries
            .get(node_index)
            .map_or(ShortestPath::NO_DISTANCE, |entry| entry.distance)
    }

    pub fn is_reachable(&self, node_index: usize) -> bool {
        self.entries
            .get(node_index)
            .is_some_and(ShortestPath::is_reached)
    }

    /// Walk predecessors back from `destination` to the source.
    pub fn path_to(&self, destination: usize) -> Option<JumpPath> {
        if !self.is_reachable(destination) {
            return None;
        }

        let mut stops = vec![destination];
        let mut current = destination;
        while let Some(previous) = self.entries[current].previous {
            stops.push(previous);
            current = previous;
        }
        stops.reverse();
        Some(JumpPath { stops })
    }
}

/// Ordered route of node indices, start and destination inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JumpPath {
    pub stops: Vec<usize>,
}

impl JumpPath {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Number of jumps taken.
    pub fn hop_count(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<usize> {
        self.stops.first().copied()
    }

    pub fn destination(&self) -> Option<usize> {
        self.stops.last().copied()
    }

    /// Whether `connection` is travelled by this path in either direction.
    pub fn contains_connection(&self, connection: &Connection) -> bool {
        self.stops.windows(2).any(|pair| {
            (pair[0] == connection.node_index0 && pair[1] == connection.node_index1)
                || (pair[0] == connection.node_index1 && pair[1] == connection.node_index0)
        })
    }

    /// Sum of connection weights along the path.
    pub fn total_distance(&self, graph: &Graph) -> Result<f64> {
        self.stops
            .windows(2)
            .map(|pair| graph.get_neighbor_info(pair[0], pair[1]).map(|info| info.distance))
            .sum()
    }
}

impl Graph {
    /// Run Dijkstra's algorithm from `source_node_index` over the whole graph.
    pub fn get_dijkstra(&self, source_node_index: usize) -> Result<ShortestPathTree> {
        let node_count = self.node_count();
        if source_node_index >= node_count {
            return Err(Error::NodeIndexOutOfRange {
                index: source_node_index,
                node_count,
            });
        }

        let mut tree = ShortestPathTree::new(source_node_index, node_count);
        let mut visited = vec![false; node_count];
        let mut frontier = Frontier::new();
        frontier.push(Reverse((Distance(0.0), source_node_index)));

        while let Some(Reverse((_, current))) = frontier.pop() {
            if visited[current] {
                continue;
            }
            visited[current] = true;
            let current_distance = tree.entries[current].distance;

            for id in &self.nodes()[current].connections {
                let Some(connection) = self.connection(*id) else {
                    continue;
                };
                let Some(next) = connection.other(current) else {
                    continue;
                };
                if visited[next] {
                    continue;
                }

                let next_distance = current_distance + connection.weight;
                if next_distance < tree.entries[next].distance {
                    tree.entries[next] = ShortestPath {
                        distance: next_distance,
                        previous: Some(current),
                    };
                    frontier.push(Reverse((Distance(next_distance), next)));
                }
            }
        }

        Ok(tree)
    }

    /// Shortest jump path between two named systems.
    ///
    /// Returns `None` when either name is unknown or no path exists.
    pub fn get_jump_path(&self, start: &str, destination: &str) -> Option<JumpPath> {
        let start_index = self.node_index_by_name(start).ok()?;
        let destination_index = self.node_index_by_name(destination).ok()?;
        let path = self
            .jump_path_between(start_index, destination_index)
            .ok()
            .flatten();
        if path.is_none() {
            debug!(start, destination, "no jump path found");
        }
        path
    }

    /// Shortest jump path between two node indices.
    pub fn jump_path_between(&self, start: usize, destination: usize) -> Result<Option<JumpPath>> {
        if destination >= self.node_count() {
            return Err(Error::NodeIndexOutOfRange {
                index: destination,
                node_count: self.node_count(),
            });
        }
        let tree = self.get_dijkstra(start)?;
        Ok(tree.path_to(destination))
    }
}

/// Tentative distance in the Dijkstra frontier, totally ordered.
#[derive(Clone, Copy, Debug)]
struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for Distance {}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Frontier entry; the max-heap pops the smallest distance, then the smallest
/// node index.
type Frontier = BinaryHeap<Reverse<(Distance, usize)>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::{Position, System, Universe};

    fn chain(n: usize) -> Universe {
        Universe::new(
            (0..n)
                .map(|i| System::new(Position::new(i as f64, 0.0, 0.0), format!("S{i}")))
                .collect(),
        )
    }

    #[test]
    fn fresh_tree_marks_only_source_reached() {
        let tree = ShortestPathTree::new(1, 3);
        assert_eq!(tree.distance_from_source(1), 0.0);
        assert!(tree.is_reachable(1));
        assert!(!tree.is_reachable(0));
        assert_eq!(tree.distance_from_source(0), ShortestPath::NO_DISTANCE);
        assert!(!tree.is_reachable(7));
    }

    #[test]
    fn dijkstra_prefers_lighter_detour() {
        let universe = chain(3);
        let mut graph = Graph::new(&universe, 1.0).unwrap();
        graph.add_connection("S0", "S2", 5.0).unwrap();

        let tree = graph.get_dijkstra(0).unwrap();
        assert_eq!(tree.distance_from_source(2), 2.0);
        assert_eq!(tree.entry(2).unwrap().previous, Some(1));

        graph.add_connection("S0", "S2", 1.5).unwrap();
        let tree = graph.get_dijkstra(0).unwrap();
        assert_eq!(tree.distance_from_source(2), 1.5);
        assert_eq!(tree.entry(2).unwrap().previous, Some(0));
    }

    #[test]
    fn frontier_pops_nearest_then_lowest_index() {
        let mut frontier = Frontier::new();
        for (distance, node) in [(2.0, 0), (1.0, 5), (1.0, 3), (0.5, 9)] {
            frontier.push(Reverse((Distance(distance), node)));
        }
        let order: Vec<usize> = std::iter::from_fn(|| frontier.pop())
            .map(|Reverse((_, node))| node)
            .collect();
        assert_eq!(order, vec![9, 3, 5, 0]);
    }

    #[test]
    fn equal_cost_routes_settle_through_lower_index() {
        let universe = Universe::new(
            (0..4)
                .map(|i| System::new(Position::new(i as f64 * 10.0, 0.0, 0.0), format!("S{i}")))
                .collect(),
        );
        let mut graph = Graph::new(&universe, 0.0).unwrap();
        for (a, b) in [("S0", "S2"), ("S0", "S1"), ("S2", "S3"), ("S1", "S3")] {
            graph.add_connection(a, b, 1.0).unwrap();
        }

        let tree = graph.get_dijkstra(0).unwrap();
        assert_eq!(tree.distance_from_source(3), 2.0);
        assert_eq!(tree.entry(3).unwrap().previous, Some(1));
    }

    #[test]
    fn dijkstra_rejects_out_of_range_source() {
        let graph = Graph::new(&chain(2), 1.0).unwrap();
        assert!(matches!(
            graph.get_dijkstra(2),
            Err(Error::NodeIndexOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn jump_path_to_self_is_single_stop() {
        let graph = Graph::new(&chain(2), 1.0).unwrap();
        let path = graph.get_jump_path("S1", "S1").unwrap();
        assert_eq!(path.stops, vec![1]);
        assert_eq!(path.hop_count(), 0);
        assert_eq!(path.total_distance(&graph).unwrap(), 0.0);
    }

    #[test]
    fn jump_path_unknown_name_is_none() {
        let graph = Graph::new(&chain(2), 1.0).unwrap();
        assert!(graph.get_jump_path("S0", "Vega").is_none());
        assert!(graph.get_jump_path("Vega", "S0").is_none());
    }

    #[test]
    fn contains_connection_checks_consecutive_stops_both_ways() {
        let path = JumpPath {
            stops: vec![0, 1, 2],
        };
        let forward = Connection {
            node_index0: 1,
            node_index1: 2,
            weight: 1.0,
        };
        let backward = Connection {
            node_index0: 1,
            node_index1: 0,
            weight: 1.0,
        };
        let skipping = Connection {
            node_index0: 0,
            node_index1: 2,
            weight: 2.0,
        };
        assert!(path.contains_connection(&forward));
        assert!(path.contains_connection(&backward));
        assert!(!path.contains_connection(&skipping));
    }
}
