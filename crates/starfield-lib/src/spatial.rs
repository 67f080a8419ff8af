//! KD-tree spatial index over graph nodes for proximity queries.
//!
//! Proximity is purely geometric: it ignores the jump range and the
//! connections of the graph, which makes it suitable for suggesting nearby
//! systems that may not be reachable at all.

use std::collections::HashMap;
use std::fmt;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

use crate::universe::Position;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Number of systems returned by [`ClosestQuery::default`].
pub const DEFAULT_CLOSEST_LIMIT: usize = 10;

/// Cutoff applied to closest-system queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosestQuery {
    /// Maximum number of systems to return; `None` returns every system.
    pub limit: Option<usize>,
}

impl ClosestQuery {
    /// Return at most `k` systems.
    pub fn nearest(k: usize) -> Self {
        Self { limit: Some(k) }
    }

    /// Return every other system, ordered by distance.
    pub fn all() -> Self {
        Self { limit: None }
    }
}

impl Default for ClosestQuery {
    fn default() -> Self {
        Self::nearest(DEFAULT_CLOSEST_LIMIT)
    }
}

/// Spatial index keyed by node index.
///
/// The tree stores each distinct position once and maps it to every node
/// sitting there, so any number of coincident systems fits in one bucket.
pub struct SpatialIndex {
    tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32>,
    sites: Vec<Vec<usize>>,
    len: usize,
}

impl SpatialIndex {
    /// Build an index over `positions`; item `i` is stored under index `i`.
    pub fn build<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Self {
        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        let mut site_by_key: HashMap<[u64; 3], usize> = HashMap::new();
        let mut sites: Vec<Vec<usize>> = Vec::new();
        let mut len = 0;

        for (index, position) in positions.into_iter().enumerate() {
            let site = *site_by_key.entry(site_key(position)).or_insert_with(|| {
                tree.add(&position.to_array(), sites.len());
                sites.push(Vec::new());
                sites.len() - 1
            });
            sites[site].push(index);
            len += 1;
        }

        Self { tree, sites, len }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nodes closest to `point`, skipping `exclude`.
    ///
    /// Returns `(index, distance)` pairs sorted by distance, ties broken by
    /// index.
    pub fn closest(
        &self,
        point: Position,
        exclude: Option<usize>,
        query: &ClosestQuery,
    ) -> Vec<(usize, f64)> {
        let wanted = query.limit.unwrap_or(self.len);
        if wanted == 0 || self.is_empty() {
            return Vec::new();
        }

        // Every site holds at least one node, so `wanted + 1` sites cover
        // `wanted` nodes even when the excluded node has a site of its own.
        let site_count = wanted.saturating_add(1).min(self.sites.len());
        let query_point = point.to_array();
        let cutoff = self
            .tree
            .nearest_n::<SquaredEuclidean>(&query_point, site_count)
            .into_iter()
            .map(|neighbor| neighbor.distance)
            .fold(0.0_f64, f64::max);

        // Sites tied with the farthest one must reach the index tie-break.
        let mut results = self.expand(
            self.tree
                .within_unsorted::<SquaredEuclidean>(&query_point, cutoff)
                .into_iter()
                .map(|neighbor| (neighbor.item, neighbor.distance)),
            exclude,
        );
        results.truncate(wanted);
        results
    }

    /// All nodes within `radius` of `point`, skipping `exclude`.
    pub fn within_radius(
        &self,
        point: Position,
        radius: f64,
        exclude: Option<usize>,
    ) -> Vec<(usize, f64)> {
        if radius < 0.0 || self.is_empty() {
            return Vec::new();
        }

        self.expand(
            self.tree
                .within_unsorted::<SquaredEuclidean>(&point.to_array(), radius * radius)
                .into_iter()
                .map(|neighbor| (neighbor.item, neighbor.distance)),
            exclude,
        )
    }

    /// Turn `(site, squared distance)` hits into sorted `(node, distance)` pairs.
    fn expand(
        &self,
        hits: impl Iterator<Item = (usize, f64)>,
        exclude: Option<usize>,
    ) -> Vec<(usize, f64)> {
        let mut results: Vec<(usize, f64)> = hits
            .flat_map(|(site, squared)| {
                let distance = squared.sqrt();
                self.sites[site]
                    .iter()
                    .map(move |&node| (node, distance))
            })
            .filter(|(node, _)| Some(*node) != exclude)
            .collect();
        results.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        results
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.len)
            .field("sites", &self.sites.len())
            .finish()
    }
}

/// Bitwise key for a position; `-0.0` and `0.0` share a key.
fn site_key(position: &Position) -> [u64; 3] {
    position.to_array().map(|value| (value + 0.0).to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> Vec<Position> {
        vec![
            Position::new(0.0, 0.0, 0.0),
            Position::new(5.0, 0.0, 0.0),
            Position::new(1.0, 1.0, 0.0),
            Position::new(0.0, 0.0, 3.0),
        ]
    }

    #[test]
    fn closest_orders_by_distance_and_skips_origin() {
        let positions = positions();
        let index = SpatialIndex::build(&positions);

        let closest = index.closest(positions[0], Some(0), &ClosestQuery::all());
        let order: Vec<usize> = closest.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!((closest[0].1 - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn closest_respects_limit() {
        let positions = positions();
        let index = SpatialIndex::build(&positions);

        let closest = index.closest(positions[0], Some(0), &ClosestQuery::nearest(2));
        assert_eq!(closest.len(), 2);
        assert!(index
            .closest(positions[0], None, &ClosestQuery::nearest(0))
            .is_empty());
    }

    #[test]
    fn within_radius_filters_far_nodes() {
        let positions = positions();
        let index = SpatialIndex::build(&positions);

        let near: Vec<usize> = index
            .within_radius(positions[0], 3.5, Some(0))
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(near, vec![2, 3]);
    }

    #[test]
    fn coincident_positions_share_one_site() {
        let mut positions = vec![Position::new(1.0, 2.0, 3.0); 40];
        positions.extend(vec![Position::new(-1.0, 0.0, 0.0); 20]);
        positions.push(Position::new(-0.0, 0.0, 0.0));
        positions.push(Position::new(0.0, 0.0, 0.0));
        let index = SpatialIndex::build(&positions);
        assert_eq!(index.len(), 62);
        assert_eq!(index.sites.len(), 3);

        let closest = index.closest(positions[0], Some(0), &ClosestQuery::nearest(5));
        let order: Vec<usize> = closest.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
        assert!(closest.iter().all(|(_, distance)| *distance == 0.0));

        let all = index.closest(positions[0], Some(0), &ClosestQuery::all());
        assert_eq!(all.len(), 61);
        assert_eq!(all[39].0, 60);
        assert_eq!(all[40].0, 61);
    }

    #[test]
    fn ties_at_the_cutoff_keep_lowest_indices() {
        // Four sites at distance 1 from the origin; the lowest indices win.
        let positions = vec![
            Position::new(0.0, 0.0, 0.0),
            Position::new(0.0, 0.0, -1.0),
            Position::new(0.0, -1.0, 0.0),
            Position::new(-1.0, 0.0, 0.0),
            Position::new(1.0, 0.0, 0.0),
        ];
        let index = SpatialIndex::build(&positions);
        let order: Vec<usize> = index
            .closest(positions[0], Some(0), &ClosestQuery::nearest(2))
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(order, vec![1, 2]);
    }
}
