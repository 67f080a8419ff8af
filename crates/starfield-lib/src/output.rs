use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::path::JumpPath;

/// Stop along a rendered jump path.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub node: usize,
    pub name: String,
    pub distance_from_previous: f64,
    pub cumulative: f64,
}

impl RouteStep {
    fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "<unnamed>"
        } else {
            &self.name
        }
    }
}

/// Structured representation of a jump path that higher-level consumers can
/// serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub jump_range: f64,
    pub hops: usize,
    pub total_distance: f64,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Resolve names and per-hop distances for `path`.
    pub fn from_path(graph: &Graph, path: &JumpPath) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::EmptyJumpPath);
        }

        let mut steps = Vec::with_capacity(path.len());
        let mut cumulative = 0.0;
        let mut previous: Option<usize> = None;
        for (index, &node) in path.stops.iter().enumerate() {
            let hop = match previous {
                Some(prev) => graph.get_neighbor_info(prev, node)?.distance,
                None => 0.0,
            };
            cumulative += hop;
            steps.push(RouteStep {
                index,
                node,
                name: graph.node(node)?.name.clone(),
                distance_from_previous: hop,
                cumulative,
            });
            previous = Some(node);
        }

        Ok(Self {
            jump_range: graph.jump_range(),
            hops: path.hop_count(),
            total_distance: cumulative,
            steps,
        })
    }

    /// Plain-text rendering, one stop per line.
    pub fn render_text(&self) -> String {
        let mut buffer = String::new();
        let start = self.steps.first().map(RouteStep::display_name).unwrap_or("?");
        let goal = self.steps.last().map(RouteStep::display_name).unwrap_or("?");
        let _ = writeln!(
            buffer,
            "Route from {} to {} ({} jumps, {:.2} total, jump range {:.2}):",
            start, goal, self.hops, self.total_distance, self.jump_range
        );
        for step in &self.steps {
            if step.index == 0 {
                let _ = writeln!(buffer, "  {:>3}. {}", step.index, step.display_name());
            } else {
                let _ = writeln!(
                    buffer,
                    "  {:>3}. {} (+{:.2}, {:.2})",
                    step.index,
                    step.display_name(),
                    step.distance_from_previous,
                    step.cumulative
                );
            }
        }
        buffer
    }
}
