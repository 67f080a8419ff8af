//! Output formats and report types printed by the CLI.

use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;
use starfield_lib::{AlignmentParams, Graph, RouteSummary, UniverseCreator};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// A report that can be printed in every [`OutputFormat`].
pub trait Report: Serialize {
    fn render_text(&self) -> String;

    fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => serde_json::to_string_pretty(self).map(|mut json| {
                json.push('\n');
                json
            }),
        }
    }
}

impl Report for RouteSummary {
    fn render_text(&self) -> String {
        RouteSummary::render_text(self)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClosestEntry {
    pub name: String,
    pub distance: f64,
    /// Whether the system is a direct jump away.
    pub neighbor: bool,
}

/// Systems ordered by distance from `system`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClosestReport {
    pub system: String,
    pub entries: Vec<ClosestEntry>,
}

impl ClosestReport {
    pub fn new(graph: &Graph, origin: usize, closest: &[usize]) -> Self {
        let nodes = graph.nodes();
        let position = nodes[origin].position;
        let entries = closest
            .iter()
            .map(|&index| ClosestEntry {
                name: nodes[index].name.clone(),
                distance: nodes[index].position.distance_to(&position),
                neighbor: graph.are_neighbors(origin, index),
            })
            .collect();
        Self {
            system: nodes[origin].name.clone(),
            entries,
        }
    }
}

impl Report for ClosestReport {
    fn render_text(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "Closest systems to {}:", self.system);
        for (rank, entry) in self.entries.iter().enumerate() {
            let marker = if entry.neighbor { " *" } else { "" };
            let _ = writeln!(
                buffer,
                "  {:>3}. {} ({:.2}){}",
                rank + 1,
                entry.name,
                entry.distance,
                marker
            );
        }
        buffer
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MinJumpReport {
    pub from: String,
    pub to: String,
    pub min_jump_range: f64,
}

impl Report for MinJumpReport {
    fn render_text(&self) -> String {
        format!(
            "Minimum jump range from {} to {}: {:.4}\n",
            self.from, self.to, self.min_jump_range
        )
    }
}

/// Outcome of an `align` run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlignReport {
    pub iterations: u64,
    pub best_cost: f64,
    pub anchors: usize,
    pub systems: usize,
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    pub translation: [f64; 3],
}

impl AlignReport {
    pub fn new(creator: &UniverseCreator, systems: usize) -> Self {
        let params = creator
            .best_params()
            .unwrap_or_else(AlignmentParams::identity);
        Self {
            iterations: creator.iteration(),
            best_cost: creator.best_cost(),
            anchors: creator.cost().anchors().len(),
            systems,
            rotation: params.rotation,
            scale: params.scale,
            translation: params.translation,
        }
    }
}

impl Report for AlignReport {
    fn render_text(&self) -> String {
        let vector = |v: [f64; 3]| format!("({:.4}, {:.4}, {:.4})", v[0], v[1], v[2]);
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Aligned {} systems on {} anchors after {} iterations (cost {:.6e})",
            self.systems, self.anchors, self.iterations, self.best_cost
        );
        let _ = writeln!(buffer, "  rotation:    {}", vector(self.rotation));
        let _ = writeln!(buffer, "  scale:       {}", vector(self.scale));
        let _ = writeln!(buffer, "  translation: {}", vector(self.translation));
        buffer
    }
}
