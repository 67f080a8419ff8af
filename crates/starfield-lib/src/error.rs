use thiserror::Error;

/// Convenient result alias for the Starfield library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a system name could not be found in the universe.
    #[error("unknown system name: {name}{}", format_suggestions(.suggestions))]
    UnknownSystem {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a catalog identifier does not match any real star.
    #[error("unknown catalog entry: {id}")]
    UnknownCatalogEntry { id: String },

    /// Raised when a catalog identifier string cannot be parsed.
    #[error("invalid catalog identifier: {value}")]
    InvalidCatalogId { value: String },

    /// Raised when a node index does not address a node of the graph.
    #[error("node index {index} out of range for graph with {node_count} nodes")]
    NodeIndexOutOfRange { index: usize, node_count: usize },

    /// Raised when neighbour information is requested for a non-adjacent pair.
    #[error("nodes {node_index0} and {node_index1} are not neighbours")]
    NotNeighbors {
        node_index0: usize,
        node_index1: usize,
    },

    /// Raised when the jump range is negative or not a finite number.
    #[error("invalid jump range {jump_range}; expected a finite, non-negative value")]
    InvalidJumpRange { jump_range: f64 },

    /// Raised when a manual connection carries a negative or non-finite weight.
    #[error("invalid connection weight {weight} between {name_a} and {name_b}")]
    NegativeWeight {
        name_a: String,
        name_b: String,
        weight: f64,
    },

    /// Raised when a manual connection would join a system to itself.
    #[error("refusing to connect {name} to itself")]
    SelfConnection { name: String },

    /// Raised when a route summary is requested for an empty jump path.
    #[error("jump path was empty")]
    EmptyJumpPath,

    /// Raised when no catalog star could be matched to a fictional system.
    #[error("no anchors matched between the real catalog and the fictional universe")]
    NoAnchors,

    /// Raised when optimizer bounds are inverted or not finite.
    #[error("invalid bounds for parameter {index}: min {min}, max {max}")]
    InvalidBounds { index: usize, min: f64, max: f64 },

    /// Raised when a dataset row fails validation.
    #[error("invalid dataset: {message}")]
    DatasetValidation { message: String },

    /// Raised when an alignment configuration value is out of range.
    #[error("invalid alignment config: {message}")]
    InvalidConfig { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON configuration errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
