use thiserror::Error;

/// Errors reported by [`SymmetryDetector`](crate::SymmetryDetector).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("no input cloud set")]
    MissingInputCloud,
    #[error("no occupancy map set")]
    MissingOccupancyMap,
    /// `filter`, `merge` or a score query ran before a successful `detect`.
    #[error("{operation}() requires a successful detect() first")]
    NotDetected { operation: &'static str },
    #[error("need at least {required} points for symmetry detection, got {found}")]
    InsufficientPoints { found: usize, required: usize },
    #[error("no symmetry hypotheses could be generated")]
    NoHypotheses,
}
