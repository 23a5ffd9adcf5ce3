use crate::detector::params::MergeParams;
use serde::Serialize;

/// Report of the duplicate merge.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStage {
    pub elapsed_ms: f64,
    /// Candidates entering the merge.
    pub input: usize,
    pub kept: usize,
    /// Member ids per surviving cluster, parallel to the merged ids.
    pub clusters: Vec<Vec<usize>>,
    pub thresholds: MergeParams,
}
