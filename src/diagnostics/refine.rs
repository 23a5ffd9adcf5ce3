use crate::refine::RefineOutcome;
use serde::Serialize;

/// Refinement trace for every candidate, in candidate order.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementStage {
    pub elapsed_ms: f64,
    pub candidates: Vec<RefinementSample>,
}

impl RefinementStage {
    pub fn count(&self, outcome: RefineOutcome) -> usize {
        self.candidates.iter().filter(|c| c.outcome == outcome).count()
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementSample {
    pub iterations: usize,
    pub outcome: RefineOutcome,
    /// Accepted correspondences of the final plane.
    pub correspondences: usize,
}
