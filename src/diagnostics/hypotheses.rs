use crate::hypothesis::HypothesisSource;
use serde::Serialize;

/// Candidate set handed to refinement.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisStage {
    pub elapsed_ms: f64,
    pub source: HypothesisSource,
    pub count: usize,
}
