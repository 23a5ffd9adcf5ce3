use crate::filter::FilterDiagnostics;
use serde::Serialize;

/// Report of the score filter.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStage {
    pub elapsed_ms: f64,
    #[serde(flatten)]
    pub diagnostics: FilterDiagnostics,
}
