use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock duration of one pipeline stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Per-stage timings of the last run, in execution order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Record a stage, replacing an earlier entry with the same label so that
    /// re-running `filter` or `merge` does not accumulate duplicates.
    pub fn record(&mut self, label: &str, elapsed_ms: f64) {
        self.stages.retain(|s| s.label != label);
        self.stages.push(StageTiming::new(label, elapsed_ms));
        self.total_ms = self.stages.iter().map(|s| s.elapsed_ms).sum();
    }

    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }

    /// Drop every stage recorded after `label`.
    pub fn truncate_after(&mut self, label: &str) {
        if let Some(pos) = self.stages.iter().position(|s| s.label == label) {
            self.stages.truncate(pos + 1);
            self.total_ms = self.stages.iter().map(|s| s.elapsed_ms).sum();
        }
    }
}

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
