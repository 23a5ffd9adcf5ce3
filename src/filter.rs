//! Threshold filter over candidate scores.
//!
//! A candidate survives when it is not too occluded and has enough cloud
//! and correspondence support. Surviving ids keep candidate order. The filter
//! reports which criterion rejected a candidate first, checked in the order
//! occlusion, cloud inlier, correspondence inlier.
use crate::detector::params::FilterParams;
use crate::score::SymmetryScores;
use serde::Serialize;

/// Diagnostics emitted by the symmetry filter.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDiagnostics {
    pub total: usize,
    pub kept: usize,
    pub rejected_occlusion: usize,
    pub rejected_cloud_inlier: usize,
    pub rejected_correspondence_inlier: usize,
    pub thresholds: FilterParams,
}

impl FilterDiagnostics {
    fn new(thresholds: FilterParams) -> Self {
        Self {
            thresholds,
            ..Default::default()
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejected_occlusion + self.rejected_cloud_inlier + self.rejected_correspondence_inlier
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    Occlusion,
    CloudInlier,
    CorrespondenceInlier,
}

/// First failing criterion for `scores`, `None` when the candidate passes.
pub fn first_rejection(scores: &SymmetryScores, params: &FilterParams) -> Option<Rejection> {
    // NaN scores fail every comparison.
    let at_least = |value: f32, min: f32| value >= min;
    if !at_least(params.max_occlusion_score, scores.occlusion) {
        Some(Rejection::Occlusion)
    } else if !at_least(scores.cloud_inlier, params.min_cloud_inlier_score) {
        Some(Rejection::CloudInlier)
    } else if !at_least(scores.correspondence_inlier, params.min_corresp_inlier_score) {
        Some(Rejection::CorrespondenceInlier)
    } else {
        None
    }
}

/// Indices of the candidates passing every threshold, in input order.
pub fn filter_symmetries(
    scores: &[SymmetryScores],
    params: &FilterParams,
) -> (Vec<usize>, FilterDiagnostics) {
    let mut diag = FilterDiagnostics::new(*params);
    diag.total = scores.len();
    let mut kept = Vec::with_capacity(scores.len());
    for (i, s) in scores.iter().enumerate() {
        match first_rejection(s, params) {
            None => kept.push(i),
            Some(Rejection::Occlusion) => diag.rejected_occlusion += 1,
            Some(Rejection::CloudInlier) => diag.rejected_cloud_inlier += 1,
            Some(Rejection::CorrespondenceInlier) => diag.rejected_correspondence_inlier += 1,
        }
    }
    diag.kept = kept.len();
    (kept, diag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(occlusion: f32, cloud_inlier: f32, correspondence_inlier: f32) -> SymmetryScores {
        SymmetryScores {
            occlusion,
            cloud_inlier,
            correspondence_inlier,
        }
    }

    #[test]
    fn keeps_passing_candidates_in_order() {
        let params = FilterParams::default();
        let input = [
            scores(0.0, 0.9, 10.0),
            scores(0.5, 0.9, 10.0),
            scores(0.0, 0.1, 10.0),
            scores(0.0, 0.9, 1.0),
            scores(0.01, 0.2, 4.0),
        ];
        let (kept, diag) = filter_symmetries(&input, &params);
        assert_eq!(kept, vec![0, 4]);
        assert_eq!(diag.total, 5);
        assert_eq!(diag.kept, 2);
        assert_eq!(diag.rejected_occlusion, 1);
        assert_eq!(diag.rejected_cloud_inlier, 1);
        assert_eq!(diag.rejected_correspondence_inlier, 1);
        assert_eq!(diag.rejected(), 3);
    }

    #[test]
    fn first_failing_criterion_is_reported() {
        let params = FilterParams::default();
        assert_eq!(
            first_rejection(&scores(1.0, 0.0, 0.0), &params),
            Some(Rejection::Occlusion)
        );
        assert_eq!(
            first_rejection(&scores(0.0, 0.0, 0.0), &params),
            Some(Rejection::CloudInlier)
        );
    }

    #[test]
    fn nan_scores_never_pass() {
        let params = FilterParams::default();
        let (kept, _) = filter_symmetries(&[scores(f32::NAN, 1.0, 10.0)], &params);
        assert!(kept.is_empty());
    }

    #[test]
    fn tighter_thresholds_never_keep_more() {
        let input: Vec<SymmetryScores> = (0..40)
            .map(|i| {
                let t = i as f32 / 39.0;
                scores(
                    0.02 * ((i * 7) % 11) as f32 / 10.0,
                    (0.1 + 0.9 * t * t).min(1.0),
                    12.0 * ((i * 13) % 17) as f32 / 16.0,
                )
            })
            .collect();

        let sweeps: [fn(&mut FilterParams, f32); 3] = [
            |p, t| p.max_occlusion_score = 0.02 * (1.0 - t),
            |p, t| p.min_cloud_inlier_score = t,
            |p, t| p.min_corresp_inlier_score = 12.0 * t,
        ];
        for tighten in sweeps {
            let mut params = FilterParams {
                max_occlusion_score: 0.02,
                min_cloud_inlier_score: 0.0,
                min_corresp_inlier_score: 0.0,
            };
            let (mut previous, _) = filter_symmetries(&input, &params);
            for step in 1..=10 {
                tighten(&mut params, step as f32 / 10.0);
                let (kept, diag) = filter_symmetries(&input, &params);
                assert!(kept.len() <= previous.len());
                assert!(kept.iter().all(|id| previous.contains(id)));
                assert_eq!(diag.kept + diag.rejected(), input.len());
                previous = kept;
            }
        }
    }

    #[test]
    fn empty_input_keeps_nothing() {
        let (kept, diag) = filter_symmetries(&[], &FilterParams::default());
        assert!(kept.is_empty());
        assert_eq!(diag.total, 0);
    }
}
