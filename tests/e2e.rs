mod common;

use approx::assert_relative_eq;
use common::scenes::{angle_to_axis_deg, box_cloud, cut_box_cloud, tilted_plane};
use nalgebra::{Point3, Vector3};
use symmetry_detector::hypothesis::HypothesisSource;
use symmetry_detector::merge::symmetries_similar;
use symmetry_detector::occupancy::{UniformOccupancy, VoxelOccupancyMap};
use symmetry_detector::synthetic::cube_corners;
use symmetry_detector::{CellState, DetectError, DetectionParams, DetectorState, SymmetryDetector};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn cube_params() -> DetectionParams {
    DetectionParams {
        max_correspondence_reflected_distance: 0.02,
        ..Default::default()
    }
}

#[test]
fn perturbed_cube_candidates_merge_into_one_symmetry() {
    init_logging();
    let cloud = cube_corners(Point3::origin(), 0.1);
    let occupancy = UniformOccupancy(CellState::Free);

    let mut detector = SymmetryDetector::new(cube_params());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);
    detector.set_input_symmetries(vec![
        tilted_plane(Point3::new(0.003, 0.0, 0.0), Vector3::x(), Vector3::z(), 1.5),
        tilted_plane(Point3::new(-0.002, 0.0, 0.0), Vector3::x(), Vector3::y(), -1.0),
        tilted_plane(Point3::origin(), -Vector3::x(), Vector3::z(), 0.5),
    ]);

    assert_eq!(detector.detect(), Ok(3));
    assert_eq!(detector.state(), DetectorState::Detected);
    for s in detector.symmetries() {
        assert!(angle_to_axis_deg(s, &Vector3::x()) < 0.05);
        assert!(s.signed_distance(&Point3::origin()).abs() < 1e-4);
    }
    for scores in detector.scores() {
        assert_relative_eq!(scores.occlusion, 0.0, epsilon = 1e-6);
        assert_relative_eq!(scores.cloud_inlier, 1.0, epsilon = 1e-6);
        assert_relative_eq!(scores.correspondence_inlier, 8.0, epsilon = 1e-3);
    }

    let filtered = detector.filter().unwrap().to_vec();
    assert_eq!(filtered, vec![0, 1, 2]);
    let merged = detector.merge().unwrap().to_vec();
    assert_eq!(merged, vec![0]);
    assert_eq!(detector.state(), DetectorState::Merged);
    assert!((detector.reference_points()[0] - Point3::origin()).norm() < 1e-4);

    let report = detector.report();
    assert_eq!(report.final_ids(), vec![0]);
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"mergedIds\":[0]"));
    assert!(json.contains("\"correspondenceInlier\""));
}

#[test]
fn generated_cube_hypotheses_keep_the_axis_planes() {
    init_logging();
    let cloud = cube_corners(Point3::origin(), 0.1);
    let occupancy = UniformOccupancy(CellState::Free);
    let mut detector = SymmetryDetector::new(cube_params());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);

    assert_eq!(detector.detect(), Ok(15));
    detector.filter().unwrap();
    let merged = detector.merge().unwrap().to_vec();
    assert!(!merged.is_empty());

    let symmetries = detector.symmetries();
    let x_plane = merged
        .iter()
        .copied()
        .find(|&id| angle_to_axis_deg(&symmetries[id], &Vector3::x()) < 0.5)
        .expect("x-normal survivor");
    let scores = detector.scores()[x_plane];
    assert_relative_eq!(scores.occlusion, 0.0, epsilon = 1e-6);
    assert_relative_eq!(scores.cloud_inlier, 1.0, epsilon = 1e-6);
    for &id in &merged {
        assert!((detector.reference_points()[id] - Point3::origin()).norm() < 1e-4);
        assert!(symmetries[id].signed_distance(&Point3::origin()).abs() < 1e-4);
    }
}

#[test]
fn generated_hypotheses_find_the_three_box_planes() {
    init_logging();
    let cloud = box_cloud();
    let occupancy = UniformOccupancy(CellState::Free);
    let params = DetectionParams::default();

    let mut detector = SymmetryDetector::new(params.clone());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);
    let count = detector.detect().unwrap();
    assert_eq!(count, 15);

    let report = detector.report();
    let hyp = report.trace.hypotheses.as_ref().unwrap();
    assert_eq!(hyp.source, HypothesisSource::Generated { flat: false });

    detector.filter().unwrap();
    let merged = detector.merge().unwrap().to_vec();
    let symmetries = detector.symmetries();
    for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
        let hit = merged.iter().any(|&id| {
            angle_to_axis_deg(&symmetries[id], &axis) < 2.0
                && symmetries[id].signed_distance(&Point3::origin()).abs() < 2e-3
                && detector.scores()[id].cloud_inlier > 0.9
        });
        assert!(hit, "no surviving symmetry along {axis:?}");
    }

    let refs = detector.reference_points();
    let merge_params = params.merge_params();
    for (k, &a) in merged.iter().enumerate() {
        for &b in &merged[k + 1..] {
            assert!(!symmetries_similar(
                &symmetries[a],
                &symmetries[b],
                &refs[a],
                &refs[b],
                &merge_params
            ));
        }
    }
}

#[test]
fn reflections_into_occluded_space_are_penalised() {
    init_logging();
    let cloud = cut_box_cloud(-0.05);
    let plane = tilted_plane(Point3::origin(), Vector3::x(), Vector3::z(), 0.0);

    let free = UniformOccupancy(CellState::Free);
    let mut occluded = VoxelOccupancyMap::new(0.01, CellState::Free);
    occluded.fill_box(
        &Point3::new(-0.3, -0.3, -0.3),
        &Point3::new(-0.05, 0.3, 0.3),
        CellState::Occluded,
    );

    let mut detector = SymmetryDetector::new(DetectionParams::default());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&free);
    detector.set_input_symmetries(vec![plane]);
    detector.detect().unwrap();
    let free_scores = detector.scores()[0];
    assert_relative_eq!(free_scores.occlusion, 0.0, epsilon = 1e-6);
    assert!(free_scores.cloud_inlier > 0.3 && free_scores.cloud_inlier < 0.6);
    assert_eq!(detector.filter().unwrap(), &[0]);

    detector.set_input_occupancy_map(&occluded);
    detector.set_input_symmetries(vec![plane]);
    detector.detect().unwrap();
    let occluded_scores = detector.scores()[0];
    assert!(occluded_scores.occlusion > 0.05);
    assert_relative_eq!(occluded_scores.cloud_inlier, free_scores.cloud_inlier, epsilon = 1e-6);
    assert!(detector.filter().unwrap().is_empty());
    let diag = detector.report().trace.filter.unwrap().diagnostics;
    assert_eq!(diag.rejected_occlusion, 1);

    let per_point = detector.compute_point_scores().unwrap();
    assert_eq!(per_point.len(), 1);
    assert_eq!(per_point[0].occlusion.len(), cloud.len());
    assert!(per_point[0].occlusion.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn detect_is_deterministic_and_stages_are_idempotent() {
    init_logging();
    let cloud = box_cloud();
    let occupancy = UniformOccupancy(CellState::Free);
    let mut detector = SymmetryDetector::new(DetectionParams::default());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);

    detector.detect().unwrap();
    let first = detector.symmetries().to_vec();
    let first_scores = detector.scores().to_vec();
    let filtered = detector.filter().unwrap().to_vec();
    assert_eq!(detector.filter().unwrap(), filtered.as_slice());
    let merged = detector.merge().unwrap().to_vec();
    assert_eq!(detector.merge().unwrap(), merged.as_slice());
    assert!(merged.iter().all(|id| filtered.contains(id)));

    detector.detect().unwrap();
    assert_eq!(detector.state(), DetectorState::Detected);
    assert!(detector.filtered_ids().is_none());
    assert!(detector.merged_ids().is_none());
    assert_eq!(detector.symmetries(), first.as_slice());
    assert_eq!(detector.scores(), first_scores.as_slice());
}

#[test]
fn merge_without_filter_runs_over_all_candidates() {
    init_logging();
    let cloud = cube_corners(Point3::origin(), 0.1);
    let occupancy = UniformOccupancy(CellState::Free);
    let mut detector = SymmetryDetector::new(cube_params());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);
    detector.set_input_symmetries(vec![
        tilted_plane(Point3::origin(), Vector3::x(), Vector3::z(), 1.0),
        tilted_plane(Point3::new(0.0, 5.0, 0.0), Vector3::y(), Vector3::z(), 0.0),
    ]);
    detector.detect().unwrap();
    let merged = detector.merge().unwrap().to_vec();
    assert_eq!(merged, vec![0, 1]);
    assert!(detector.filtered_ids().is_none());
    let stage = detector.report().trace.merge.unwrap();
    assert_eq!(stage.input, 2);
}

#[test]
fn new_inputs_reset_the_run() {
    init_logging();
    let cloud = cube_corners(Point3::origin(), 0.1);
    let occupancy = UniformOccupancy(CellState::Free);
    let mut detector = SymmetryDetector::new(cube_params());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);
    detector.set_input_symmetries(vec![tilted_plane(
        Point3::origin(),
        Vector3::x(),
        Vector3::z(),
        1.0,
    )]);
    assert_eq!(detector.detect(), Ok(1));

    detector.set_parameters(cube_params());
    assert_eq!(detector.state(), DetectorState::Configured);
    assert!(detector.symmetries().is_empty());
    assert_eq!(
        detector.filter().unwrap_err(),
        DetectError::NotDetected { operation: "filter" }
    );

    // A new cloud drops the caller-supplied candidates.
    detector.set_input_cloud(&cloud);
    detector.detect().unwrap();
    let source = detector.report().trace.hypotheses.unwrap().source;
    assert!(matches!(source, HypothesisSource::Generated { .. }));
}

#[test]
fn empty_cloud_fails_without_candidates() {
    init_logging();
    let cloud = symmetry_detector::PointCloud::new();
    let occupancy = UniformOccupancy(CellState::Free);
    let mut detector = SymmetryDetector::default();
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);
    assert!(matches!(
        detector.detect(),
        Err(DetectError::InsufficientPoints { found: 0, .. })
    ));
    assert!(detector.symmetries().is_empty());
    assert!(detector.merge().is_err());
}
