use std::env;
use std::path::Path;
use symmetry_detector::config::{load_config, DemoConfig};
use symmetry_detector::diagnostics::DetectionReport;
use symmetry_detector::io::write_json_file;
use symmetry_detector::occupancy::UniformOccupancy;
use symmetry_detector::SymmetryDetector;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config = match env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => DemoConfig::default(),
    };

    let cloud = config.scene.build()?;
    let occupancy = UniformOccupancy(config.occupancy);

    let mut detector = SymmetryDetector::new(config.params.clone());
    detector.set_input_cloud(&cloud);
    detector.set_input_occupancy_map(&occupancy);
    detector.detect().map_err(|e| e.to_string())?;
    detector.filter().map_err(|e| e.to_string())?;
    detector.merge().map_err(|e| e.to_string())?;

    let report = detector.report();
    print_text_summary(&report);

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &report)?;
        println!("\nJSON report written to {}", path.display());
    }
    Ok(())
}

fn print_text_summary(report: &DetectionReport) {
    println!("Detection summary");
    println!(
        "  points: {} (downsampled {})",
        report.input.points, report.input.downsampled_points
    );
    println!("  candidates: {}", report.symmetries.len());
    if let Some(ids) = &report.filtered_ids {
        println!("  filtered: {}", ids.len());
    }
    let final_ids = report.final_ids();
    println!("  symmetries: {}", final_ids.len());
    for id in final_ids {
        let Some(s) = report.symmetries.get(id) else {
            continue;
        };
        println!(
            "    #{id}: normal [{:.4} {:.4} {:.4}] origin [{:.4} {:.4} {:.4}] occlusion {:.4} cloud {:.3} corresp {:.2}",
            s.normal[0],
            s.normal[1],
            s.normal[2],
            s.origin[0],
            s.origin[1],
            s.origin[2],
            s.scores.occlusion,
            s.scores.cloud_inlier,
            s.scores.correspondence_inlier
        );
    }
    println!("  timings:");
    for stage in &report.trace.timings.stages {
        println!("    {:<12} {:.3} ms", stage.label, stage.elapsed_ms);
    }
    println!("  total_ms: {:.3}", report.trace.timings.total_ms);
}
