use nalgebra::{Point3, Rotation3, Unit, Vector3};
use symmetry_detector::synthetic::box_surface;
use symmetry_detector::{PointCloud, ReflectionalSymmetry};

pub const BOX_HALF_EXTENTS: [f32; 3] = [0.15, 0.1, 0.05];
pub const BOX_SPACING: f32 = 0.01;

/// Box surface centred at the origin, mirror-symmetric about x, y and z.
pub fn box_cloud() -> PointCloud {
    box_surface(Point3::origin(), Vector3::from(BOX_HALF_EXTENTS), BOX_SPACING)
}

/// Box surface with every sample at `x <= cut_x` removed.
pub fn cut_box_cloud(cut_x: f32) -> PointCloud {
    box_cloud()
        .points
        .into_iter()
        .filter(|p| p.position.x > cut_x)
        .collect()
}

/// Plane through `origin` whose normal is `axis` tilted by `tilt_deg` about `tilt_axis`.
pub fn tilted_plane(
    origin: Point3<f32>,
    axis: Vector3<f32>,
    tilt_axis: Vector3<f32>,
    tilt_deg: f32,
) -> ReflectionalSymmetry {
    let rot = Rotation3::from_axis_angle(&Unit::new_normalize(tilt_axis), tilt_deg.to_radians());
    ReflectionalSymmetry::new(origin, rot * axis).expect("valid plane")
}

/// Unoriented angle between a plane normal and `axis`, in degrees.
pub fn angle_to_axis_deg(symmetry: &ReflectionalSymmetry, axis: &Vector3<f32>) -> f32 {
    symmetry_detector::angle::angle_between_dirless(symmetry.normal(), axis).to_degrees()
}
