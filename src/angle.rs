//! Angle utilities used across the symmetry pipeline.

use nalgebra::Vector3;

const EPS: f32 = 1e-12;

/// Computes the orientation difference between two 3D vectors while treating
/// antipodal directions as equivalent. Returns a value in [0, π/2].
#[inline]
pub fn angle_between_dirless(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    let na = a.norm().max(EPS);
    let nb = b.norm().max(EPS);
    (a.dot(b) / (na * nb)).abs().clamp(0.0, 1.0).acos()
}

/// Linear ramp mapping `value` from `[lo, hi]` onto `[0, 1]`, clamped.
///
/// A degenerate window (`hi <= lo`) behaves as a hard step at `lo`.
#[inline]
pub fn ramp(value: f32, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return if value < lo { 0.0 } else { 1.0 };
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn dirless_angle_ignores_sign() {
        let a = Vector3::new(1.0f32, 1.0, 0.0);
        let b = Vector3::new(-1.0f32, -1.0, 0.0);
        assert!(approx_eq(angle_between_dirless(&a, &b), 0.0));

        let c = Vector3::new(0.0f32, 0.0, -1.0);
        assert!(approx_eq(
            angle_between_dirless(&a, &c),
            std::f32::consts::FRAC_PI_2
        ));
    }

    #[test]
    fn dirless_angle_is_symmetric() {
        let a = Vector3::new(0.3f32, -0.2, 0.9);
        let b = Vector3::new(-0.7f32, 0.1, 0.4);
        assert!(approx_eq(
            angle_between_dirless(&a, &b),
            angle_between_dirless(&b, &a)
        ));
    }

    #[test]
    fn ramp_clamps_and_interpolates() {
        assert!(approx_eq(ramp(0.0, 1.0, 3.0), 0.0));
        assert!(approx_eq(ramp(2.0, 1.0, 3.0), 0.5));
        assert!(approx_eq(ramp(5.0, 1.0, 3.0), 1.0));
        assert!(approx_eq(ramp(0.5, 1.0, 1.0), 0.0));
        assert!(approx_eq(ramp(1.0, 1.0, 1.0), 1.0));
    }
}
