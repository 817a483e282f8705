use glam::{Mat4, Quat, Vec3};

/// Time-driven orbit arm: a fixed-radius offset swept around an axis.
///
/// The local matrix is `R(total · angular_rate) · T(radius, 0, 0)`: the body is
/// pushed out along +X first and then swung around the parent's origin, so its
/// world position traces a circle of `radius` about the parent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orbit {
    /// Distance from the parent origin.
    pub radius: f32,

    /// Radians per second of accumulated time.
    pub angular_rate: f32,

    /// Rotation axis, normalized on use. The 2D demos orbit about +Z.
    pub axis: Vec3,
}

impl Orbit {
    /// Orbit about +Z.
    pub const fn new(radius: f32, angular_rate: f32) -> Self {
        Self {
            radius,
            angular_rate,
            axis: Vec3::Z,
        }
    }

    pub const fn with_axis(self, axis: Vec3) -> Self {
        Self { axis, ..self }
    }

    /// Orbit angle in radians at `total` seconds.
    #[inline]
    pub fn angle(&self, total: f32) -> f32 {
        total * self.angular_rate
    }

    /// Local orbit matrix at `total` seconds.
    pub fn local_matrix(&self, total: f32) -> Mat4 {
        let rotation = self
            .axis
            .try_normalize()
            .map_or(Quat::IDENTITY, |axis| Quat::from_axis_angle(axis, self.angle(total)));

        Mat4::from_quat(rotation) * Mat4::from_translation(Vec3::new(self.radius, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::PI;

    #[test]
    fn angle_scales_with_rate() {
        assert_eq!(Orbit::new(1.0, 3.0).angle(2.0), 6.0);
    }

    #[test]
    fn zero_time_sits_on_positive_x() {
        let p = Orbit::new(0.6, 1.0).local_matrix(0.0).transform_point3(Vec3::ZERO);
        assert_abs_diff_eq!(p, Vec3::new(0.6, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn half_turn_sits_on_negative_x() {
        let orbit = Orbit::new(0.5, 1.0);
        let p = orbit.local_matrix(PI).transform_point3(Vec3::ZERO);
        assert_abs_diff_eq!(p, Vec3::new(-0.5, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn radius_is_preserved_over_time() {
        let orbit = Orbit::new(0.2, 3.0);
        for i in 0..16 {
            let p = orbit.local_matrix(i as f32 * 0.37).transform_point3(Vec3::ZERO);
            assert!((p.length() - 0.2).abs() < 1e-5);
        }
    }

    #[test]
    fn custom_axis_orbits_in_its_plane() {
        let orbit = Orbit::new(1.0, 1.0).with_axis(Vec3::Y);
        let p = orbit.local_matrix(PI / 2.0).transform_point3(Vec3::ZERO);
        // +X rotated a quarter turn about +Y lands on -Z.
        assert_abs_diff_eq!(p, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }
}
