use crate::error::{GeometryError, Result};
use crate::math::{near, near_vec, solve_quadratic, Point3, Vector3, TOLERANCE};

use super::canonical_direction;

/// A two-sheeted circular cone.
///
/// Defined by an apex, an axis (stored in canonical orientation) and a
/// half-angle in radians. Both nappes are part of the surface, matching the
/// MCNP `k` family. The positive side is the outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Cone {
    apex: Point3,
    axis: Vector3,
    half_angle: f64,
}

impl Cone {
    /// Creates a new cone.
    ///
    /// # Arguments
    ///
    /// * `apex` - The apex (tip) of the cone
    /// * `axis` - Axis direction (will be normalized)
    /// * `half_angle` - Half-angle in radians (must be in `(0, pi/2)`)
    ///
    /// # Errors
    ///
    /// Returns an error if the half-angle is out of range or the axis is zero-length.
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64) -> Result<Self> {
        if half_angle <= TOLERANCE || half_angle >= std::f64::consts::FRAC_PI_2 - TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "cone half-angle {half_angle} must be in (0, pi/2)"
            ))
            .into());
        }
        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            apex,
            axis: canonical_direction(axis / axis_len),
            half_angle,
        })
    }

    /// Returns the apex point.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the half-angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    /// Distance-like value: `rho cos(a) - |h| sin(a)`, negative inside.
    #[must_use]
    pub fn value(&self, p: &Point3) -> f64 {
        let w = p - self.apex;
        let h = w.dot(&self.axis);
        let rho = (w - self.axis * h).norm();
        rho * self.half_angle.cos() - h.abs() * self.half_angle.sin()
    }

    /// Parameters `t` where `origin + t * dir` meets the cone.
    #[must_use]
    pub fn line_intersect(&self, origin: &Point3, dir: &Vector3) -> Vec<f64> {
        let w = origin - self.apex;
        let cos2 = self.half_angle.cos().powi(2);
        let da = dir.dot(&self.axis);
        let wa = w.dot(&self.axis);
        // (w+td).a)^2 - cos^2 |w+td|^2 = 0
        solve_quadratic(
            da * da - cos2 * dir.norm_squared(),
            2.0 * (da * wa - cos2 * w.dot(dir)),
            wa * wa - cos2 * w.norm_squared(),
        )
    }

    /// True when both cones coincide within `tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        near_vec(&self.apex.coords, &other.apex.coords, tol)
            && near_vec(&self.axis, &other.axis, tol)
            && near(self.half_angle, other.half_angle, tol)
    }

    /// Squared tangent of the half-angle (MCNP `t^2` parameter).
    #[must_use]
    pub fn tan_squared(&self) -> f64 {
        self.half_angle.tan().powi(2)
    }

    /// Coefficients `[A B C D E F G H J K]` of the general quadric, negative inside.
    #[must_use]
    pub fn general_quadric(&self) -> [f64; 10] {
        let cos2 = self.half_angle.cos().powi(2);
        let m = nalgebra::Matrix3::identity() * cos2 - self.axis * self.axis.transpose();
        super::quadric_from_form(&m, &self.apex, 0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn z_cone() -> Cone {
        Cone::new(Point3::origin(), Vector3::z(), FRAC_PI_4).unwrap()
    }

    #[test]
    fn inside_both_nappes() {
        let c = z_cone();
        assert!(c.value(&Point3::new(0.5, 0.0, 2.0)) < 0.0);
        assert!(c.value(&Point3::new(0.5, 0.0, -2.0)) < 0.0);
        assert!(c.value(&Point3::new(3.0, 0.0, 1.0)) > 0.0);
    }

    #[test]
    fn line_parallel_to_axis() {
        let c = z_cone();
        let t = c.line_intersect(&Point3::new(1.0, 0.0, -5.0), &Vector3::z());
        assert_eq!(t.len(), 2);
        assert_relative_eq!(t[0], 4.0, epsilon = 1e-9);
        assert_relative_eq!(t[1], 6.0, epsilon = 1e-9);
    }

    #[test]
    fn quadric_negative_inside() {
        let c = Cone::new(Point3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 1.0), 0.3).unwrap();
        let q = c.general_quadric();
        let inside = Point3::new(1.0, 3.0, 2.0);
        let outside = Point3::new(8.0, 1.0, 0.5);
        assert!(crate::geometry::surface::eval_quadric(&q, &inside) < 0.0);
        assert!(crate::geometry::surface::eval_quadric(&q, &outside) > 0.0);
    }

    #[test]
    fn tan_squared_of_45_degrees() {
        assert_relative_eq!(z_cone().tan_squared(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_half_angle() {
        assert!(Cone::new(Point3::origin(), Vector3::z(), 0.0).is_err());
        assert!(Cone::new(Point3::origin(), Vector3::z(), 2.0).is_err());
    }
}
