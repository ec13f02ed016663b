use crate::error::{GeometryError, Result};
use crate::math::{near, near_vec, solve_quadratic, Point3, Vector3, TOLERANCE};

use super::canonical_direction;

/// An infinite circular cylinder.
///
/// Defined by a point on the axis, an axis direction (stored in canonical
/// orientation) and a radius. The positive side is the outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    centre: Point3,
    axis: Vector3,
    radius: f64,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Arguments
    ///
    /// * `centre` - A point on the cylinder axis
    /// * `axis` - Axis direction (will be normalized)
    /// * `radius` - Radius (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the axis is zero-length.
    pub fn new(centre: Point3, axis: Vector3, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate(format!("cylinder radius {radius} must be positive"))
                    .into(),
            );
        }
        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            centre,
            axis: canonical_direction(axis / axis_len),
            radius,
        })
    }

    /// Returns the point on the axis given at construction.
    #[must_use]
    pub fn centre(&self) -> &Point3 {
        &self.centre
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Component of `p - centre` perpendicular to the axis.
    fn radial(&self, p: &Point3) -> Vector3 {
        let w = p - self.centre;
        w - self.axis * w.dot(&self.axis)
    }

    /// Distance from the axis minus the radius.
    #[must_use]
    pub fn value(&self, p: &Point3) -> f64 {
        self.radial(p).norm() - self.radius
    }

    /// Parameters `t` where `origin + t * dir` meets the cylinder.
    #[must_use]
    pub fn line_intersect(&self, origin: &Point3, dir: &Vector3) -> Vec<f64> {
        let w = self.radial(origin);
        let d = dir - self.axis * dir.dot(&self.axis);
        solve_quadratic(
            d.norm_squared(),
            2.0 * w.dot(&d),
            w.norm_squared() - self.radius * self.radius,
        )
    }

    /// True when both cylinders coincide within `tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        near_vec(&self.axis, &other.axis, tol)
            && near(self.radius, other.radius, tol)
            && self.radial(&other.centre).norm() <= tol
    }

    /// Coefficients `[A B C D E F G H J K]` of the general quadric
    /// `Ax²+By²+Cz²+Dxy+Eyz+Fzx+Gx+Hy+Jz+K = 0`, negative inside.
    #[must_use]
    pub fn general_quadric(&self) -> [f64; 10] {
        let m = nalgebra::Matrix3::identity() - self.axis * self.axis.transpose();
        super::quadric_from_form(&m, &self.centre, -self.radius * self.radius)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn y_cylinder(radius: f64) -> Cylinder {
        Cylinder::new(Point3::origin(), Vector3::y(), radius).unwrap()
    }

    #[test]
    fn value_inside_and_outside() {
        let c = y_cylinder(5.0);
        assert!(c.value(&Point3::new(1.0, 100.0, 0.0)) < 0.0);
        assert!(c.value(&Point3::new(6.0, -3.0, 0.0)) > 0.0);
        assert_relative_eq!(c.value(&Point3::new(0.0, 2.0, 7.0)), 2.0);
    }

    #[test]
    fn centre_shifted_along_axis_is_equal() {
        let a = y_cylinder(5.0);
        let b = Cylinder::new(Point3::new(0.0, 42.0, 0.0), -Vector3::y(), 5.000_000_1).unwrap();
        assert!(a.approx_eq(&b, 1e-5));
    }

    #[test]
    fn different_radius_is_not_equal() {
        assert!(!y_cylinder(5.0).approx_eq(&y_cylinder(5.1), 1e-5));
    }

    #[test]
    fn line_through_axis_hits_twice() {
        let c = y_cylinder(2.0);
        let t = c.line_intersect(&Point3::new(-10.0, 3.0, 0.0), &Vector3::x());
        assert_eq!(t.len(), 2);
        assert_relative_eq!(t[0], 8.0, epsilon = 1e-9);
        assert_relative_eq!(t[1], 12.0, epsilon = 1e-9);
    }

    #[test]
    fn line_along_axis_misses() {
        let c = y_cylinder(2.0);
        assert!(c.line_intersect(&Point3::origin(), &Vector3::y()).is_empty());
    }

    #[test]
    fn quadric_matches_value_sign() {
        let c = Cylinder::new(Point3::new(1.0, 0.0, 2.0), Vector3::new(1.0, 1.0, 0.0), 1.5).unwrap();
        let q = c.general_quadric();
        for p in [Point3::new(1.0, 0.0, 2.0), Point3::new(5.0, 0.0, 9.0)] {
            let f = crate::geometry::surface::eval_quadric(&q, &p);
            assert_eq!(f < 0.0, c.value(&p) < 0.0);
        }
    }

    #[test]
    fn invalid_radius() {
        assert!(Cylinder::new(Point3::origin(), Vector3::z(), 0.0).is_err());
    }
}
