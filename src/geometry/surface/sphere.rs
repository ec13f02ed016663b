use crate::error::{GeometryError, Result};
use crate::math::{near, near_vec, solve_quadratic, Point3, Vector3, TOLERANCE};

/// A sphere. The positive side is the outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    centre: Point3,
    radius: f64,
}

impl Sphere {
    /// Creates a new sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn new(centre: Point3, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate(format!("sphere radius {radius} must be positive"))
                    .into(),
            );
        }
        Ok(Self { centre, radius })
    }

    /// Returns the centre of the sphere.
    #[must_use]
    pub fn centre(&self) -> &Point3 {
        &self.centre
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance from the centre minus the radius.
    #[must_use]
    pub fn value(&self, p: &Point3) -> f64 {
        (p - self.centre).norm() - self.radius
    }

    /// Parameters `t` where `origin + t * dir` meets the sphere.
    #[must_use]
    pub fn line_intersect(&self, origin: &Point3, dir: &Vector3) -> Vec<f64> {
        let w = origin - self.centre;
        solve_quadratic(
            dir.norm_squared(),
            2.0 * w.dot(dir),
            w.norm_squared() - self.radius * self.radius,
        )
    }

    /// True when both spheres coincide within `tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        near_vec(&self.centre.coords, &other.centre.coords, tol)
            && near(self.radius, other.radius, tol)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn value_is_radial_distance() {
        let s = Sphere::new(Point3::new(1.0, 2.0, 3.0), 2.0).unwrap();
        assert_relative_eq!(s.value(&Point3::new(1.0, 2.0, 8.0)), 3.0);
        assert!(s.value(&Point3::new(1.0, 2.0, 3.5)) < 0.0);
    }

    #[test]
    fn line_from_centre_exits_once_forward() {
        let s = Sphere::new(Point3::origin(), 4.0).unwrap();
        let t = s.line_intersect(&Point3::origin(), &Vector3::x());
        assert_eq!(t.len(), 2);
        assert_relative_eq!(t[0], -4.0, epsilon = 1e-12);
        assert_relative_eq!(t[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn equal_within_tolerance() {
        let a = Sphere::new(Point3::origin(), 3.0).unwrap();
        let b = Sphere::new(Point3::new(0.0, 1e-7, 0.0), 3.000_001).unwrap();
        assert!(a.approx_eq(&b, 1e-5));
        let c = Sphere::new(Point3::new(0.0, 1.0, 0.0), 3.0).unwrap();
        assert!(!a.approx_eq(&c, 1e-5));
    }

    #[test]
    fn invalid_radius() {
        assert!(Sphere::new(Point3::origin(), -1.0).is_err());
    }
}
