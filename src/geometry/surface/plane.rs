use crate::error::{GeometryError, Result};
use crate::math::{near, near_vec, Point3, Vector3, TOLERANCE};

/// An infinite plane `n . p = d`.
///
/// The normal keeps the direction it was built with and the positive
/// half-space is `n . p > d`. A plane built with `-n` through the same
/// point covers the same points with its sides swapped; see
/// [`Plane::orientation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    normal: Vector3,
    distance: f64,
}

impl Plane {
    /// Creates a plane through `point` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn new(point: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        Ok(Self {
            normal,
            distance: normal.dot(&point.coords),
        })
    }

    /// Creates a plane from its coefficients `a x + b y + c z = d`.
    ///
    /// # Errors
    ///
    /// Returns an error if `(a, b, c)` is zero-length.
    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let n = Vector3::new(a, b, c);
        let len = n.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Self::new(Point3::from(n * (d / (len * len))), n)
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the signed distance of the plane from the origin along the normal.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Returns the point of the plane closest to the origin.
    #[must_use]
    pub fn point(&self) -> Point3 {
        Point3::from(self.normal * self.distance)
    }

    /// Signed distance of `p` from the plane.
    #[must_use]
    pub fn value(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.distance
    }

    /// Parameters `t` where `origin + t * dir` meets the plane.
    #[must_use]
    pub fn line_intersect(&self, origin: &Point3, dir: &Vector3) -> Vec<f64> {
        let denom = self.normal.dot(dir);
        if denom.abs() < TOLERANCE {
            return Vec::new();
        }
        vec![-self.value(origin) / denom]
    }

    /// True when both planes coincide within `tol` with the same normal.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        near_vec(&self.normal, &other.normal, tol) && near(self.distance, other.distance, tol)
    }

    /// `Some(1)` when `other` is the same plane, `Some(-1)` when it is the
    /// same plane with the normal reversed, `None` otherwise.
    #[must_use]
    pub fn orientation(&self, other: &Self, tol: f64) -> Option<i32> {
        if self.approx_eq(other, tol) {
            Some(1)
        } else if near_vec(&self.normal, &-other.normal, tol) && near(self.distance, -other.distance, tol) {
            Some(-1)
        } else {
            None
        }
    }

    /// The same plane with the normal reversed.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_keeps_its_direction() {
        let a = Plane::new(Point3::new(0.0, 10.0, 0.0), Vector3::y()).unwrap();
        let b = Plane::new(Point3::new(0.0, 10.0, 0.0), -Vector3::y()).unwrap();
        assert!(!a.approx_eq(&b, 1e-9));
        assert_eq!(a.orientation(&b, 1e-9), Some(-1));
        assert_eq!(b.orientation(&b.flipped().flipped(), 1e-9), Some(1));
        assert!(a.approx_eq(&b.flipped(), 1e-9));
        assert_relative_eq!(b.distance(), -10.0);
        assert!(b.value(&Point3::new(0.0, 15.0, 0.0)) < 0.0);
        let c = Plane::new(Point3::new(0.0, 11.0, 0.0), -Vector3::y()).unwrap();
        assert_eq!(a.orientation(&c, 1e-9), None);
    }

    #[test]
    fn value_is_signed_distance() {
        let p = Plane::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(p.value(&Point3::new(4.0, 7.0, -3.0)), 3.0);
        assert_relative_eq!(p.value(&Point3::new(-1.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn line_hits_plane() {
        let p = Plane::new(Point3::new(0.0, 0.0, 5.0), Vector3::z()).unwrap();
        let t = p.line_intersect(&Point3::origin(), &Vector3::z());
        assert_eq!(t.len(), 1);
        assert_relative_eq!(t[0], 5.0);
        assert!(p.line_intersect(&Point3::origin(), &Vector3::x()).is_empty());
    }

    #[test]
    fn coefficients_match_point_normal() {
        let a = Plane::from_coefficients(0.0, 0.0, 2.0, 4.0).unwrap();
        let b = Plane::new(Point3::new(0.0, 0.0, 2.0), Vector3::z()).unwrap();
        assert!(a.approx_eq(&b, 1e-9));
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_err());
    }
}
