mod cone;
mod cylinder;
mod plane;
mod sphere;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use plane::Plane;
pub use sphere::Sphere;

use crate::math::{Matrix3, Point3, Vector3, TOLERANCE};

/// A registered geometric primitive.
///
/// Every variant splits space into two half-spaces. The signed handle of a
/// surface selects one of them: positive is the side where [`Surface::value`]
/// is positive (along the plane normal, or outside a quadric).
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// An infinite plane.
    Plane(Plane),
    /// An infinite circular cylinder.
    Cylinder(Cylinder),
    /// A sphere.
    Sphere(Sphere),
    /// A two-sheeted cone.
    Cone(Cone),
}

impl Surface {
    /// Short lowercase kind name, used in log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plane(_) => "plane",
            Self::Cylinder(_) => "cylinder",
            Self::Sphere(_) => "sphere",
            Self::Cone(_) => "cone",
        }
    }

    /// Signed distance-like value of `p`; zero on the surface.
    #[must_use]
    pub fn value(&self, p: &Point3) -> f64 {
        match self {
            Self::Plane(s) => s.value(p),
            Self::Cylinder(s) => s.value(p),
            Self::Sphere(s) => s.value(p),
            Self::Cone(s) => s.value(p),
        }
    }

    /// Side of `p`: `1`, `-1`, or `0` when within `tol` of the surface.
    #[must_use]
    pub fn side(&self, p: &Point3, tol: f64) -> i32 {
        let v = self.value(p);
        if v > tol {
            1
        } else if v < -tol {
            -1
        } else {
            0
        }
    }

    /// Ascending line parameters `t` where `origin + t * dir` meets the surface.
    #[must_use]
    pub fn line_intersect(&self, origin: &Point3, dir: &Vector3) -> Vec<f64> {
        match self {
            Self::Plane(s) => s.line_intersect(origin, dir),
            Self::Cylinder(s) => s.line_intersect(origin, dir),
            Self::Sphere(s) => s.line_intersect(origin, dir),
            Self::Cone(s) => s.line_intersect(origin, dir),
        }
    }

    /// True when both surfaces are of the same kind, coincide within `tol`
    /// and agree on which side is positive.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.orientation(other, tol) == Some(1)
    }

    /// Compares two surfaces: `Some(1)` when they are the same half-space
    /// split, `Some(-1)` when they coincide with their sides swapped (only
    /// possible for planes), `None` when they differ.
    #[must_use]
    pub fn orientation(&self, other: &Self, tol: f64) -> Option<i32> {
        match (self, other) {
            (Self::Plane(a), Self::Plane(b)) => a.orientation(b, tol),
            (Self::Cylinder(a), Self::Cylinder(b)) => a.approx_eq(b, tol).then_some(1),
            (Self::Sphere(a), Self::Sphere(b)) => a.approx_eq(b, tol).then_some(1),
            (Self::Cone(a), Self::Cone(b)) => a.approx_eq(b, tol).then_some(1),
            _ => None,
        }
    }
}

impl From<Plane> for Surface {
    fn from(s: Plane) -> Self {
        Self::Plane(s)
    }
}

impl From<Cylinder> for Surface {
    fn from(s: Cylinder) -> Self {
        Self::Cylinder(s)
    }
}

impl From<Sphere> for Surface {
    fn from(s: Sphere) -> Self {
        Self::Sphere(s)
    }
}

impl From<Cone> for Surface {
    fn from(s: Cone) -> Self {
        Self::Cone(s)
    }
}

/// Flips a unit direction so its first non-negligible component is positive.
pub(crate) fn canonical_direction(v: Vector3) -> Vector3 {
    for c in v.iter() {
        if c.abs() > TOLERANCE {
            return if *c < 0.0 { -v } else { v };
        }
    }
    v
}

/// Expands `(p - c)^T M (p - c) + k` into general-quadric coefficients.
pub(crate) fn quadric_from_form(m: &Matrix3, c: &Point3, k: f64) -> [f64; 10] {
    let mc = m * c.coords;
    [
        m[(0, 0)],
        m[(1, 1)],
        m[(2, 2)],
        2.0 * m[(0, 1)],
        2.0 * m[(1, 2)],
        2.0 * m[(0, 2)],
        -2.0 * mc.x,
        -2.0 * mc.y,
        -2.0 * mc.z,
        c.coords.dot(&mc) + k,
    ]
}

/// Evaluates general-quadric coefficients at `p`.
#[must_use]
pub fn eval_quadric(q: &[f64; 10], p: &Point3) -> f64 {
    let (x, y, z) = (p.x, p.y, p.z);
    q[0] * x * x
        + q[1] * y * y
        + q[2] * z * z
        + q[3] * x * y
        + q[4] * y * z
        + q[5] * z * x
        + q[6] * x
        + q[7] * y
        + q[8] * z
        + q[9]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn canonical_direction_flips_negative_leading_component() {
        assert_eq!(canonical_direction(-Vector3::y()), Vector3::y());
        assert_eq!(canonical_direction(Vector3::new(0.0, -1.0, 1.0)), Vector3::new(0.0, 1.0, -1.0));
        assert_eq!(canonical_direction(Vector3::x()), Vector3::x());
    }

    #[test]
    fn side_respects_tolerance() {
        let s: Surface = Plane::new(Point3::origin(), Vector3::x()).unwrap().into();
        assert_eq!(s.side(&Point3::new(1.0, 0.0, 0.0), 1e-5), 1);
        assert_eq!(s.side(&Point3::new(-1.0, 0.0, 0.0), 1e-5), -1);
        assert_eq!(s.side(&Point3::new(1e-7, 0.0, 0.0), 1e-5), 0);
    }

    #[test]
    fn different_kinds_never_equal() {
        let a: Surface = Sphere::new(Point3::origin(), 1.0).unwrap().into();
        let b: Surface = Cylinder::new(Point3::origin(), Vector3::z(), 1.0).unwrap().into();
        assert!(!a.approx_eq(&b, 1e-5));
        assert!(a.approx_eq(&a.clone(), 1e-5));
        assert_eq!(a.orientation(&b, 1e-5), None);
    }

    #[test]
    fn only_planes_match_reversed() {
        let up: Surface = Plane::new(Point3::origin(), Vector3::z()).unwrap().into();
        let down: Surface = Plane::new(Point3::origin(), -Vector3::z()).unwrap().into();
        assert_eq!(up.orientation(&down, 1e-5), Some(-1));
        assert!(!up.approx_eq(&down, 1e-5));
        let a: Surface = Cylinder::new(Point3::origin(), Vector3::z(), 1.0).unwrap().into();
        let b: Surface = Cylinder::new(Point3::origin(), -Vector3::z(), 1.0).unwrap().into();
        assert_eq!(a.orientation(&b, 1e-5), Some(1));
    }

    #[test]
    fn sphere_quadric_form() {
        let q = quadric_from_form(&Matrix3::identity(), &Point3::new(1.0, 0.0, 0.0), -4.0);
        assert!((eval_quadric(&q, &Point3::new(3.0, 0.0, 0.0))).abs() < 1e-12);
        assert!(eval_quadric(&q, &Point3::new(1.0, 0.0, 0.0)) < 0.0);
    }
}
