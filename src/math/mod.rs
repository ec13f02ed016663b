/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix type.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Tolerance for degeneracy checks (zero-length vectors, zero radii).
pub const TOLERANCE: f64 = 1e-10;

/// Default tolerance for surface equality and point-on-surface tests.
pub const SURFACE_TOLERANCE: f64 = 1e-5;

/// Builds a rotation matrix around a unit axis by an angle (Rodrigues).
#[allow(clippy::many_single_char_names, clippy::let_and_return)]
#[must_use]
pub fn rotation_matrix(axis: &Vector3, angle: f64) -> Matrix3 {
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    #[rustfmt::skip]
    let m = Matrix3::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,
    );
    m
}

/// Rotates `v` about the unit `axis` by `degrees`.
#[must_use]
pub fn rotate_deg(v: &Vector3, axis: &Vector3, degrees: f64) -> Vector3 {
    rotation_matrix(axis, degrees.to_radians()) * v
}

/// Returns a unit vector perpendicular to `dir`.
#[must_use]
pub fn any_perpendicular(dir: &Vector3) -> Vector3 {
    // Choose a reference vector not parallel to dir
    let reference = if dir.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    dir.cross(&reference).normalize()
}

/// Real roots of `a t^2 + b t + c = 0`, ascending. Degenerates to the
/// linear case when `a` vanishes.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < TOLERANCE {
        if b.abs() < TOLERANCE {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let root = disc.sqrt();
    // Numerically stable form
    let q = -0.5 * (b + b.signum() * root);
    let mut roots = if q.abs() < TOLERANCE {
        vec![-b / (2.0 * a)]
    } else {
        vec![q / a, c / q]
    };
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|x, y| (*x - *y).abs() < TOLERANCE);
    roots
}

/// True when `a` and `b` agree within an absolute-or-relative tolerance.
#[must_use]
pub fn near(a: f64, b: f64, tol: f64) -> bool {
    let diff = (a - b).abs();
    diff <= tol || diff <= tol * a.abs().max(b.abs())
}

/// True when two vectors agree component-wise within `tol`.
#[must_use]
pub fn near_vec(a: &Vector3, b: &Vector3, tol: f64) -> bool {
    (a - b).norm() <= tol
}
