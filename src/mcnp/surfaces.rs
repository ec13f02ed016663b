use crate::geometry::{Cone, Cylinder, Plane, Surface, SurfaceRegistry};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{card, num};

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Index of the coordinate axis `v` lies along, if any.
fn axis_index(v: &Vector3) -> Option<usize> {
    (0..3).find(|&i| (v[i].abs() - 1.0).abs() < TOLERANCE)
}

/// The two coordinates of `p` perpendicular to axis `i`.
fn off_axis(p: &Point3, i: usize) -> [f64; 2] {
    match i {
        0 => [p.y, p.z],
        1 => [p.x, p.z],
        _ => [p.x, p.y],
    }
}

fn gq(q: &[f64; 10]) -> (String, Vec<f64>) {
    ("gq".to_string(), q.to_vec())
}

/// `px`/`py`/`pz` face the positive axis, so a plane facing the negative
/// axis keeps its sense only in the general form.
fn plane(p: &Plane) -> (String, Vec<f64>) {
    let n = p.normal();
    match axis_index(n).filter(|&i| n[i] > 0.0) {
        Some(i) => (format!("p{}", AXES[i]), vec![p.distance()]),
        None => ("p".to_string(), vec![n.x, n.y, n.z, p.distance()]),
    }
}

fn cylinder(c: &Cylinder) -> (String, Vec<f64>) {
    let Some(i) = axis_index(c.axis()) else {
        return gq(&c.general_quadric());
    };
    let [u, v] = off_axis(c.centre(), i);
    if u.abs() < TOLERANCE && v.abs() < TOLERANCE {
        (format!("c{}", AXES[i]), vec![c.radius()])
    } else {
        (format!("c/{}", AXES[i]), vec![u, v, c.radius()])
    }
}

fn cone(k: &Cone) -> (String, Vec<f64>) {
    let Some(i) = axis_index(k.axis()) else {
        return gq(&k.general_quadric());
    };
    let apex = k.apex();
    let [u, v] = off_axis(apex, i);
    if u.abs() < TOLERANCE && v.abs() < TOLERANCE {
        (format!("k{}", AXES[i]), vec![apex[i], k.tan_squared()])
    } else {
        (
            format!("k/{}", AXES[i]),
            vec![apex.x, apex.y, apex.z, k.tan_squared()],
        )
    }
}

/// MCNP mnemonic and parameters of one surface.
#[must_use]
pub fn surface_card(surface: &Surface) -> (String, Vec<f64>) {
    match surface {
        Surface::Plane(p) => plane(p),
        Surface::Cylinder(c) => cylinder(c),
        Surface::Sphere(s) => {
            let c = s.centre();
            if c.coords.norm() < TOLERANCE {
                ("so".to_string(), vec![s.radius()])
            } else {
                ("s".to_string(), vec![c.x, c.y, c.z, s.radius()])
            }
        }
        Surface::Cone(k) => cone(k),
    }
}

/// Writes one card per canonical surface, in handle order.
#[must_use]
pub fn write_surfaces(registry: &SurfaceRegistry) -> String {
    let mut out = String::new();
    for (handle, surface) in registry.iter() {
        let (mnemonic, params) = surface_card(surface);
        let mut tokens = vec![handle.to_string(), mnemonic];
        tokens.extend(params.into_iter().map(num));
        out.push_str(&card(&tokens));
    }
    out
}
