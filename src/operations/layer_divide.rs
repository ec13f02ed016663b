use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{Cylinder, Plane, Sphere, Surface};
use crate::math::{near_vec, TOLERANCE};
use crate::simulation::Simulation;

/// Splits one cell into layers between two of its bounding surfaces.
///
/// The cell rule must contain the signed literals `inner` and `outer`.
/// Intermediate surfaces are interpolated between them at each fraction
/// (planes by offset, cylinders and spheres by radius) and each layer gets
/// the original rule with the two bounds swapped for its own pair. The
/// first layer keeps the original cell number; the others are drawn from
/// `owner`'s cell range.
pub struct LayerDivide {
    cell: i32,
    owner: String,
    inner: i32,
    outer: i32,
    fractions: Vec<f64>,
    materials: Vec<Option<i32>>,
    surf_start: i32,
}

impl LayerDivide {
    /// Creates a new `LayerDivide` operation. New surfaces are registered
    /// from handle `surf_start` upwards.
    #[must_use]
    pub fn new(cell: i32, owner: &str, inner: i32, outer: i32, surf_start: i32) -> Self {
        Self {
            cell,
            owner: owner.to_string(),
            inner,
            outer,
            fractions: Vec::new(),
            materials: Vec::new(),
            surf_start,
        }
    }

    /// Adds a layer boundary at `fraction` of the way from inner to outer,
    /// with `material` for the layer beyond it (`None` keeps the cell's).
    #[must_use]
    pub fn add_layer(mut self, fraction: f64, material: Option<i32>) -> Self {
        self.fractions.push(fraction);
        self.materials.push(material);
        self
    }

    /// Surface at fraction `f` from `a` to `b`, facing like `a`, and the
    /// sign that turns a literal of `b` into the same side of the result.
    fn interpolate(&self, a: &Surface, b: &Surface, f: f64) -> Result<(Surface, i32)> {
        let mismatch = || {
            GeometryError::Degenerate(format!(
                "cannot interpolate between surfaces {} and {}",
                self.inner, self.outer
            ))
        };
        let out = match (a, b) {
            (Surface::Plane(p), Surface::Plane(q)) => {
                let (q, sign) = if near_vec(p.normal(), q.normal(), TOLERANCE) {
                    (q.clone(), 1)
                } else if near_vec(p.normal(), &-q.normal(), TOLERANCE) {
                    (q.flipped(), -1)
                } else {
                    return Err(mismatch().into());
                };
                let d = p.distance() + f * (q.distance() - p.distance());
                (Plane::new((p.normal() * d).into(), *p.normal())?.into(), sign)
            }
            (Surface::Cylinder(p), Surface::Cylinder(q))
                if near_vec(p.axis(), q.axis(), TOLERANCE)
                    && (q.centre() - p.centre()).cross(p.axis()).norm() < TOLERANCE =>
            {
                let r = p.radius() + f * (q.radius() - p.radius());
                (Cylinder::new(*p.centre(), *p.axis(), r)?.into(), 1)
            }
            (Surface::Sphere(p), Surface::Sphere(q)) if (p.centre() - q.centre()).norm() < TOLERANCE => {
                let r = p.radius() + f * (q.radius() - p.radius());
                (Sphere::new(*p.centre(), r)?.into(), 1)
            }
            _ => return Err(mismatch().into()),
        };
        Ok(out)
    }

    fn check(&self, sim: &Simulation, inner: i32, outer: i32) -> Result<()> {
        let rule = sim.cells.object(self.cell)?.rule();
        for handle in [inner, outer] {
            if !rule.contains_surf(handle) {
                return Err(GeometryError::Degenerate(format!(
                    "cell {} does not use surface {handle}",
                    self.cell
                ))
                .into());
            }
        }
        let mut last = 0.0;
        for &f in &self.fractions {
            if f <= last || f >= 1.0 {
                return Err(GeometryError::Degenerate(format!(
                    "layer fractions must increase within (0, 1), got {f}"
                ))
                .into());
            }
            last = f;
        }
        Ok(())
    }

    /// Executes the operation, returning the layer cells from inner to outer.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell is missing, does not use both bounding
    /// surfaces, the bounds cannot be interpolated or a new handle conflicts.
    pub fn execute(&self, sim: &mut Simulation) -> Result<Vec<i32>> {
        let inner_surf = sim.registry.real_surf(self.inner)?;
        let outer_surf = sim.registry.real_surf(self.outer)?;
        self.check(sim, inner_surf, outer_surf)?;
        let n_bounds = i32::try_from(self.fractions.len()).unwrap_or(i32::MAX);
        sim.groups
            .check_surf_span(&self.owner, self.surf_start, n_bounds)?;

        let base = sim.cells.object(self.cell)?.rule().clone();
        let material = sim.cells.mat_id(self.cell)?;
        let temperature = sim.cells.temperature(self.cell)?;
        let inner = sim.registry.surface(inner_surf)?.clone();
        let outer = sim.registry.surface(outer_surf)?.clone();

        let mut bounds = Vec::with_capacity(self.fractions.len());
        for (i, &f) in (0_i32..).zip(&self.fractions) {
            let (surface, outer_sign) = self.interpolate(&inner, &outer, f)?;
            let handle = sim.registry.register(self.surf_start + i, surface)?;
            bounds.push((handle, handle * outer_sign));
        }

        let mut cells = Vec::with_capacity(bounds.len() + 1);
        for layer in 0..=bounds.len() {
            let mut rule = base.clone();
            if layer > 0 {
                rule = rule.substitute_surf(inner_surf, bounds[layer - 1].0);
            }
            if let Some(&(_, b)) = bounds.get(layer) {
                rule = rule.substitute_surf(outer_surf, b);
            }
            let mat = match layer {
                0 => material,
                _ => self.materials[layer - 1].unwrap_or(material),
            };
            let cell = if layer == 0 {
                let obj = sim.cells.object_mut(self.cell)?;
                obj.set_rule(rule);
                self.cell
            } else {
                let cell = sim.groups.cell(&self.owner)?;
                sim.cells
                    .make_cell(&self.owner, cell, mat, temperature, rule)?;
                cell
            };
            cells.push(cell);
        }
        debug!(cell = self.cell, layers = cells.len(), "cell divided");
        Ok(cells)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::rule::HeadRule;

    fn shell() -> Simulation {
        let mut sim = Simulation::new();
        sim.groups.add_object("Shield").unwrap();
        sim.registry
            .build_cylinder(10001, Point3::origin(), Vector3::y(), 2.0)
            .unwrap();
        sim.registry
            .build_cylinder(10002, Point3::origin(), Vector3::y(), 6.0)
            .unwrap();
        sim.registry
            .build_plane(10003, Point3::origin(), Vector3::y())
            .unwrap();
        let cell = sim.groups.cell("Shield").unwrap();
        sim.cells
            .make_cell("Shield", cell, 5, 300.0, HeadRule::parse("10001 -10002 10003").unwrap())
            .unwrap();
        sim
    }

    #[test]
    fn cylinder_shell_in_three_layers() {
        let mut sim = shell();
        let cells = LayerDivide::new(10000, "Shield", 10001, -10002, 10011)
            .add_layer(0.25, Some(7))
            .add_layer(0.5, None)
            .execute(&mut sim)
            .unwrap();
        assert_eq!(cells, vec![10000, 10001, 10002]);

        let at = |r: f64| sim.find_cell(&Point3::new(r, 1.0, 0.0)).unwrap();
        assert_eq!(at(2.5), Some(10000));
        assert_eq!(at(3.5), Some(10001));
        assert_eq!(at(5.0), Some(10002));
        assert_eq!(at(7.0), None);

        assert_eq!(sim.cells.mat_id(10001).unwrap(), 7);
        assert_eq!(sim.cells.mat_id(10002).unwrap(), 5);
        assert!((sim.cells.temperature(10002).unwrap() - 300.0).abs() < f64::EPSILON);
        assert_eq!(
            sim.cells.object(10001).unwrap().rule().to_string(),
            "10011 -10012 10003"
        );
    }

    #[test]
    fn rejects_bad_input() {
        let mut sim = shell();
        assert!(LayerDivide::new(10000, "Shield", 10001, -10003, 10011)
            .add_layer(0.5, None)
            .execute(&mut sim)
            .is_err());
        assert!(LayerDivide::new(10000, "Shield", 10001, -10002, 10011)
            .add_layer(0.6, None)
            .add_layer(0.4, None)
            .execute(&mut sim)
            .is_err());
        assert!(LayerDivide::new(10000, "Shield", 10001, 10003, 10011)
            .add_layer(0.5, None)
            .execute(&mut sim)
            .is_err());
    }

    #[test]
    fn new_surfaces_stay_in_the_owner_span() {
        let mut sim = shell();
        let result = LayerDivide::new(10000, "Shield", 10001, -10002, 19999)
            .add_layer(0.25, None)
            .add_layer(0.5, None)
            .execute(&mut sim);
        assert!(matches!(
            result,
            Err(crate::KernelError::Geometry(GeometryError::SurfaceOutOfRange {
                handle: 20000,
                ..
            }))
        ));
        assert!(sim.registry.surface(19999).is_err());
        assert_eq!(sim.cells.len(), 1);
    }
}
