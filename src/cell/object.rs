use crate::error::Result;
use crate::geometry::SurfaceRegistry;
use crate::math::Point3;
use crate::rule::HeadRule;

/// A numbered region of space: one rule, one material, one temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    name: String,
    cell: i32,
    material: i32,
    temperature: f64,
    rule: HeadRule,
}

impl Object {
    /// Creates a new cell. Material `0` is void; a temperature of `0.0`
    /// means the transport code default.
    #[must_use]
    pub fn new(name: &str, cell: i32, material: i32, temperature: f64, rule: HeadRule) -> Self {
        Self {
            name: name.to_string(),
            cell,
            material,
            temperature,
            rule,
        }
    }

    /// Name of the component that created the cell.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell number.
    #[must_use]
    pub fn cell(&self) -> i32 {
        self.cell
    }

    /// Material id (`0` = void).
    #[must_use]
    pub fn material(&self) -> i32 {
        self.material
    }

    /// Temperature in kelvin.
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// True when the material is void.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.material == 0
    }

    /// Current defining rule.
    #[must_use]
    pub fn rule(&self) -> &HeadRule {
        &self.rule
    }

    /// Changes the material.
    pub fn set_material(&mut self, material: i32) {
        self.material = material;
    }

    /// Changes the temperature.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Replaces the rule wholesale.
    pub fn set_rule(&mut self, rule: HeadRule) {
        self.rule = rule;
    }

    /// ANDs `rule` into the cell. The region can only shrink.
    pub fn add_intersection(&mut self, rule: &HeadRule) {
        self.rule.add_intersection(rule);
    }

    /// ORs `rule` into the cell.
    pub fn add_union(&mut self, rule: &HeadRule) {
        self.rule.add_union(rule);
    }

    /// Swaps one surface for another in the rule, keeping signs.
    pub fn substitute_surf(&mut self, old: i32, new: i32) {
        self.rule = self.rule.substitute_surf(old, new);
    }

    /// True when `point` is inside the cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule references an unknown surface.
    pub fn is_valid(&self, registry: &SurfaceRegistry, point: &Point3) -> Result<bool> {
        self.rule.is_valid(registry, point)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rule::tests::{sample_points, test_registry};

    #[test]
    fn intersection_only_shrinks() {
        let reg = test_registry();
        let mut obj = Object::new("Box", 10001, 3, 300.0, HeadRule::parse("-4").unwrap());
        let before: Vec<bool> = sample_points()
            .iter()
            .map(|p| obj.is_valid(&reg, p).unwrap())
            .collect();
        obj.add_intersection(&HeadRule::parse("5 : 1").unwrap());
        for (p, was) in sample_points().iter().zip(before) {
            if obj.is_valid(&reg, p).unwrap() {
                assert!(was);
            }
        }
        assert_eq!(obj.rule().to_string(), "-4 (5 : 1)");
    }

    #[test]
    fn accessors() {
        let mut obj = Object::new("Pipe", 20003, 0, 0.0, HeadRule::new());
        assert!(obj.is_void());
        obj.set_material(7);
        obj.set_temperature(20.0);
        assert_eq!(obj.material(), 7);
        assert!((obj.temperature() - 20.0).abs() < f64::EPSILON);
        assert_eq!(obj.name(), "Pipe");
        assert_eq!(obj.cell(), 20003);
    }
}
