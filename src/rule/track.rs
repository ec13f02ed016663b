use crate::error::{GeometryError, Result};
use crate::geometry::SurfaceRegistry;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::HeadRule;

/// First boundary crossing of a line with a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct LineIntercept {
    /// Distance from the line origin along the (unit) direction.
    pub distance: f64,
    /// Crossed surface, signed by the side the line moves into.
    pub surface: i32,
    /// Crossing point.
    pub point: Point3,
}

impl HeadRule {
    /// Follows the ray `origin + t * dir` (`t > 0`) and returns the first
    /// point where membership of the rule changes.
    ///
    /// Only crossings of surfaces used by the rule are considered, and a
    /// crossing counts only if the rule evaluates differently just before
    /// and just after it.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is zero-length or a surface is unknown.
    pub fn track_line(
        &self,
        registry: &SurfaceRegistry,
        origin: &Point3,
        dir: &Vector3,
    ) -> Result<Option<LineIntercept>> {
        let len = dir.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let dir = dir / len;
        let step = registry.tolerance() * 10.0;

        let mut candidates: Vec<(f64, i32)> = Vec::new();
        for handle in self.surfaces() {
            let surface = registry.surface(handle)?;
            candidates.extend(
                surface
                    .line_intersect(origin, &dir)
                    .into_iter()
                    .filter(|t| *t > step)
                    .map(|t| (t, handle)),
            );
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (t, handle) in candidates {
            let before = origin + dir * (t - step);
            let after = origin + dir * (t + step);
            if self.is_valid(registry, &before)? != self.is_valid(registry, &after)? {
                let side = registry.surface(handle)?.value(&after).signum();
                #[allow(clippy::cast_possible_truncation)]
                let surface = handle * side as i32;
                return Ok(Some(LineIntercept {
                    distance: t,
                    surface,
                    point: origin + dir * t,
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::test_registry;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exits_cylinder_before_sphere() {
        let reg = test_registry();
        let hr = HeadRule::parse("-4 -5").unwrap();
        let hit = hr
            .track_line(&reg, &Point3::origin(), &Vector3::new(2.0, 0.0, 0.0))
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-9);
        assert_eq!(hit.surface, 5);
        assert_relative_eq!(hit.point, Point3::new(3.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn crossing_that_does_not_change_membership_is_skipped() {
        let reg = test_registry();
        // Plane x=2 splits the region but both sides are inside
        let hr = HeadRule::parse("-4 (6 : -6)").unwrap();
        let hit = hr
            .track_line(&reg, &Point3::origin(), &Vector3::x())
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-9);
        assert_eq!(hit.surface, 4);
    }

    #[test]
    fn entering_from_outside() {
        let reg = test_registry();
        let hr = HeadRule::parse("-4").unwrap();
        let hit = hr
            .track_line(&reg, &Point3::new(-10.0, 0.0, 0.0), &Vector3::x())
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-9);
        assert_eq!(hit.surface, -4);
    }

    #[test]
    fn no_crossing() {
        let reg = test_registry();
        let hr = HeadRule::parse("1").unwrap();
        let miss = hr
            .track_line(&reg, &Point3::new(1.0, 0.0, 0.0), &Vector3::y())
            .unwrap();
        assert!(miss.is_none());
        assert!(hr.track_line(&reg, &Point3::origin(), &Vector3::zeros()).is_err());
    }
}
