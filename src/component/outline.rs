use tracing::debug;

use crate::cell::CellTable;
use crate::error::Result;
use crate::geometry::SurfaceRegistry;
use crate::math::Point3;
use crate::rule::HeadRule;

/// Outer boundary of a component and the cells it must be carved out of.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    outer: HeadRule,
    insert_cells: Vec<i32>,
}

impl Outline {
    /// Creates an outline with no boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The boundary rule (region occupied by the component).
    #[must_use]
    pub fn outer(&self) -> &HeadRule {
        &self.outer
    }

    /// True once a boundary has been set.
    #[must_use]
    pub fn has_outer(&self) -> bool {
        !self.outer.is_empty()
    }

    /// Replaces the boundary.
    pub fn set_outer(&mut self, rule: HeadRule) {
        self.outer = rule;
    }

    /// Intersects `rule` into the boundary.
    pub fn add_outer_surf(&mut self, rule: &HeadRule) {
        self.outer.add_intersection(rule);
    }

    /// Unions `rule` into the boundary.
    pub fn add_outer_union(&mut self, rule: &HeadRule) {
        self.outer.add_union(rule);
    }

    /// The complement of the boundary: what containing cells must AND in.
    #[must_use]
    pub fn exclude(&self) -> HeadRule {
        self.outer.complement()
    }

    /// Adds a containing cell.
    pub fn add_insert_cell(&mut self, cell: i32) {
        if !self.insert_cells.contains(&cell) {
            self.insert_cells.push(cell);
        }
    }

    /// Adds several containing cells.
    pub fn add_insert_cells(&mut self, cells: impl IntoIterator<Item = i32>) {
        for cell in cells {
            self.add_insert_cell(cell);
        }
    }

    /// Containing cells.
    #[must_use]
    pub fn insert_cells(&self) -> &[i32] {
        &self.insert_cells
    }

    /// Carves the component out of every containing cell.
    ///
    /// # Errors
    ///
    /// Returns an error if a containing cell does not exist.
    pub fn insert_objects(&self, cells: &mut CellTable) -> Result<()> {
        if !self.has_outer() {
            return Ok(());
        }
        let exclude = self.exclude();
        for &cell in &self.insert_cells {
            cells.add_intersection(cell, &exclude)?;
            debug!(cell, rule = %exclude, "void inserted");
        }
        Ok(())
    }

    /// True when `point` lies outside the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary uses an unknown surface.
    pub fn is_outside(&self, registry: &SurfaceRegistry, point: &Point3) -> Result<bool> {
        if !self.has_outer() {
            return Ok(true);
        }
        Ok(!self.outer.is_valid(registry, point)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rule::tests::test_registry;

    #[test]
    fn insert_carves_void() {
        let reg = test_registry();
        let mut cells = CellTable::new();
        cells.make_cell("World", 2, 0, 0.0, HeadRule::parse("-4").unwrap()).unwrap();

        let mut outline = Outline::new();
        outline.add_outer_surf(&HeadRule::parse("-5").unwrap());
        outline.add_outer_surf(&HeadRule::parse("1").unwrap());
        outline.add_insert_cells([2, 2]);
        assert_eq!(outline.insert_cells(), &[2]);
        outline.insert_objects(&mut cells).unwrap();

        let world = cells.object(2).unwrap();
        assert_eq!(world.rule().to_string(), "-4 (5 : -1)");
        let inside = Point3::new(1.0, 0.0, 0.0);
        let outside = Point3::new(-1.0, 0.0, 0.0);
        assert!(!world.is_valid(&reg, &inside).unwrap());
        assert!(world.is_valid(&reg, &outside).unwrap());
        assert!(!outline.is_outside(&reg, &inside).unwrap());
        assert!(outline.is_outside(&reg, &outside).unwrap());
    }

    #[test]
    fn union_into_empty_boundary() {
        let mut outline = Outline::new();
        assert!(outline.is_outside(&test_registry(), &Point3::origin()).unwrap());
        outline.add_outer_union(&HeadRule::from_surf(-4));
        outline.add_outer_union(&HeadRule::from_surf(-5));
        assert_eq!(outline.outer().to_string(), "-4 : -5");
        assert_eq!(outline.exclude().to_string(), "4 5");
    }

    #[test]
    fn missing_insert_cell() {
        let mut outline = Outline::new();
        outline.set_outer(HeadRule::from_surf(-4));
        outline.add_insert_cell(99);
        assert!(outline.insert_objects(&mut CellTable::new()).is_err());
    }
}
