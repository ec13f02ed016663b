mod object;

pub use object::Object;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CellError, GeometryError, Result};
use crate::geometry::SurfaceRegistry;
use crate::math::Point3;
use crate::rule::HeadRule;

/// Every cell of a model, ordered by cell number.
///
/// Cells are created once and afterwards only mutated through
/// [`CellTable::add_intersection`] when a later component carves its void
/// out of them.
#[derive(Debug, Default)]
pub struct CellTable {
    cells: BTreeMap<i32, Object>,
}

impl CellTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Creates a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if `cell` is already taken.
    pub fn make_cell(
        &mut self,
        name: &str,
        cell: i32,
        material: i32,
        temperature: f64,
        rule: HeadRule,
    ) -> Result<&Object> {
        if self.cells.contains_key(&cell) {
            return Err(CellError::DuplicateCell(cell).into());
        }
        debug!(name, cell, material, rule = %rule, "cell created");
        Ok(self
            .cells
            .entry(cell)
            .or_insert_with(|| Object::new(name, cell, material, temperature, rule)))
    }

    /// Removes a cell, returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn remove_cell(&mut self, cell: i32) -> Result<Object> {
        self.cells
            .remove(&cell)
            .ok_or_else(|| CellError::CellNotFound(cell).into())
    }

    /// True when the cell exists.
    #[must_use]
    pub fn contains(&self, cell: i32) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Returns a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn object(&self, cell: i32) -> Result<&Object> {
        self.cells
            .get(&cell)
            .ok_or_else(|| CellError::CellNotFound(cell).into())
    }

    /// Returns a cell mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn object_mut(&mut self, cell: i32) -> Result<&mut Object> {
        self.cells
            .get_mut(&cell)
            .ok_or_else(|| CellError::CellNotFound(cell).into())
    }

    /// ANDs `rule` into an existing cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn add_intersection(&mut self, cell: i32, rule: &HeadRule) -> Result<()> {
        self.object_mut(cell)?.add_intersection(rule);
        Ok(())
    }

    /// Material id of a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn mat_id(&self, cell: i32) -> Result<i32> {
        Ok(self.object(cell)?.material())
    }

    /// Temperature of a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn temperature(&self, cell: i32) -> Result<f64> {
        Ok(self.object(cell)?.temperature())
    }

    /// Iterates over all cells in number order.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.cells.values()
    }

    /// Replaces surface `old` by `new` in every cell.
    ///
    /// # Errors
    ///
    /// Returns an error if `new` is not registered.
    pub fn substitute_surf(
        &mut self,
        registry: &SurfaceRegistry,
        old: i32,
        new: i32,
    ) -> Result<usize> {
        if !registry.contains(new) {
            return Err(GeometryError::SurfaceNotFound(new).into());
        }
        let mut changed = 0;
        for obj in self.cells.values_mut() {
            if obj.rule().surfaces().contains(&old.abs()) {
                obj.substitute_surf(old, new);
                changed += 1;
            }
        }
        debug!(old, new, changed, "surface substituted");
        Ok(changed)
    }

    /// First cell (in number order) containing `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule references an unknown surface.
    pub fn find_cell(&self, registry: &SurfaceRegistry, point: &Point3) -> Result<Option<i32>> {
        for obj in self.cells.values() {
            if obj.is_valid(registry, point)? {
                return Ok(Some(obj.cell()));
            }
        }
        Ok(None)
    }
}
