//! The model under construction.

use tracing::debug;

use crate::cell::CellTable;
use crate::error::Result;
use crate::frame::Frame;
use crate::geometry::SurfaceRegistry;
use crate::groups::ObjectGroups;
use crate::math::Point3;
use crate::vars::MaterialDatabase;

/// Every registry a component build reads from or writes into.
///
/// The fields are public so that a build step can borrow, say, the
/// registry immutably while it adds cells to the table.
#[derive(Debug, Default)]
pub struct Simulation {
    pub registry: SurfaceRegistry,
    pub cells: CellTable,
    pub groups: ObjectGroups,
    pub materials: MaterialDatabase,
}

impl Simulation {
    /// Creates an empty model with default tolerance and quantum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty model with an explicit surface tolerance and
    /// cell-block quantum.
    #[must_use]
    pub fn with_settings(tolerance: f64, quantum: i32) -> Self {
        Self {
            registry: SurfaceRegistry::with_tolerance(tolerance),
            cells: CellTable::new(),
            groups: ObjectGroups::with_quantum(quantum),
            materials: MaterialDatabase::new(),
        }
    }

    /// Replaces the material table.
    #[must_use]
    pub fn with_materials(mut self, materials: MaterialDatabase) -> Self {
        self.materials = materials;
        self
    }

    /// Copy of the stored frame of a finished component, used as the
    /// parent of the next one.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is unknown or unfinished.
    pub fn link_frame(&self, name: &str) -> Result<Frame> {
        Ok(self.groups.frame(name)?.clone())
    }

    /// First cell containing `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if a cell rule uses an unknown surface.
    pub fn find_cell(&self, point: &Point3) -> Result<Option<i32>> {
        self.cells.find_cell(&self.registry, point)
    }

    /// Deletes a cell and drops it from the active set.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn remove_cell(&mut self, cell: i32) -> Result<()> {
        self.cells.remove_cell(cell)?;
        self.groups.deactivate(cell);
        debug!(cell, "cell removed");
        Ok(())
    }

    /// Active cells, in number order.
    pub fn active_cells(&self) -> impl Iterator<Item = i32> + '_ {
        self.groups
            .active_cells()
            .filter(|c| self.cells.contains(*c))
    }
}
