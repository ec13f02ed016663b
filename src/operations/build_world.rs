use tracing::debug;

use crate::error::Result;
use crate::frame::Frame;
use crate::geometry::Sphere;
use crate::math::Point3;
use crate::rule::HeadRule;
use crate::simulation::Simulation;

/// Name under which the world cells are registered.
pub const WORLD: &str = "World";
/// Cell outside the world sphere.
pub const OUTER_CELL: i32 = 1;
/// Cell inside the world sphere that components are inserted into.
pub const INNER_CELL: i32 = 2;
/// Handle of the world sphere.
pub const WORLD_SURF: i32 = 1;

/// Creates the bounding sphere of a model and its two cells.
///
/// The world owns the fixed cell range below the first quantum, so every
/// allocated component block starts at one quantum or above.
pub struct BuildWorld {
    radius: f64,
    material: i32,
}

impl BuildWorld {
    /// Creates a new `BuildWorld` operation with a void interior.
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            material: 0,
        }
    }

    /// Fills the interior with `material` instead of void.
    #[must_use]
    pub fn with_material(mut self, material: i32) -> Self {
        self.material = material;
        self
    }

    /// Executes the operation, returning the world frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive or the world already exists.
    pub fn execute(&self, sim: &mut Simulation) -> Result<Frame> {
        let sphere = Sphere::new(Point3::origin(), self.radius)?;
        let size = (sim.groups.quantum() - 1).max(INNER_CELL);
        sim.groups.add_fixed_range(WORLD, 1, size)?;
        let surf = sim.registry.register(WORLD_SURF, sphere.into())?;

        sim.cells
            .make_cell(WORLD, OUTER_CELL, 0, 0.0, HeadRule::from_surf(surf))?;
        sim.cells.make_cell(
            WORLD,
            INNER_CELL,
            self.material,
            0.0,
            HeadRule::from_surf(-surf),
        )?;
        sim.groups.add_cell(WORLD, OUTER_CELL)?;
        sim.groups.add_cell(WORLD, INNER_CELL)?;

        let frame = Frame::world();
        sim.groups.set_frame(WORLD, frame.clone())?;
        debug!(radius = self.radius, "world built");
        Ok(frame)
    }
}
