//! Building blocks shared by every component generator.
//!
//! A generator owns a [`ComponentCore`] and implements [`Buildable`]. The
//! core carries the component's frame, outer boundary, named cells, named
//! surfaces and external cuts, plus the [`BuildStage`] that enforces the
//! build order:
//!
//! ```text
//! Unpopulated -> Populated -> UnitVectorSet -> SurfacesBuilt
//!             -> ObjectsBuilt -> LinksBuilt -> Inserted
//! ```

mod cut;
mod index;
mod outline;

pub use cut::CutSet;
pub use index::{CellIndex, SurfaceIndex};
pub use outline::Outline;

use tracing::{debug, info};

use crate::error::{GeometryError, GroupError, OrderingError, Result, ResultExt};
use crate::frame::{Frame, FrameOffset};
use crate::groups::ComponentId;
use crate::math::{Point3, Vector3};
use crate::rule::HeadRule;
use crate::simulation::Simulation;
use crate::vars::FuncDataBase;

/// Position of a component in its build lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BuildStage {
    #[default]
    Unpopulated,
    Populated,
    UnitVectorSet,
    SurfacesBuilt,
    ObjectsBuilt,
    LinksBuilt,
    Inserted,
}

impl BuildStage {
    /// The stage that must follow this one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Unpopulated => Some(Self::Populated),
            Self::Populated => Some(Self::UnitVectorSet),
            Self::UnitVectorSet => Some(Self::SurfacesBuilt),
            Self::SurfacesBuilt => Some(Self::ObjectsBuilt),
            Self::ObjectsBuilt => Some(Self::LinksBuilt),
            Self::LinksBuilt => Some(Self::Inserted),
            Self::Inserted => None,
        }
    }
}

/// State shared by every component.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    key: String,
    id: Option<ComponentId>,
    build_index: i32,
    surf_span: i32,
    stage: BuildStage,
    frame: Frame,
    outline: Outline,
    cell_map: CellIndex,
    surf_map: SurfaceIndex,
    cuts: CutSet,
}

impl ComponentCore {
    /// Creates an unregistered core with `n_links` link slots.
    #[must_use]
    pub fn new(key: &str, n_links: usize) -> Self {
        Self {
            key: key.to_string(),
            id: None,
            build_index: 0,
            surf_span: 0,
            stage: BuildStage::Unpopulated,
            frame: Frame::new(key, n_links),
            outline: Outline::new(),
            cell_map: CellIndex::new(key),
            surf_map: SurfaceIndex::new(key),
            cuts: CutSet::new(key),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn id(&self) -> Option<ComponentId> {
        self.id
    }

    /// Offset added to local surface numbers; also the first cell number.
    #[must_use]
    pub fn build_index(&self) -> i32 {
        self.build_index
    }

    #[must_use]
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    #[must_use]
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn outline_mut(&mut self) -> &mut Outline {
        &mut self.outline
    }

    #[must_use]
    pub fn cell_map(&self) -> &CellIndex {
        &self.cell_map
    }

    pub fn cell_map_mut(&mut self) -> &mut CellIndex {
        &mut self.cell_map
    }

    #[must_use]
    pub fn surf_map(&self) -> &SurfaceIndex {
        &self.surf_map
    }

    pub fn surf_map_mut(&mut self) -> &mut SurfaceIndex {
        &mut self.surf_map
    }

    #[must_use]
    pub fn cuts(&self) -> &CutSet {
        &self.cuts
    }

    pub fn cuts_mut(&mut self) -> &mut CutSet {
        &mut self.cuts
    }

    /// Registers the component name and reserves its first cell block.
    /// Registering twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if another component already uses the name.
    pub fn register(&mut self, sim: &mut Simulation) -> Result<()> {
        if self.id.is_some() {
            return Ok(());
        }
        let id = sim.groups.add_object(&self.key)?;
        self.build_index = sim.groups.build_index(&self.key)?;
        let (start, end) = sim.groups.surf_span(&self.key)?;
        self.surf_span = end - start;
        self.id = Some(id);
        debug!(component = %self.key, build_index = self.build_index, "component registered");
        Ok(())
    }

    /// Moves to `stage`, which must directly follow the current stage.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderingError`] when steps are skipped or repeated, and
    /// a group error when surfaces are about to be built before the
    /// component is registered.
    pub fn advance(&mut self, stage: BuildStage) -> Result<()> {
        if self.stage.next() != Some(stage) {
            return Err(OrderingError {
                component: self.key.clone(),
                attempted: stage,
                current: self.stage,
            }
            .into());
        }
        if stage == BuildStage::SurfacesBuilt && self.id.is_none() {
            return Err(GroupError::NameNotFound(self.key.clone()).into());
        }
        self.stage = stage;
        Ok(())
    }

    /// Reads the frame offset variables `<key>XStep`, `<key>XYAngle`, ...
    ///
    /// # Errors
    ///
    /// Returns an error if one of them is not numeric.
    pub fn populate_offset(&mut self, vars: &FuncDataBase) -> Result<()> {
        let offset = FrameOffset::populate(vars, &self.key)?;
        self.frame.set_offset(offset);
        Ok(())
    }

    /// Global handle of local surface `local`.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not registered or `local` would
    /// leave the component's own block of handles.
    pub fn surf(&self, local: i32) -> Result<i32> {
        if self.id.is_none() {
            return Err(GroupError::NameNotFound(self.key.clone()).into());
        }
        if !(0..self.surf_span).contains(&local) {
            return Err(GeometryError::SurfaceOutOfRange {
                owner: self.key.clone(),
                handle: self.build_index.saturating_add(local),
                start: self.build_index,
                end: self.build_index + self.surf_span,
            }
            .into());
        }
        Ok(self.build_index + local)
    }

    /// Parses a rule written with local surface numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse, uses a local number
    /// outside the component's block or names an unbuilt surface.
    pub fn composite(&self, sim: &Simulation, expr: &str) -> Result<HeadRule> {
        let local = HeadRule::parse(expr)?;
        for n in local.surfaces() {
            self.surf(n)?;
        }
        local.with_offset(self.build_index).resolve(&sim.registry)
    }

    /// Registers a plane at local number `local`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane is degenerate or the handle conflicts.
    pub fn build_plane(
        &mut self,
        sim: &mut Simulation,
        local: i32,
        point: Point3,
        normal: Vector3,
    ) -> Result<i32> {
        sim.registry.build_plane(self.surf(local)?, point, normal)
    }

    /// Registers a cylinder at local number `local`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cylinder is degenerate or the handle conflicts.
    pub fn build_cylinder(
        &mut self,
        sim: &mut Simulation,
        local: i32,
        centre: Point3,
        axis: Vector3,
        radius: f64,
    ) -> Result<i32> {
        sim.registry
            .build_cylinder(self.surf(local)?, centre, axis, radius)
    }

    /// Registers a sphere at local number `local`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive or the handle conflicts.
    pub fn build_sphere(
        &mut self,
        sim: &mut Simulation,
        local: i32,
        centre: Point3,
        radius: f64,
    ) -> Result<i32> {
        sim.registry.build_sphere(self.surf(local)?, centre, radius)
    }

    /// Registers a cone (half-angle in degrees) at local number `local`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cone is degenerate or the handle conflicts.
    pub fn build_cone(
        &mut self,
        sim: &mut Simulation,
        local: i32,
        apex: Point3,
        axis: Vector3,
        half_angle_deg: f64,
    ) -> Result<i32> {
        sim.registry
            .build_cone(self.surf(local)?, apex, axis, half_angle_deg)
    }

    /// Creates the next cell of this component and files it under `group`.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is unregistered or the cell
    /// number is taken.
    pub fn make_cell(
        &mut self,
        sim: &mut Simulation,
        group: &str,
        material: i32,
        temperature: f64,
        rule: HeadRule,
    ) -> Result<i32> {
        let cell = sim.groups.cell(&self.key)?;
        sim.cells
            .make_cell(&self.key, cell, material, temperature, rule)?;
        self.cell_map.add_cell(group, cell);
        Ok(cell)
    }

    /// [`ComponentCore::make_cell`] with a rule in local surface numbers,
    /// intersected with `extra`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule does not parse or the cell cannot be made.
    pub fn make_cell_expr(
        &mut self,
        sim: &mut Simulation,
        group: &str,
        material: i32,
        temperature: f64,
        expr: &str,
        extra: &HeadRule,
    ) -> Result<i32> {
        let rule = self.composite(sim, expr)? * extra.clone();
        self.make_cell(sim, group, material, temperature, rule)
    }

    /// Carves the outline out of its insert cells and publishes the frame.
    ///
    /// # Errors
    ///
    /// Returns an error if called before the links are built or an insert
    /// cell does not exist.
    pub fn insert_objects(&mut self, sim: &mut Simulation) -> Result<()> {
        self.advance(BuildStage::Inserted)?;
        self.outline.insert_objects(&mut sim.cells)?;
        sim.groups.set_frame(&self.key, self.frame.clone())?;
        Ok(())
    }
}

/// The build steps of a component generator.
///
/// Each step implementation starts with
/// [`ComponentCore::advance`] to its stage so that calling steps out of
/// order fails with an [`OrderingError`].
pub trait Buildable {
    fn core(&self) -> &ComponentCore;

    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Reads the component's variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or malformed.
    fn populate(&mut self, sim: &Simulation, vars: &FuncDataBase) -> Result<()>;

    /// Places the frame at link `side` of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order or `side` is not a link of
    /// `parent`.
    fn create_unit_vector(&mut self, parent: &Frame, side: i32) -> Result<()> {
        let core = self.core_mut();
        core.advance(BuildStage::UnitVectorSet)?;
        core.frame_mut().create_unit_vector(parent, side)
    }

    /// Registers the surfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order or a surface is degenerate.
    fn create_surfaces(&mut self, sim: &mut Simulation) -> Result<()>;

    /// Creates the cells and sets the outline.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order or a cell cannot be made.
    fn create_objects(&mut self, sim: &mut Simulation) -> Result<()>;

    /// Fills the link table.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order or a link cannot be set.
    fn create_links(&mut self, sim: &Simulation) -> Result<()>;

    /// Carves the component out of its containing cells.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order or an insert cell is missing.
    fn insert_objects(&mut self, sim: &mut Simulation) -> Result<()> {
        self.core_mut().insert_objects(sim)
    }

    /// Runs every step in order. Errors name the component.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KernelError::Component`] wrapping the first failure.
    fn create_all(
        &mut self,
        sim: &mut Simulation,
        vars: &FuncDataBase,
        parent: &Frame,
        side: i32,
    ) -> Result<()> {
        let name = self.core().key().to_string();
        run_steps(self, sim, vars, parent, side).in_component(&name)?;
        let core = self.core();
        info!(
            component = %name,
            build_index = core.build_index(),
            cells = core.cell_map().all_cells().count(),
            "component built"
        );
        Ok(())
    }
}

fn run_steps<B: Buildable + ?Sized>(
    component: &mut B,
    sim: &mut Simulation,
    vars: &FuncDataBase,
    parent: &Frame,
    side: i32,
) -> Result<()> {
    component.core_mut().register(sim)?;
    component.populate(sim, vars)?;
    component.create_unit_vector(parent, side)?;
    component.create_surfaces(sim)?;
    component.create_objects(sim)?;
    component.create_links(sim)?;
    component.insert_objects(sim)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::KernelError;

    #[test]
    fn stages_advance_one_at_a_time() {
        let mut sim = Simulation::new();
        let mut core = ComponentCore::new("Pipe", 2);
        core.advance(BuildStage::Populated).unwrap();
        let err = core.advance(BuildStage::ObjectsBuilt).unwrap_err();
        match err {
            KernelError::Ordering(e) => {
                assert_eq!(e.attempted, BuildStage::ObjectsBuilt);
                assert_eq!(e.current, BuildStage::Populated);
                assert_eq!(e.component, "Pipe");
            }
            other => panic!("unexpected {other}"),
        }
        core.advance(BuildStage::UnitVectorSet).unwrap();
        assert!(core.advance(BuildStage::SurfacesBuilt).is_err());
        core.register(&mut sim).unwrap();
        core.register(&mut sim).unwrap();
        core.advance(BuildStage::SurfacesBuilt).unwrap();
        assert!(core.advance(BuildStage::Populated).is_err());
        assert_eq!(core.stage(), BuildStage::SurfacesBuilt);
        assert_eq!(BuildStage::Inserted.next(), None);
    }

    #[test]
    fn cells_and_surfaces_use_build_index() {
        let mut sim = Simulation::new();
        sim.groups.add_fixed_range("World", 1, 10).unwrap();
        let mut core = ComponentCore::new("Box", 0);
        core.register(&mut sim).unwrap();
        assert_eq!(core.build_index(), 10000);

        let h = core
            .build_plane(&mut sim, 1, Point3::origin(), Vector3::y())
            .unwrap();
        assert_eq!(h, 10001);
        core.build_plane(&mut sim, 2, Point3::new(0.0, 4.0, 0.0), Vector3::y())
            .unwrap();
        let cell = core
            .make_cell_expr(&mut sim, "Inner", 0, 0.0, "1 -2", &HeadRule::new())
            .unwrap();
        assert_eq!(cell, 10000);
        assert_eq!(sim.cells.object(cell).unwrap().rule().to_string(), "10001 -10002");
        assert_eq!(core.cell_map().cell("Inner", 0).unwrap(), 10000);
    }

    #[test]
    fn local_numbers_stay_in_the_block() {
        let mut sim = Simulation::new();
        let mut first = ComponentCore::new("A", 0);
        assert!(matches!(
            first.surf(1),
            Err(KernelError::Group(GroupError::NameNotFound(_)))
        ));
        first.register(&mut sim).unwrap();
        let mut second = ComponentCore::new("B", 0);
        second.register(&mut sim).unwrap();
        assert_eq!(second.build_index(), 20000);

        assert_eq!(first.surf(9999).unwrap(), 19999);
        for local in [10_001, 10_000, -1] {
            assert!(matches!(
                first.surf(local),
                Err(KernelError::Geometry(GeometryError::SurfaceOutOfRange { .. }))
            ));
        }
        assert!(first
            .build_plane(&mut sim, 10_001, Point3::origin(), Vector3::y())
            .is_err());
        second
            .build_plane(&mut sim, 1, Point3::new(0.0, 2.0, 0.0), Vector3::y())
            .unwrap();
        assert!(first.composite(&sim, "10001").is_err());
        assert!(sim.registry.surface(20001).is_ok());
    }

    #[test]
    fn duplicate_component_names() {
        let mut sim = Simulation::new();
        ComponentCore::new("Valve", 0).register(&mut sim).unwrap();
        let err = ComponentCore::new("Valve", 0).register(&mut sim).unwrap_err();
        assert!(matches!(err, KernelError::Group(GroupError::DuplicateName(_))));
    }
}
