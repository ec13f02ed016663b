use crate::component::{BuildStage, Buildable, ComponentCore};
use crate::error::Result;
use crate::frame::Frame;
use crate::math::{Point3, Vector3};
use crate::simulation::Simulation;
use crate::vars::{FuncDataBase, VOID};

/// A straight pipe with a flange at each end.
///
/// The origin sits on the front face and `Y` runs along the pipe. If a
/// `front` or `back` cut is set before the build (usually from the link of
/// the component the pipe is plugged into) it replaces the matching end
/// plane.
///
/// Variables (prefixed by the key): `Length`, `Radius`, `WallThick`,
/// `FlangeRadius`, `FlangeLength`, `WallMat`, optional `VoidMat` and `Temp`.
///
/// Links: `front` (1), `back` (2), `outer` (3, radial at the mid-point).
///
/// Named surfaces: `InnerRadius` (`+`, the wall side), `OuterRadius` and
/// `FlangeRadius` (`-`, the inside).
#[derive(Debug, Clone)]
pub struct PipeTube {
    core: ComponentCore,
    length: f64,
    radius: f64,
    wall_thick: f64,
    flange_radius: f64,
    flange_length: f64,
    void_mat: i32,
    wall_mat: i32,
    temperature: f64,
}

impl PipeTube {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            core: ComponentCore::new(key, 3),
            length: 0.0,
            radius: 0.0,
            wall_thick: 0.0,
            flange_radius: 0.0,
            flange_length: 0.0,
            void_mat: 0,
            wall_mat: 0,
            temperature: 0.0,
        }
    }

    /// Plugs the front of the pipe onto link `side` of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is not a link of `parent`.
    pub fn set_front(&mut self, parent: &Frame, side: i32) -> Result<()> {
        self.core.cuts_mut().set_cut_surf("front", parent, side)
    }

    /// Closes the back of the pipe on link `side` of `other`.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is not a link of `other`.
    pub fn set_back(&mut self, other: &Frame, side: i32) -> Result<()> {
        self.core.cuts_mut().set_cut_surf("back", other, side)
    }

    fn centre(&self) -> Point3 {
        self.core.frame().to_world(&Vector3::new(0.0, self.length / 2.0, 0.0))
    }
}

impl Buildable for PipeTube {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn populate(&mut self, sim: &Simulation, vars: &FuncDataBase) -> Result<()> {
        self.core.advance(BuildStage::Populated)?;
        let key = self.core.key().to_string();
        self.core.populate_offset(vars)?;

        self.length = vars.eval_var(&format!("{key}Length"))?;
        self.radius = vars.eval_var(&format!("{key}Radius"))?;
        self.wall_thick = vars.eval_var(&format!("{key}WallThick"))?;
        self.flange_radius = vars.eval_var(&format!("{key}FlangeRadius"))?;
        self.flange_length = vars.eval_var(&format!("{key}FlangeLength"))?;
        self.wall_mat = vars.eval_mat(&sim.materials, &format!("{key}WallMat"))?;
        self.void_mat = vars.eval_def_mat(&sim.materials, &format!("{key}VoidMat"), VOID)?;
        self.temperature = vars.eval_def_var(&format!("{key}Temp"), 0.0)?;
        Ok(())
    }

    fn create_surfaces(&mut self, sim: &mut Simulation) -> Result<()> {
        self.core.advance(BuildStage::SurfacesBuilt)?;
        let frame = self.core.frame().clone();
        let y = *frame.y();
        let at = |d: f64| frame.to_world(&Vector3::new(0.0, d, 0.0));
        let origin = *frame.origin();

        self.core.build_plane(sim, 1, at(0.0), y)?;
        self.core.build_plane(sim, 2, at(self.length), y)?;
        self.core.build_plane(sim, 101, at(self.flange_length), y)?;
        self.core
            .build_plane(sim, 102, at(self.length - self.flange_length), y)?;

        let inner = self.core.build_cylinder(sim, 7, origin, y, self.radius)?;
        let outer = self
            .core
            .build_cylinder(sim, 17, origin, y, self.radius + self.wall_thick)?;
        let flange = self
            .core
            .build_cylinder(sim, 27, origin, y, self.flange_radius)?;
        let surfs = self.core.surf_map_mut();
        surfs.add_surf("InnerRadius", inner);
        surfs.add_surf("OuterRadius", -outer);
        surfs.add_surf("FlangeRadius", -flange);

        if !self.core.cuts().has_cut("front") {
            let rule = self.core.composite(sim, "1")?;
            self.core.cuts_mut().set_cut_rule("front", rule);
        }
        if !self.core.cuts().has_cut("back") {
            let rule = self.core.composite(sim, "-2")?;
            self.core.cuts_mut().set_cut_rule("back", rule);
        }
        Ok(())
    }

    fn create_objects(&mut self, sim: &mut Simulation) -> Result<()> {
        self.core.advance(BuildStage::ObjectsBuilt)?;
        let front = self.core.cuts().rule("front")?;
        let back = self.core.cuts().rule("back")?;
        let ends = &front * &back;
        let (void, wall, t) = (self.void_mat, self.wall_mat, self.temperature);

        self.core.make_cell_expr(sim, "Void", void, t, "-7", &ends)?;
        self.core.make_cell_expr(sim, "Wall", wall, t, "7 -17", &ends)?;
        self.core
            .make_cell_expr(sim, "FrontFlange", wall, t, "-101 17 -27", &front)?;
        self.core
            .make_cell_expr(sim, "BackFlange", wall, t, "102 17 -27", &back)?;
        self.core
            .make_cell_expr(sim, "OuterVoid", 0, 0.0, "101 -102 17 -27", &ends)?;

        let outer = self.core.composite(sim, "-27")? * ends;
        self.core.outline_mut().set_outer(outer);
        Ok(())
    }

    fn create_links(&mut self, sim: &Simulation) -> Result<()> {
        self.core.advance(BuildStage::LinksBuilt)?;
        let centre = self.centre();
        let y = *self.core.frame().y();
        let z = *self.core.frame().z();
        let outer = self.core.surf(27)?;

        let core = &mut self.core;
        let cuts = core.cuts().clone();
        let frame = core.frame_mut();
        cuts.create_link("front", &sim.registry, frame, 0, &centre, &-y)?;
        cuts.create_link("back", &sim.registry, frame, 1, &centre, &y)?;
        frame.set_connect(2, centre + z * self.flange_radius, z)?;
        frame.set_link_surf(2, sim.registry.real_surf(outer)?)?;

        frame.name_side_index(0, "front")?;
        frame.name_side_index(1, "back")?;
        frame.name_side_index(2, "outer")?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{KernelError, LinkError};
    use crate::vars::MaterialDatabase;
    use approx::assert_relative_eq;

    fn pipe_vars(key: &str) -> FuncDataBase {
        let mut vars = FuncDataBase::new();
        vars.add_variable(&format!("{key}Length"), 100.0);
        vars.add_variable(&format!("{key}Radius"), 4.0);
        vars.add_variable(&format!("{key}WallThick"), 0.5);
        vars.add_variable(&format!("{key}FlangeRadius"), 8.0);
        vars.add_variable(&format!("{key}FlangeLength"), 2.0);
        vars.add_variable(&format!("{key}WallMat"), "Stainless304");
        vars
    }

    fn sim() -> Simulation {
        let mut mats = MaterialDatabase::new();
        mats.add_material(3, "Stainless304", 7.96);
        Simulation::new().with_materials(mats)
    }

    #[test]
    fn standalone_pipe() {
        let mut sim = sim();
        let mut pipe = PipeTube::new("Pipe");
        pipe.create_all(&mut sim, &pipe_vars("Pipe"), &Frame::world(), 0)
            .unwrap();

        assert_eq!(pipe.core().stage(), BuildStage::Inserted);
        assert_eq!(sim.groups.object_range("Pipe").unwrap().len(), 5);
        let find = |x: f64, y: f64| sim.find_cell(&Point3::new(x, y, 0.0)).unwrap();
        assert_eq!(find(0.0, 50.0), Some(10000));
        assert_eq!(find(4.2, 50.0), Some(10001));
        assert_eq!(find(6.0, 1.0), Some(10002));
        assert_eq!(find(6.0, 99.0), Some(10003));
        assert_eq!(find(6.0, 50.0), Some(10004));
        assert_eq!(find(0.0, 101.0), None);

        let frame = pipe.core().frame();
        assert_relative_eq!(frame.get_link_pt(2).unwrap(), Point3::new(0.0, 100.0, 0.0), epsilon = 1e-9);
        assert_eq!(frame.get_link_axis(-1).unwrap(), Vector3::y());
        assert_eq!(frame.get_link_surf(1).unwrap(), -10001);
        assert_eq!(frame.get_link_surf(2).unwrap(), 10002);
        assert_eq!(frame.get_side_index("outer").unwrap(), 3);
        assert_relative_eq!(frame.get_link_pt(3).unwrap(), Point3::new(0.0, 50.0, 8.0), epsilon = 1e-9);
        assert!(sim.link_frame("Pipe").is_ok());

        let surfs = pipe.core().surf_map();
        assert_eq!(surfs.signed_surf("InnerRadius", 0).unwrap(), 10007);
        assert_eq!(surfs.signed_surf("OuterRadius", 0).unwrap(), -10017);
        assert_eq!(surfs.rule("FlangeRadius").unwrap().to_string(), "-10027");
    }

    #[test]
    fn reversed_pipe_keeps_its_cells() {
        let mut sim = sim();
        let mut vars = pipe_vars("Pipe");
        vars.add_variable("PipeXYAngle", 180.0);
        let mut pipe = PipeTube::new("Pipe");
        pipe.create_all(&mut sim, &vars, &Frame::world(), 0).unwrap();
        assert_relative_eq!(*pipe.core().frame().y(), -Vector3::y(), epsilon = 1e-12);

        let find = |x: f64, y: f64| sim.find_cell(&Point3::new(x, y, 0.0)).unwrap();
        assert_eq!(find(0.0, -50.0), Some(10000));
        assert_eq!(find(-4.2, -50.0), Some(10001));
        assert_eq!(find(6.0, -1.0), Some(10002));
        assert_eq!(find(6.0, -99.0), Some(10003));
        assert_eq!(find(-6.0, -50.0), Some(10004));
        assert_eq!(find(0.0, 50.0), None);
        assert_eq!(find(0.0, -101.0), None);

        let frame = pipe.core().frame();
        assert_relative_eq!(frame.get_link_pt(2).unwrap(), Point3::new(0.0, -100.0, 0.0), epsilon = 1e-9);
        assert_eq!(frame.get_link_surf(2).unwrap(), 10002);
        let beyond = Point3::new(0.0, -100.5, 0.0);
        assert!(frame.get_full_rule(2).unwrap().is_valid(&sim.registry, &beyond).unwrap());
    }

    #[test]
    fn offset_moves_the_pipe() {
        let mut sim = sim();
        let mut vars = pipe_vars("Pipe");
        vars.add_variable("PipeXStep", 20.0);
        let mut pipe = PipeTube::new("Pipe");
        pipe.create_all(&mut sim, &vars, &Frame::world(), 0).unwrap();
        assert_eq!(sim.find_cell(&Point3::new(20.0, 50.0, 0.0)).unwrap(), Some(10000));
        assert_eq!(sim.find_cell(&Point3::new(0.0, 50.0, 0.0)).unwrap(), None);
    }

    #[test]
    fn missing_variable_names_the_component() {
        let mut sim = sim();
        let mut vars = pipe_vars("Pipe");
        vars.add_variable("PipeWallMat", "Unobtainium");
        let err = PipeTube::new("Pipe")
            .create_all(&mut sim, &vars, &Frame::world(), 0)
            .unwrap_err();
        match err {
            KernelError::Component { name, .. } => assert_eq!(name, "Pipe"),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn out_of_order_steps() {
        let mut sim = sim();
        let mut pipe = PipeTube::new("Pipe");
        assert!(matches!(
            pipe.create_surfaces(&mut sim),
            Err(KernelError::Ordering(_))
        ));
        pipe.populate(&sim, &pipe_vars("Pipe")).unwrap();
        assert!(matches!(
            pipe.create_objects(&mut sim),
            Err(KernelError::Ordering(_))
        ));
        assert!(matches!(
            pipe.create_unit_vector(&Frame::world(), 7),
            Err(KernelError::Link(LinkError::IndexOutOfRange { .. }))
        ));
    }
}
