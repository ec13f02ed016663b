use crate::component::{BuildStage, Buildable, ComponentCore};
use crate::error::Result;
use crate::math::Vector3;
use crate::rule::HeadRule;
use crate::simulation::Simulation;
use crate::vars::{FuncDataBase, VOID};

const LINK_NAMES: [&str; 6] = ["front", "back", "left", "right", "base", "top"];

/// A rectangular vacuum vessel with walls of uniform thickness.
///
/// The origin sits on the inner front face, centred in `X` and `Z`.
///
/// Variables (prefixed by the key): `Width`, `Height`, `Length`,
/// `WallThick`, `WallMat`, optional `VoidMat`.
#[derive(Debug, Clone)]
pub struct VacuumBox {
    core: ComponentCore,
    width: f64,
    height: f64,
    length: f64,
    wall_thick: f64,
    void_mat: i32,
    wall_mat: i32,
}

impl VacuumBox {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            core: ComponentCore::new(key, LINK_NAMES.len()),
            width: 0.0,
            height: 0.0,
            length: 0.0,
            wall_thick: 0.0,
            void_mat: 0,
            wall_mat: 0,
        }
    }

    /// Local offsets of the six outer wall faces, in link order.
    fn outer_faces(&self) -> [(Vector3, Vector3); 6] {
        let w = self.wall_thick;
        let (hw, hh) = (self.width / 2.0 + w, self.height / 2.0 + w);
        let mid = self.length / 2.0;
        [
            (Vector3::new(0.0, -w, 0.0), -Vector3::y()),
            (Vector3::new(0.0, self.length + w, 0.0), Vector3::y()),
            (Vector3::new(-hw, mid, 0.0), -Vector3::x()),
            (Vector3::new(hw, mid, 0.0), Vector3::x()),
            (Vector3::new(0.0, mid, -hh), -Vector3::z()),
            (Vector3::new(0.0, mid, hh), Vector3::z()),
        ]
    }
}

impl Buildable for VacuumBox {
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

        self.width = vars.eval_var(&format!("{key}Width"))?;
        self.height = vars.eval_var(&format!("{key}Height"))?;
        self.length = vars.eval_var(&format!("{key}Length"))?;
        self.wall_thick = vars.eval_var(&format!("{key}WallThick"))?;
        self.wall_mat = vars.eval_mat(&sim.materials, &format!("{key}WallMat"))?;
        self.void_mat = vars.eval_def_mat(&sim.materials, &format!("{key}VoidMat"), VOID)?;
        Ok(())
    }

    fn create_surfaces(&mut self, sim: &mut Simulation) -> Result<()> {
        self.core.advance(BuildStage::SurfacesBuilt)?;
        let frame = self.core.frame().clone();
        let (x, y, z) = (*frame.x(), *frame.y(), *frame.z());
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let p = |u: f64, v: f64, w: f64| frame.to_world(&Vector3::new(u, v, w));

        self.core.build_plane(sim, 1, p(0.0, 0.0, 0.0), y)?;
        self.core.build_plane(sim, 2, p(0.0, self.length, 0.0), y)?;
        self.core.build_plane(sim, 3, p(-hw, 0.0, 0.0), x)?;
        self.core.build_plane(sim, 4, p(hw, 0.0, 0.0), x)?;
        self.core.build_plane(sim, 5, p(0.0, 0.0, -hh), z)?;
        self.core.build_plane(sim, 6, p(0.0, 0.0, hh), z)?;

        // outer walls face the positive frame axes like the inner ones
        let faces = self.outer_faces();
        for (local, (offset, normal)) in (11..).zip(faces) {
            let axis = frame.to_world(&normal.abs()) - frame.origin();
            self.core.build_plane(sim, local, p(offset.x, offset.y, offset.z), axis)?;
        }
        Ok(())
    }

    fn create_objects(&mut self, sim: &mut Simulation) -> Result<()> {
        self.core.advance(BuildStage::ObjectsBuilt)?;
        let none = HeadRule::new();
        let inner = "1 -2 3 -4 5 -6";
        self.core
            .make_cell_expr(sim, "Void", self.void_mat, 0.0, inner, &none)?;
        self.core.make_cell_expr(
            sim,
            "Wall",
            self.wall_mat,
            0.0,
            &format!("11 -12 13 -14 15 -16 #({inner})"),
            &none,
        )?;
        let outer = self.core.composite(sim, "11 -12 13 -14 15 -16")?;
        self.core.outline_mut().set_outer(outer);
        Ok(())
    }

    fn create_links(&mut self, sim: &Simulation) -> Result<()> {
        self.core.advance(BuildStage::LinksBuilt)?;
        let faces = self.outer_faces();
        let handles: Vec<i32> = (11..17)
            .map(|local| sim.registry.real_surf(self.core.surf(local)?))
            .collect::<Result<_>>()?;

        let frame = self.core.frame_mut();
        let origin = *frame.origin();
        for (i, ((offset, normal), handle)) in faces.iter().zip(handles).enumerate() {
            let point = frame.to_world(offset);
            let axis = frame.to_world(normal) - origin;
            frame.set_connect(i, point, axis)?;
            // half-space the axis points into
            let side = sim.registry.side(handle, &(point + axis))?;
            frame.set_link_surf(i, handle.abs() * side)?;
            frame.name_side_index(i, LINK_NAMES[i])?;
        }
        Ok(())
    }
}
