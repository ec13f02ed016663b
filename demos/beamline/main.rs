//! Builds a vacuum box followed by two flanged pipes and prints the MCNP
//! cell and surface cards.
//!
//! Run with `RUST_LOG=debug` to see every registration.

use combgeom::component::Buildable;
use combgeom::components::{PipeTube, VacuumBox};
use combgeom::mcnp;
use combgeom::operations::{BuildWorld, LayerDivide, INNER_CELL};
use combgeom::vars::{FuncDataBase, MaterialDatabase};
use combgeom::{Result, Simulation};
use tracing::info;

fn variables() -> FuncDataBase {
    let mut vars = FuncDataBase::new();
    vars.add_variable("BoxWidth", 20.0);
    vars.add_variable("BoxHeight", 10.0);
    vars.add_variable("BoxLength", 30.0);
    vars.add_variable("BoxWallThick", 1.0);
    vars.add_variable("BoxWallMat", "Aluminium");

    for key in ["PipeA", "PipeB"] {
        vars.add_variable(&format!("{key}Length"), 100.0);
        vars.add_variable(&format!("{key}Radius"), 4.0);
        vars.add_variable(&format!("{key}WallThick"), 0.5);
        vars.add_variable(&format!("{key}FlangeRadius"), 8.0);
        vars.add_variable(&format!("{key}FlangeLength"), 2.0);
        vars.add_variable(&format!("{key}WallMat"), "Stainless304");
    }
    vars.add_variable("PipeBTemp", 20.0);
    vars.add_variable("PipeBZAngle", 2.0);
    vars
}

fn materials() -> MaterialDatabase {
    let mut mats = MaterialDatabase::new();
    mats.add_material(3, "Stainless304", 7.96);
    mats.add_material(5, "Aluminium", 2.7);
    mats
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for combgeom.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("beamline=info".parse().unwrap_or_default())
        .add_directive("combgeom=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let vars = variables();
    let mut sim = Simulation::new().with_materials(materials());
    let world = BuildWorld::new(1000.0).execute(&mut sim)?;

    let mut vbox = VacuumBox::new("Box");
    vbox.core_mut().outline_mut().add_insert_cell(INNER_CELL);
    vbox.create_all(&mut sim, &vars, &world, 0)?;

    let box_frame = sim.link_frame("Box")?;
    let back = box_frame.get_side_index("back")?;
    let mut pipe_a = PipeTube::new("PipeA");
    pipe_a.set_front(&box_frame, back)?;
    pipe_a.core_mut().outline_mut().add_insert_cell(INNER_CELL);
    pipe_a.create_all(&mut sim, &vars, &box_frame, back)?;

    let a_frame = sim.link_frame("PipeA")?;
    let mut pipe_b = PipeTube::new("PipeB");
    pipe_b.set_front(&a_frame, 2)?;
    pipe_b.core_mut().outline_mut().add_insert_cell(INNER_CELL);
    pipe_b.create_all(&mut sim, &vars, &a_frame, 2)?;

    let core = pipe_a.core();
    let wall = core.cell_map().cell("Wall", 0)?;
    let inner = core.surf_map().signed_surf("InnerRadius", 0)?;
    let outer = core.surf_map().signed_surf("OuterRadius", 0)?;
    let layers = LayerDivide::new(wall, "PipeA", inner, outer, core.surf(201)?)
        .add_layer(0.5, None)
        .execute(&mut sim)?;
    info!(?layers, "pipe wall divided");

    info!(
        cells = sim.cells.len(),
        surfaces = sim.registry.len(),
        "model complete"
    );
    print!("{}", mcnp::write_deck(&sim, "combgeom beamline demo")?);
    Ok(())
}
