#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use combgeom::component::Buildable;
use combgeom::components::{PipeTube, VacuumBox};
use combgeom::math::{Point3, Vector3};
use combgeom::operations::{BuildWorld, LayerDivide, INNER_CELL};
use combgeom::vars::{FuncDataBase, MaterialDatabase};
use combgeom::{mcnp, Simulation};

fn variables() -> FuncDataBase {
    let mut vars = FuncDataBase::new();
    vars.add_variable("BoxWidth", 20.0);
    vars.add_variable("BoxHeight", 10.0);
    vars.add_variable("BoxLength", 30.0);
    vars.add_variable("BoxWallThick", 1.0);
    vars.add_variable("BoxWallMat", "Aluminium");
    for key in ["Pipe", "PipeB"] {
        vars.add_variable(&format!("{key}Length"), 100.0);
        vars.add_variable(&format!("{key}Radius"), 4.0);
        vars.add_variable(&format!("{key}WallThick"), 0.5);
        vars.add_variable(&format!("{key}FlangeRadius"), 8.0);
        vars.add_variable(&format!("{key}FlangeLength"), 2.0);
        vars.add_variable(&format!("{key}WallMat"), "Stainless304");
    }
    vars
}

struct Beamline {
    sim: Simulation,
    vbox: VacuumBox,
    pipe: PipeTube,
    pipe_b: PipeTube,
}

/// Box, a pipe on the box link named `box_side`, and a second pipe on the
/// back of the first.
fn build_on(box_side: &str) -> Beamline {
    let mut mats = MaterialDatabase::new();
    mats.add_material(3, "Stainless304", 7.96);
    mats.add_material(5, "Aluminium", 2.7);
    let mut sim = Simulation::new().with_materials(mats);
    let vars = variables();
    let world = BuildWorld::new(1000.0).execute(&mut sim).unwrap();

    let mut vbox = VacuumBox::new("Box");
    vbox.core_mut().outline_mut().add_insert_cell(INNER_CELL);
    vbox.create_all(&mut sim, &vars, &world, 0).unwrap();

    let box_frame = sim.link_frame("Box").unwrap();
    let side = box_frame.get_side_index(box_side).unwrap();
    let mut pipe = PipeTube::new("Pipe");
    pipe.set_front(&box_frame, side).unwrap();
    pipe.core_mut().outline_mut().add_insert_cell(INNER_CELL);
    pipe.create_all(&mut sim, &vars, &box_frame, side).unwrap();

    let pipe_frame = sim.link_frame("Pipe").unwrap();
    let back = pipe_frame.get_side_index("back").unwrap();
    let mut pipe_b = PipeTube::new("PipeB");
    pipe_b.set_front(&pipe_frame, back).unwrap();
    pipe_b.core_mut().outline_mut().add_insert_cell(INNER_CELL);
    pipe_b.create_all(&mut sim, &vars, &pipe_frame, back).unwrap();

    Beamline {
        sim,
        vbox,
        pipe,
        pipe_b,
    }
}

fn build() -> Beamline {
    build_on("back")
}

fn grid() -> Vec<Point3> {
    grid_along(&[-3.3, -0.5, 12.7, 30.5, 32.1, 60.3, 130.2, 132.4, 180.9, 230.1, 400.7])
}

fn grid_along(ys: &[f64]) -> Vec<Point3> {
    let xs = [-12.3, -10.7, -7.1, -4.3, -2.2, 0.1, 4.15, 4.4, 6.1, 10.4, 13.9];
    let zs = [-7.7, -5.5, 0.3, 2.2, 5.6, 9.1];
    let mut points = Vec::new();
    for x in xs {
        for &y in ys {
            for z in zs {
                points.push(Point3::new(x, y, z));
            }
        }
    }
    points
}

fn containing_cells(sim: &Simulation, p: &Point3) -> Vec<i32> {
    sim.cells
        .iter()
        .filter(|obj| obj.is_valid(&sim.registry, p).unwrap())
        .map(|obj| obj.cell())
        .collect()
}

#[test]
fn frames_chain_through_links() {
    let line = build();
    let box_frame = line.vbox.core().frame();
    let pipe_frame = line.pipe.core().frame();
    assert_relative_eq!(*pipe_frame.origin(), box_frame.get_link_pt(2).unwrap(), epsilon = 1e-12);
    assert_relative_eq!(*pipe_frame.y(), box_frame.get_link_axis(2).unwrap(), epsilon = 1e-12);

    let b_frame = line.pipe_b.core().frame();
    assert_relative_eq!(*b_frame.origin(), pipe_frame.get_link_pt(2).unwrap(), epsilon = 1e-12);
    assert_relative_eq!(*b_frame.origin(), Point3::new(0.0, 131.0, 0.0), epsilon = 1e-9);
}

#[test]
fn shared_faces_resolve_to_one_surface() {
    let line = build();
    let reg = &line.sim.registry;
    assert_eq!(line.vbox.core().build_index(), 10000);
    assert_eq!(line.pipe.core().build_index(), 20000);
    assert_eq!(line.pipe_b.core().build_index(), 30000);
    assert_eq!(reg.real_surf(20001).unwrap(), 10012);
    assert_eq!(reg.real_surf(-30001).unwrap(), -20002);
    assert!(reg.surface(30001).is_ok());
}

#[test]
fn every_point_has_exactly_one_cell() {
    let mut line = build();
    for p in grid() {
        assert_eq!(containing_cells(&line.sim, &p).len(), 1, "at {p}");
    }

    let wall = line.pipe.core().cell_map().cell("Wall", 0).unwrap();
    let layers = LayerDivide::new(wall, "Pipe", 20007, -20017, 20201)
        .add_layer(0.5, Some(5))
        .execute(&mut line.sim)
        .unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(line.sim.cells.mat_id(layers[1]).unwrap(), 5);
    for p in grid() {
        assert_eq!(containing_cells(&line.sim, &p).len(), 1, "at {p}");
    }
}

#[test]
fn reversed_chain_has_one_cell_per_point() {
    let mut line = build_on("front");
    let pipe_frame = line.pipe.core().frame();
    assert_relative_eq!(*pipe_frame.y(), -Vector3::y(), epsilon = 1e-12);
    assert_relative_eq!(*line.pipe_b.core().frame().y(), -Vector3::y(), epsilon = 1e-12);
    assert_relative_eq!(
        *line.pipe_b.core().frame().origin(),
        Point3::new(0.0, -101.0, 0.0),
        epsilon = 1e-9
    );

    // the pipe's front plane faces away from the box wall it sits on
    let reg = &line.sim.registry;
    assert_eq!(reg.real_surf(20001).unwrap(), -10011);
    assert_eq!(reg.real_surf(30001).unwrap(), 20002);

    let sim = &line.sim;
    assert_eq!(sim.find_cell(&Point3::new(0.0, -50.0, 0.0)).unwrap(), Some(20000));
    assert_eq!(sim.find_cell(&Point3::new(0.0, -150.0, 0.0)).unwrap(), Some(30000));
    assert_eq!(sim.find_cell(&Point3::new(0.0, 15.0, 0.0)).unwrap(), Some(10000));

    let ys = [
        12.7, -0.5, -2.1, -3.3, -50.2, -98.4, -100.2, -102.4, -150.9, -199.6, -230.1,
    ];
    for p in grid_along(&ys) {
        assert_eq!(containing_cells(&line.sim, &p).len(), 1, "at {p}");
    }

    let wall = line.pipe.core().cell_map().cell("Wall", 0).unwrap();
    LayerDivide::new(wall, "Pipe", 20007, -20017, 20201)
        .add_layer(0.5, None)
        .execute(&mut line.sim)
        .unwrap();
    for p in grid_along(&ys) {
        assert_eq!(containing_cells(&line.sim, &p).len(), 1, "at {p}");
    }
}

#[test]
fn world_cell_is_carved() {
    let line = build();
    let sim = &line.sim;
    assert_eq!(sim.find_cell(&Point3::new(0.0, 15.0, 0.0)).unwrap(), Some(10000));
    assert_eq!(sim.find_cell(&Point3::new(0.0, 80.0, 0.0)).unwrap(), Some(20000));
    assert_eq!(sim.find_cell(&Point3::new(0.0, 180.0, 0.0)).unwrap(), Some(30000));
    assert_eq!(sim.find_cell(&Point3::new(50.0, 80.0, 0.0)).unwrap(), Some(INNER_CELL));
    assert_eq!(sim.find_cell(&Point3::new(0.0, 2000.0, 0.0)).unwrap(), Some(1));

    let world = sim.cells.object(INNER_CELL).unwrap();
    let used = world.rule().surfaces();
    for handle in [10011, 10016, 20027] {
        assert!(used.contains(&handle));
    }
    // the second pipe's flange cylinder is an alias of the first's
    assert!(!used.contains(&30027));
}

#[test]
fn deck_is_complete() {
    let line = build();
    let deck = mcnp::write_deck(&line.sim, "assembly").unwrap();
    for line_text in deck.lines() {
        assert!(line_text.len() <= mcnp::LINE_WIDTH);
    }
    let cards: Vec<&str> = deck
        .lines()
        .filter(|l| !l.starts_with(' ') && !l.is_empty())
        .collect();
    // title + cells + surfaces
    assert_eq!(
        cards.len(),
        1 + line.sim.cells.len() + line.sim.registry.len()
    );
    assert!(deck.contains("\n10012 py 31\n"));
}
