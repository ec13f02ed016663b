//! MCNP cell and surface cards.
//!
//! Cards are at most 80 columns wide; longer cards continue on lines
//! starting with five spaces. Temperatures are written in MeV.

mod surfaces;

pub use surfaces::{surface_card, write_surfaces};

use crate::error::{Result, VariableError};
use crate::simulation::Simulation;

/// Maximum card width.
pub const LINE_WIDTH: usize = 80;
const CONTINUATION: &str = "     ";

/// Boltzmann constant in MeV/K.
pub const BOLTZMANN_MEV: f64 = 8.617_333_262e-11;

/// Formats a parameter, rounding away noise below 1e-10.
pub(crate) fn num(v: f64) -> String {
    let r = (v * 1e10).round() / 1e10;
    if r.abs() < 1e-10 {
        "0".to_string()
    } else {
        format!("{r}")
    }
}

/// Joins tokens into one card, wrapping at [`LINE_WIDTH`].
pub(crate) fn card<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    let mut line = String::new();
    for token in tokens {
        let token = token.as_ref();
        if line.is_empty() {
            line.push_str(token);
        } else if line.len() + 1 + token.len() > LINE_WIDTH {
            out.push_str(&line);
            out.push('\n');
            line = format!("{CONTINUATION}{token}");
        } else {
            line.push(' ');
            line.push_str(token);
        }
    }
    out.push_str(&line);
    out.push('\n');
    out
}

/// Writes one card per cell: number, material, negative mass density for
/// non-void cells, the rule and `tmp=` when a temperature is set.
///
/// # Errors
///
/// Returns an error if a cell uses an unknown material or surface.
pub fn write_cells(sim: &Simulation) -> Result<String> {
    let mut out = String::new();
    for obj in sim.cells.iter() {
        let mut tokens = vec![obj.cell().to_string(), obj.material().to_string()];
        if !obj.is_void() {
            let material = sim
                .materials
                .material(obj.material())
                .ok_or_else(|| VariableError::UnknownMaterial(obj.material().to_string()))?;
            tokens.push(num(-material.density));
        }
        let rule = obj.rule().resolve(&sim.registry)?;
        tokens.extend(rule.to_string().split_whitespace().map(str::to_string));
        if obj.temperature() > 0.0 {
            tokens.push(format!("tmp={:.5e}", obj.temperature() * BOLTZMANN_MEV));
        }
        out.push_str(&card(&tokens));
    }
    Ok(out)
}

/// Writes a complete geometry deck: title, cells, blank line, surfaces,
/// blank line.
///
/// # Errors
///
/// Returns an error if a cell cannot be written.
pub fn write_deck(sim: &Simulation, title: &str) -> Result<String> {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&write_cells(sim)?);
    out.push('\n');
    out.push_str(&write_surfaces(&sim.registry));
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::rule::HeadRule;

    fn sim() -> Simulation {
        let mut sim = Simulation::new();
        sim.materials.add_material(3, "Stainless304", 7.96);
        sim.registry
            .build_plane(10001, Point3::origin(), Vector3::y())
            .unwrap();
        sim.registry
            .build_plane(10002, Point3::new(0.0, 4.0, 0.0), Vector3::y())
            .unwrap();
        sim
    }

    #[test]
    fn cell_cards() {
        let mut sim = sim();
        let rule = HeadRule::parse("10001 -10002").unwrap();
        sim.cells.make_cell("A", 10000, 3, 300.0, rule.clone()).unwrap();
        sim.cells.make_cell("A", 10001, 0, 0.0, rule.complement()).unwrap();
        assert_eq!(
            write_cells(&sim).unwrap(),
            "10000 3 -7.96 10001 -10002 tmp=2.58520e-8\n10001 0 -10001 : 10002\n"
        );
    }

    #[test]
    fn unknown_material() {
        let mut sim = sim();
        sim.cells
            .make_cell("A", 5, 9, 0.0, HeadRule::from_surf(10001))
            .unwrap();
        assert!(write_cells(&sim).is_err());
    }

    #[test]
    fn long_cards_wrap() {
        let tokens: Vec<String> = (0..40).map(|i| format!("-{}", 100_000 + i)).collect();
        let text = card(&tokens);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= LINE_WIDTH);
        }
        for line in &lines[1..] {
            assert!(line.starts_with(CONTINUATION));
        }
        let rejoined: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined.len(), 40);
    }

    #[test]
    fn deck_layout() {
        let mut sim = sim();
        sim.cells
            .make_cell("A", 1, 0, 0.0, HeadRule::from_surf(10001))
            .unwrap();
        let deck = write_deck(&sim, "test deck").unwrap();
        assert_eq!(deck, "test deck\n1 0 10001\n\n10001 py 0\n10002 py 4\n\n");
    }
}
