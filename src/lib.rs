pub mod cell;
pub mod component;
pub mod components;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod groups;
pub mod math;
pub mod mcnp;
pub mod operations;
pub mod rule;
pub mod simulation;
pub mod vars;

pub use error::{KernelError, Result};
pub use simulation::Simulation;
