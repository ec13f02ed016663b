//! Whole-model operations that act on a [`crate::Simulation`] rather than
//! on one component.

mod build_world;
mod layer_divide;

pub use build_world::{BuildWorld, INNER_CELL, OUTER_CELL, WORLD, WORLD_SURF};
pub use layer_divide::LayerDivide;
