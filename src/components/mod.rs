//! Reference component generators.

mod pipe_tube;
mod vacuum_box;

pub use pipe_tube::PipeTube;
pub use vacuum_box::VacuumBox;
