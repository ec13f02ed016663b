pub mod registry;
pub mod surface;

pub use registry::SurfaceRegistry;
pub use surface::{Cone, Cylinder, Plane, Sphere, Surface};
