use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, SURFACE_TOLERANCE};

use super::surface::{Cone, Cylinder, Plane, Sphere, Surface};

/// Owner of every primitive surface in a model.
///
/// Surfaces are stored under positive integer handles. When a caller asks
/// for a handle whose primitive is equivalent (same kind, parameters within
/// [`SurfaceRegistry::tolerance`]) to one already stored, no new surface is
/// created: the requested handle becomes an alias of the existing one and
/// every later [`SurfaceRegistry::real_surf`] lookup resolves through it.
///
/// Aliases are signed. A plane requested with the normal opposite to the
/// stored one aliases the negative handle, so `+h` keeps meaning the side
/// its caller's normal points into.
#[derive(Debug)]
pub struct SurfaceRegistry {
    tolerance: f64,
    surfaces: BTreeMap<i32, Surface>,
    aliases: HashMap<i32, i32>,
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::with_tolerance(SURFACE_TOLERANCE)
    }
}

impl SurfaceRegistry {
    /// Creates an empty registry with the default tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry comparing surfaces within `tolerance`.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            surfaces: BTreeMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Tolerance used for surface equality and point-side tests.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of distinct surfaces stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// True when no surface has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Iterates over canonical handles and surfaces in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &Surface)> {
        self.surfaces.iter().map(|(k, v)| (*k, v))
    }

    /// Registers `surface` at `handle`, returning the signed canonical
    /// handle whose positive side is the positive side of `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if `handle` is not positive, or if it already holds
    /// a primitive that differs from `surface`.
    pub fn register(&mut self, handle: i32, surface: Surface) -> Result<i32> {
        if handle <= 0 {
            return Err(GeometryError::InvalidHandle(handle).into());
        }
        let held = match self.aliases.get(&handle) {
            Some(&target) => Some(target.abs()),
            None => self.surfaces.contains_key(&handle).then_some(handle),
        };
        if let Some(base) = held {
            return self
                .surfaces
                .get(&base)
                .and_then(|s| s.orientation(&surface, self.tolerance))
                .map(|sign| sign * base)
                .ok_or_else(|| GeometryError::HandleConflict { handle }.into());
        }

        if let Some(found) = self.find_equivalent(&surface) {
            trace!(handle, canonical = found, kind = surface.kind(), "surface alias");
            self.aliases.insert(handle, found);
            return Ok(found);
        }

        debug!(handle, kind = surface.kind(), "surface registered");
        self.surfaces.insert(handle, surface);
        Ok(handle)
    }

    /// Signed handle of a stored surface equivalent to `surface`.
    fn find_equivalent(&self, surface: &Surface) -> Option<i32> {
        self.surfaces.iter().find_map(|(k, s)| {
            s.orientation(surface, self.tolerance)
                .map(|sign| sign * k)
        })
    }

    /// Registers a plane through `point` with normal `normal`. The returned
    /// handle is negative when an existing plane faces the other way.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length or the handle conflicts.
    pub fn build_plane(&mut self, handle: i32, point: Point3, normal: Vector3) -> Result<i32> {
        let plane = Plane::new(point, normal)?;
        self.register(handle, plane.into())
    }

    /// Registers a cylinder with axis through `centre` along `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if the primitive is degenerate or the handle conflicts.
    pub fn build_cylinder(
        &mut self,
        handle: i32,
        centre: Point3,
        axis: Vector3,
        radius: f64,
    ) -> Result<i32> {
        let cylinder = Cylinder::new(centre, axis, radius)?;
        self.register(handle, cylinder.into())
    }

    /// Registers a sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the handle conflicts.
    pub fn build_sphere(&mut self, handle: i32, centre: Point3, radius: f64) -> Result<i32> {
        let sphere = Sphere::new(centre, radius)?;
        self.register(handle, sphere.into())
    }

    /// Registers a cone with its half-angle given in degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if the primitive is degenerate or the handle conflicts.
    pub fn build_cone(
        &mut self,
        handle: i32,
        apex: Point3,
        axis: Vector3,
        half_angle_deg: f64,
    ) -> Result<i32> {
        let cone = Cone::new(apex, axis, half_angle_deg.to_radians())?;
        self.register(handle, cone.into())
    }

    /// Resolves a signed, possibly aliased handle to its canonical signed
    /// handle. The sign flips when the alias was registered reversed.
    ///
    /// # Errors
    ///
    /// Returns an error if no surface was ever registered at `|handle|`.
    pub fn real_surf(&self, handle: i32) -> Result<i32> {
        let n = handle.abs();
        if self.surfaces.contains_key(&n) {
            return Ok(handle);
        }
        self.aliases
            .get(&n)
            .map(|&target| handle.signum() * target)
            .ok_or_else(|| GeometryError::SurfaceNotFound(handle).into())
    }

    /// Returns the primitive behind a signed handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown.
    pub fn surface(&self, handle: i32) -> Result<&Surface> {
        let n = self.real_surf(handle)?.abs();
        self.surfaces
            .get(&n)
            .ok_or_else(|| GeometryError::SurfaceNotFound(handle).into())
    }

    /// True when `handle` (or its alias) is known.
    #[must_use]
    pub fn contains(&self, handle: i32) -> bool {
        self.real_surf(handle).is_ok()
    }

    /// Side of `point` relative to the unsigned surface `|handle|`:
    /// `1`, `-1`, or `0` when on the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown.
    pub fn side(&self, handle: i32, point: &Point3) -> Result<i32> {
        Ok(self.surface(handle)?.side(point, self.tolerance))
    }
}
