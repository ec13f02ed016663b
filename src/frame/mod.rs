//! Local coordinate frames and link points.
//!
//! Every component owns a [`Frame`]: an origin, a right-handed orthonormal
//! basis `X, Y, Z` and an ordered table of [`LinkUnit`] exit frames. Links
//! are stored 0-based but read through a signed *side index*:
//!
//! | side | meaning |
//! |------|---------|
//! | `0`  | the frame origin, axis `Y` |
//! | `k > 0` | link `k - 1` |
//! | `k < 0` | link `-k - 1` with reversed axis and complemented rule |
//!
//! By convention link `0` (side `1`) is the front entry and the last links
//! are the back and side exits.

mod link;
mod offset;

pub use link::LinkUnit;
pub use offset::FrameOffset;

use std::collections::HashMap;

use crate::error::{GeometryError, LinkError, Result};
use crate::math::{rotate_deg, Point3, Vector3, TOLERANCE};
use crate::rule::HeadRule;

/// Origin, basis and link table of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    key: String,
    origin: Point3,
    x: Vector3,
    y: Vector3,
    z: Vector3,
    links: Vec<LinkUnit>,
    names: HashMap<String, usize>,
    offset: FrameOffset,
}

impl Frame {
    /// Creates a frame at the world origin with `n_links` empty links.
    #[must_use]
    pub fn new(key: &str, n_links: usize) -> Self {
        Self {
            key: key.to_string(),
            origin: Point3::origin(),
            x: Vector3::x(),
            y: Vector3::y(),
            z: Vector3::z(),
            links: vec![LinkUnit::default(); n_links],
            names: HashMap::new(),
            offset: FrameOffset::default(),
        }
    }

    /// The world frame: origin at zero, unit axes, no links.
    #[must_use]
    pub fn world() -> Self {
        Self::new("World", 0)
    }

    /// Component key name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Origin.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// X axis.
    #[must_use]
    pub fn x(&self) -> &Vector3 {
        &self.x
    }

    /// Y axis (the beam direction by convention).
    #[must_use]
    pub fn y(&self) -> &Vector3 {
        &self.y
    }

    /// Z axis.
    #[must_use]
    pub fn z(&self) -> &Vector3 {
        &self.z
    }

    /// Number of links.
    #[must_use]
    pub fn n_connect(&self) -> usize {
        self.links.len()
    }

    /// Resizes the link table, keeping existing entries.
    pub fn set_n_connect(&mut self, n: usize) {
        self.links.resize(n, LinkUnit::default());
    }

    /// Pending offset applied by [`Frame::create_unit_vector`].
    #[must_use]
    pub fn offset(&self) -> &FrameOffset {
        &self.offset
    }

    /// Sets the pending offset.
    pub fn set_offset(&mut self, offset: FrameOffset) {
        self.offset = offset;
    }

    /// Sets origin and basis from a beam axis `y` and an up hint `z`.
    ///
    /// # Errors
    ///
    /// Returns an error if `y` is zero-length or `y` and `z` are parallel.
    pub fn set_axes(&mut self, origin: Point3, y: Vector3, z: Vector3) -> Result<()> {
        let y_len = y.norm();
        if y_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let y = y / y_len;
        let z = z - y * z.dot(&y);
        let z_len = z.norm();
        if z_len < TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "{}: Y and Z axes are parallel",
                self.key
            ))
            .into());
        }
        self.origin = origin;
        self.y = y;
        self.z = z / z_len;
        self.x = self.y.cross(&self.z);
        Ok(())
    }

    /// Copies the frame of `parent` at `side` and applies the pending offset.
    ///
    /// The new origin is the parent's link point and the new `Y` is the
    /// link axis unchanged. `Z` is the parent's `Z` made orthogonal to `Y`
    /// (the parent's `X` when they are parallel) and `X = Y x Z`.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is not a link of `parent`.
    pub fn create_unit_vector(&mut self, parent: &Frame, side: i32) -> Result<()> {
        let point = parent.get_link_pt(side)?;
        let axis = parent.get_link_axis(side)?;

        let z = parent.z - axis * parent.z.dot(&axis);
        if z.norm() > TOLERANCE {
            self.z = z.normalize();
            self.x = axis.cross(&self.z);
        } else {
            let x = parent.x - axis * parent.x.dot(&axis);
            self.x = x.normalize();
            self.z = self.x.cross(&axis);
        }
        self.y = axis;
        self.origin = point;
        self.apply_offset();
        Ok(())
    }

    /// Applies the pending offset.
    pub fn apply_offset(&mut self) {
        let offset = self.offset;
        if !offset.is_zero() {
            offset.apply(self);
        }
    }

    /// Moves the origin along the current axes.
    pub fn apply_shift(&mut self, dx: f64, dy: f64, dz: f64) {
        self.origin += self.x * dx + self.y * dy + self.z * dz;
    }

    /// Rotates the basis: first about `X` by `z_angle`, then about the
    /// original `Z` by `xy_angle` (degrees).
    pub fn apply_angle_rotate(&mut self, xy_angle: f64, z_angle: f64) {
        let z_axis = self.z;
        if z_angle.abs() > TOLERANCE {
            let x_axis = self.x;
            self.y = rotate_deg(&self.y, &x_axis, z_angle);
            self.z = rotate_deg(&self.z, &x_axis, z_angle);
        }
        if xy_angle.abs() > TOLERANCE {
            self.x = rotate_deg(&self.x, &z_axis, xy_angle);
            self.y = rotate_deg(&self.y, &z_axis, xy_angle);
            self.z = rotate_deg(&self.z, &z_axis, xy_angle);
        }
    }

    /// Local coordinates to a world point.
    #[must_use]
    pub fn to_world(&self, local: &Vector3) -> Point3 {
        self.origin + self.x * local.x + self.y * local.y + self.z * local.z
    }

    /// World point to local coordinates.
    #[must_use]
    pub fn to_local(&self, point: &Point3) -> Vector3 {
        let d = point - self.origin;
        Vector3::new(d.dot(&self.x), d.dot(&self.y), d.dot(&self.z))
    }

    fn index_error(&self, index: i64) -> LinkError {
        LinkError::IndexOutOfRange {
            component: self.key.clone(),
            index,
            size: self.links.len(),
        }
    }

    fn link_mut(&mut self, index: usize) -> Result<&mut LinkUnit> {
        let err = self.index_error(i64::try_from(index).unwrap_or(i64::MAX));
        self.links.get_mut(index).ok_or_else(|| err.into())
    }

    /// Link behind a non-zero side index, which must have a point and axis.
    fn placed_link(&self, side: i32) -> Result<&LinkUnit> {
        let link = self.link(side)?;
        if !link.is_complete() {
            return Err(LinkError::NotSet {
                component: self.key.clone(),
                index: i64::from(side),
            }
            .into());
        }
        Ok(link)
    }

    /// Link behind a non-zero side index.
    fn link(&self, side: i32) -> Result<&LinkUnit> {
        let index = usize::try_from(side.unsigned_abs()).unwrap_or(usize::MAX);
        if side == 0 {
            return Err(self.index_error(0).into());
        }
        self.links
            .get(index - 1)
            .ok_or_else(|| self.index_error(i64::from(side)).into())
    }

    /// Sets the point and outward axis of link `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or `axis` is zero-length.
    pub fn set_connect(&mut self, index: usize, point: Point3, axis: Vector3) -> Result<()> {
        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        self.link_mut(index)?.set_connect(point, axis / len);
        Ok(())
    }

    /// Sets the main rule of link `index` to one signed surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn set_link_surf(&mut self, index: usize, handle: i32) -> Result<()> {
        self.link_mut(index)?.set_main(HeadRule::from_surf(handle));
        Ok(())
    }

    /// Sets the main rule of link `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn set_link_rule(&mut self, index: usize, rule: HeadRule) -> Result<()> {
        self.link_mut(index)?.set_main(rule);
        Ok(())
    }

    /// Intersects an extra signed surface into the main rule of link `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn add_link_surf(&mut self, index: usize, handle: i32) -> Result<()> {
        self.link_mut(index)?.add_main(&HeadRule::from_surf(handle));
        Ok(())
    }

    /// Sets the bridge rule of link `index` to one signed surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn set_bridge_surf(&mut self, index: usize, handle: i32) -> Result<()> {
        self.link_mut(index)?.set_bridge(HeadRule::from_surf(handle));
        Ok(())
    }

    /// Sets the bridge rule of link `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn set_bridge_rule(&mut self, index: usize, rule: HeadRule) -> Result<()> {
        self.link_mut(index)?.set_bridge(rule);
        Ok(())
    }

    /// Copies point, axis and full rule of `other` at `side` into link `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if either index is out of range.
    pub fn set_link_copy(&mut self, index: usize, other: &Frame, side: i32) -> Result<()> {
        let point = other.get_link_pt(side)?;
        let axis = other.get_link_axis(side)?;
        let rule = other.get_full_rule(side)?;
        let link = self.link_mut(index)?;
        link.set_connect(point, axis);
        link.set_main(rule);
        link.set_bridge(HeadRule::new());
        Ok(())
    }

    /// Gives link `index` a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn name_side_index(&mut self, index: usize, name: &str) -> Result<()> {
        self.link_mut(index)?;
        self.names.insert(name.to_string(), index);
        Ok(())
    }

    /// Converts a link name to a side index.
    ///
    /// Accepts `origin` (side 0), a plain integer, a registered name, or a
    /// name prefixed with `-` or `#` for the reversed side.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered.
    pub fn get_side_index(&self, name: &str) -> Result<i32> {
        if name.is_empty() || name == "origin" {
            return Ok(0);
        }
        if let Ok(side) = name.parse::<i32>() {
            return Ok(side);
        }
        if let Some(rest) = name.strip_prefix('-').or_else(|| name.strip_prefix('#')) {
            return Ok(-self.get_side_index(rest)?);
        }
        self.names
            .get(name)
            .and_then(|&i| i32::try_from(i + 1).ok())
            .ok_or_else(|| {
                LinkError::NameNotFound {
                    component: self.key.clone(),
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Link point at `side`; side 0 is the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is out of range or the link was never set.
    pub fn get_link_pt(&self, side: i32) -> Result<Point3> {
        if side == 0 {
            return Ok(self.origin);
        }
        Ok(self.placed_link(side)?.point())
    }

    /// Link axis at `side`, reversed for negative sides; side 0 is `Y`.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is out of range or the link was never set.
    pub fn get_link_axis(&self, side: i32) -> Result<Vector3> {
        if side == 0 {
            return Ok(self.y);
        }
        let axis = self.placed_link(side)?.axis();
        Ok(if side < 0 { -axis } else { axis })
    }

    /// Primary signed surface of the link at `side`, flipped for negative sides.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is out of range or the link has no surface.
    pub fn get_link_surf(&self, side: i32) -> Result<i32> {
        let no_surface = || LinkError::NoSurface {
            component: self.key.clone(),
            index: i64::from(side),
        };
        if side == 0 {
            return Err(no_surface().into());
        }
        let surf = self
            .link(side)?
            .main_rule()
            .primary_surface()
            .ok_or_else(no_surface)?;
        Ok(if side < 0 { -surf } else { surf })
    }

    /// Main rule at `side`, complemented for negative sides.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is out of range.
    pub fn get_main_rule(&self, side: i32) -> Result<HeadRule> {
        if side == 0 {
            return Ok(HeadRule::new());
        }
        let main = self.link(side)?.main_rule();
        Ok(if side < 0 { main.complement() } else { main.clone() })
    }

    /// Bridge rule at `side`; unchanged by the sign of `side`.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is out of range.
    pub fn get_bridge_rule(&self, side: i32) -> Result<HeadRule> {
        if side == 0 {
            return Ok(HeadRule::new());
        }
        Ok(self.link(side)?.bridge_rule().clone())
    }

    /// Main rule (complemented for negative sides) intersected with the bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is out of range.
    pub fn get_full_rule(&self, side: i32) -> Result<HeadRule> {
        Ok(self.get_main_rule(side)? * self.get_bridge_rule(side)?)
    }

    /// Human-readable summary of every link.
    #[must_use]
    pub fn link_table(&self) -> String {
        let mut out = String::new();
        for (i, link) in self.links.iter().enumerate() {
            let name = self
                .names
                .iter()
                .find(|(_, &v)| v == i)
                .map_or("", |(k, _)| k.as_str());
            let p = link.point();
            let a = link.axis();
            out.push_str(&format!(
                "{:>3} {:<10} ({:.4}, {:.4}, {:.4}) ({:.4}, {:.4}, {:.4}) {}\n",
                i + 1,
                name,
                p.x,
                p.y,
                p.z,
                a.x,
                a.y,
                a.z,
                link.main_rule()
            ));
        }
        out
    }
}
