use crate::error::Result;
use crate::vars::FuncDataBase;

use super::Frame;

/// User offset applied after a frame has been copied from its parent.
///
/// Angles are in degrees. The pre-rotation turns the copied basis, the
/// steps then move the origin along the turned axes, and the post-rotation
/// turns the basis again about the new origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOffset {
    pub pre_xy_angle: f64,
    pub pre_z_angle: f64,
    pub x_step: f64,
    pub y_step: f64,
    pub z_step: f64,
    pub xy_angle: f64,
    pub z_angle: f64,
}

impl FrameOffset {
    /// Reads `<key>XStep`, `YStep`, `ZStep`, `XYAngle`, `ZAngle`,
    /// `PreXYAngle` and `PreZAngle`, each defaulting to zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable exists but is not numeric.
    pub fn populate(vars: &FuncDataBase, key: &str) -> Result<Self> {
        let get = |suffix: &str| vars.eval_def_var::<f64>(&format!("{key}{suffix}"), 0.0);
        Ok(Self {
            pre_xy_angle: get("PreXYAngle")?,
            pre_z_angle: get("PreZAngle")?,
            x_step: get("XStep")?,
            y_step: get("YStep")?,
            z_step: get("ZStep")?,
            xy_angle: get("XYAngle")?,
            z_angle: get("ZAngle")?,
        })
    }

    /// True when applying the offset changes nothing.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the offset to `frame`.
    pub fn apply(&self, frame: &mut Frame) {
        frame.apply_angle_rotate(self.pre_xy_angle, self.pre_z_angle);
        frame.apply_shift(self.x_step, self.y_step, self.z_step);
        frame.apply_angle_rotate(self.xy_angle, self.z_angle);
    }
}
