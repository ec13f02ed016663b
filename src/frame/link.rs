use crate::math::{Point3, Vector3};
use crate::rule::HeadRule;

/// One exit frame of a component: a point, an outward axis, the rule that
/// bounds the component there and an optional bridge rule.
///
/// The bridge rule is a divider that selects the intended branch of an
/// otherwise symmetric main rule (for example one side of a cylinder).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkUnit {
    point: Option<Point3>,
    axis: Option<Vector3>,
    main: HeadRule,
    bridge: HeadRule,
}

impl LinkUnit {
    /// True when both the point and the axis have been set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.point.is_some() && self.axis.is_some()
    }

    /// Link point, or the origin when unset.
    #[must_use]
    pub fn point(&self) -> Point3 {
        self.point.unwrap_or_else(Point3::origin)
    }

    /// Outward unit axis, or zero when unset.
    #[must_use]
    pub fn axis(&self) -> Vector3 {
        self.axis.unwrap_or_else(Vector3::zeros)
    }

    /// Rule bounding the component at this link.
    #[must_use]
    pub fn main_rule(&self) -> &HeadRule {
        &self.main
    }

    /// Divider rule.
    #[must_use]
    pub fn bridge_rule(&self) -> &HeadRule {
        &self.bridge
    }

    pub(super) fn set_connect(&mut self, point: Point3, axis: Vector3) {
        self.point = Some(point);
        self.axis = Some(axis);
    }

    pub(super) fn set_main(&mut self, rule: HeadRule) {
        self.main = rule;
    }

    pub(super) fn add_main(&mut self, rule: &HeadRule) {
        self.main.add_intersection(rule);
    }

    pub(super) fn set_bridge(&mut self, rule: HeadRule) {
        self.bridge = rule;
    }
}
