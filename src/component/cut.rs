use std::collections::BTreeMap;

use crate::error::{LinkError, Result};
use crate::frame::Frame;
use crate::geometry::SurfaceRegistry;
use crate::math::{Point3, Vector3};
use crate::rule::HeadRule;

#[derive(Debug, Clone, Default, PartialEq)]
struct Cut {
    main: HeadRule,
    bridge: HeadRule,
}

/// Boundaries supplied from outside a component, such as the back face
/// of the component it is plugged into.
///
/// A cut rule describes the region on the component's side of the
/// boundary, so it can be intersected straight into the component's cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutSet {
    component: String,
    cuts: BTreeMap<String, Cut>,
}

impl CutSet {
    #[must_use]
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            cuts: BTreeMap::new(),
        }
    }

    /// Takes cut `name` from link `side` of `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is not a link of `frame`.
    pub fn set_cut_surf(&mut self, name: &str, frame: &Frame, side: i32) -> Result<()> {
        let cut = Cut {
            main: frame.get_main_rule(side)?,
            bridge: frame.get_bridge_rule(side)?,
        };
        self.cuts.insert(name.to_string(), cut);
        Ok(())
    }

    /// Sets cut `name` from a rule.
    pub fn set_cut_rule(&mut self, name: &str, rule: HeadRule) {
        self.cuts.insert(
            name.to_string(),
            Cut {
                main: rule,
                bridge: HeadRule::new(),
            },
        );
    }

    /// Sets the bridge of an existing cut.
    ///
    /// # Errors
    ///
    /// Returns an error if the cut is not set.
    pub fn set_cut_bridge(&mut self, name: &str, rule: HeadRule) -> Result<()> {
        self.get_mut(name)?.bridge = rule;
        Ok(())
    }

    #[must_use]
    pub fn has_cut(&self, name: &str) -> bool {
        self.cuts.contains_key(name)
    }

    fn not_found(&self, name: &str) -> LinkError {
        LinkError::CutNotFound {
            component: self.component.clone(),
            name: name.to_string(),
        }
    }

    fn get(&self, name: &str) -> Result<&Cut> {
        self.cuts.get(name).ok_or_else(|| self.not_found(name).into())
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Cut> {
        let err = self.not_found(name);
        self.cuts.get_mut(name).ok_or_else(|| err.into())
    }

    /// The cut rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the cut is not set.
    pub fn rule(&self, name: &str) -> Result<HeadRule> {
        Ok(self.get(name)?.main.clone())
    }

    /// The cut rule, or the empty rule if the cut is not set.
    #[must_use]
    pub fn rule_or_empty(&self, name: &str) -> HeadRule {
        self.cuts
            .get(name)
            .map_or_else(HeadRule::new, |c| c.main.clone())
    }

    /// Complement of the cut rule: the region beyond the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the cut is not set.
    pub fn complement_rule(&self, name: &str) -> Result<HeadRule> {
        Ok(self.get(name)?.main.complement())
    }

    /// Bridge of the cut.
    ///
    /// # Errors
    ///
    /// Returns an error if the cut is not set.
    pub fn bridge_rule(&self, name: &str) -> Result<HeadRule> {
        Ok(self.get(name)?.bridge.clone())
    }

    /// Sets link `index` of `frame` where the ray from `origin` along `axis`
    /// leaves the region of cut `name`.
    ///
    /// The link axis is `axis` and its rule is the region beyond the cut.
    ///
    /// # Errors
    ///
    /// Returns an error if the cut is not set, the ray never crosses it or
    /// the link index is out of range.
    pub fn create_link(
        &self,
        name: &str,
        registry: &SurfaceRegistry,
        frame: &mut Frame,
        index: usize,
        origin: &Point3,
        axis: &Vector3,
    ) -> Result<()> {
        let cut = self.get(name)?;
        let hit = cut
            .main
            .track_line(registry, origin, axis)?
            .ok_or_else(|| LinkError::NoIntercept {
                component: self.component.clone(),
                name: name.to_string(),
            })?;
        frame.set_connect(index, hit.point, *axis)?;
        frame.set_link_rule(index, cut.main.complement())?;
        frame.set_bridge_rule(index, cut.bridge.clone())?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::rule::tests::test_registry;
    use approx::assert_relative_eq;

    #[test]
    fn cut_from_frame_link() {
        let mut prev = Frame::new("Prev", 2);
        prev.set_connect(1, Point3::new(2.0, 0.0, 0.0), Vector3::x()).unwrap();
        prev.set_link_surf(1, 6).unwrap();

        let mut cuts = CutSet::new("Next");
        cuts.set_cut_surf("front", &prev, 2).unwrap();
        assert_eq!(cuts.rule("front").unwrap().to_string(), "6");
        assert_eq!(cuts.complement_rule("front").unwrap().to_string(), "-6");
        cuts.set_cut_surf("back", &prev, -2).unwrap();
        assert_eq!(cuts.rule("back").unwrap().to_string(), "-6");
        assert!(cuts.rule_or_empty("side").is_empty());
        assert!(matches!(
            cuts.rule("side"),
            Err(KernelError::Link(LinkError::CutNotFound { .. }))
        ));
    }

    #[test]
    fn create_link_finds_the_cut() {
        let reg = test_registry();
        let mut cuts = CutSet::new("Box");
        cuts.set_cut_rule("back", HeadRule::from_surf(-6));
        let mut frame = Frame::new("Box", 1);
        cuts.create_link("back", &reg, &mut frame, 0, &Point3::origin(), &Vector3::x())
            .unwrap();
        assert_relative_eq!(frame.get_link_pt(1).unwrap(), Point3::new(2.0, 0.0, 0.0), epsilon = 1e-9);
        assert_eq!(frame.get_link_surf(1).unwrap(), 6);

        let err = cuts
            .create_link("back", &reg, &mut frame, 0, &Point3::origin(), &-Vector3::x())
            .unwrap_err();
        assert!(matches!(err, KernelError::Link(LinkError::NoIntercept { .. })));
    }
}
