use std::collections::BTreeMap;

use crate::cell::CellTable;
use crate::error::{LinkError, Result};
use crate::rule::HeadRule;

/// Named groups of cells of one component (`"Void"`, `"Wall"`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellIndex {
    component: String,
    groups: BTreeMap<String, Vec<i32>>,
}

impl CellIndex {
    #[must_use]
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            groups: BTreeMap::new(),
        }
    }

    /// Appends `cell` to group `name`.
    pub fn add_cell(&mut self, name: &str, cell: i32) {
        self.groups.entry(name.to_string()).or_default().push(cell);
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// All cells in group `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist.
    pub fn cells(&self, name: &str) -> Result<&[i32]> {
        self.groups.get(name).map(Vec::as_slice).ok_or_else(|| {
            LinkError::CellGroupNotFound {
                component: self.component.clone(),
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Cell `index` of group `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or is too short.
    pub fn cell(&self, name: &str, index: usize) -> Result<i32> {
        let cells = self.cells(name)?;
        cells.get(index).copied().ok_or_else(|| {
            LinkError::IndexOutOfRange {
                component: self.component.clone(),
                index: i64::try_from(index).unwrap_or(i64::MAX),
                size: cells.len(),
            }
            .into()
        })
    }

    /// Every cell of every group.
    pub fn all_cells(&self) -> impl Iterator<Item = i32> + '_ {
        self.groups.values().flatten().copied()
    }

    /// ANDs `rule` into every cell of group `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the group or one of its cells does not exist.
    pub fn insert_component(&self, cells: &mut CellTable, name: &str, rule: &HeadRule) -> Result<()> {
        for &cell in self.cells(name)? {
            cells.add_intersection(cell, rule)?;
        }
        Ok(())
    }
}

/// Named groups of signed surface handles of one component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceIndex {
    component: String,
    groups: BTreeMap<String, Vec<i32>>,
}

impl SurfaceIndex {
    #[must_use]
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            groups: BTreeMap::new(),
        }
    }

    /// Appends a signed handle to group `name`.
    pub fn add_surf(&mut self, name: &str, handle: i32) {
        self.groups.entry(name.to_string()).or_default().push(handle);
    }

    fn group(&self, name: &str) -> Result<&[i32]> {
        self.groups.get(name).map(Vec::as_slice).ok_or_else(|| {
            LinkError::SurfGroupNotFound {
                component: self.component.clone(),
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Signed handle `index` of group `name`, as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or is too short.
    pub fn signed_surf(&self, name: &str, index: usize) -> Result<i32> {
        let group = self.group(name)?;
        group.get(index).copied().ok_or_else(|| {
            LinkError::IndexOutOfRange {
                component: self.component.clone(),
                index: i64::try_from(index).unwrap_or(i64::MAX),
                size: group.len(),
            }
            .into()
        })
    }

    /// Unsigned handle `index` of group `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or is too short.
    pub fn surf(&self, name: &str, index: usize) -> Result<i32> {
        Ok(self.signed_surf(name, index)?.abs())
    }

    /// Intersection of every signed handle in group `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist.
    pub fn rule(&self, name: &str) -> Result<HeadRule> {
        Ok(self
            .group(name)?
            .iter()
            .fold(HeadRule::new(), |acc, &h| acc * HeadRule::from_surf(h)))
    }
}
