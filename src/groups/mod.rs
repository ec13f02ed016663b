//! Name-to-cell-number bookkeeping for every component of a model.
//!
//! Each registered name owns one or more blocks of consecutive cell
//! numbers. A block is `quantum` numbers long and starts on the first
//! multiple of the quantum above everything already reserved, so blocks of
//! different names never overlap. The first number of a name's first block
//! doubles as its build index (the offset added to its local surface
//! numbers).

use std::collections::{BTreeSet, HashMap};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{GeometryError, GroupError, Result};
use crate::frame::Frame;

slotmap::new_key_type! {
    /// Unique identifier for a registered component.
    pub struct ComponentId;
}

/// Default block size.
pub const DEFAULT_QUANTUM: i32 = 10_000;

/// A half-open range `[start, end)` of cell numbers with a fill cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellBlock {
    start: i32,
    next: i32,
    end: i32,
}

impl CellBlock {
    fn overlaps(&self, start: i32, end: i32) -> bool {
        start < self.end && self.start < end
    }

    fn contains(&self, cell: i32) -> bool {
        self.start <= cell && cell < self.end
    }
}

/// Everything recorded about one registered name.
#[derive(Debug, Clone)]
struct GroupRecord {
    name: String,
    blocks: Vec<CellBlock>,
    cells: Vec<i32>,
    frame: Option<Frame>,
}

/// Process-wide registry of component names and their cell numbers.
#[derive(Debug)]
pub struct ObjectGroups {
    quantum: i32,
    high_water: i32,
    records: SlotMap<ComponentId, GroupRecord>,
    names: HashMap<String, ComponentId>,
    active: BTreeSet<i32>,
}

impl Default for ObjectGroups {
    fn default() -> Self {
        Self::with_quantum(DEFAULT_QUANTUM)
    }
}

impl ObjectGroups {
    /// Creates an empty allocator with the default quantum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty allocator with a custom block size.
    #[must_use]
    pub fn with_quantum(quantum: i32) -> Self {
        Self {
            quantum: quantum.max(1),
            high_water: 0,
            records: SlotMap::with_key(),
            names: HashMap::new(),
            active: BTreeSet::new(),
        }
    }

    /// Block size.
    #[must_use]
    pub fn quantum(&self) -> i32 {
        self.quantum
    }

    /// Registers a new name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already registered.
    pub fn add_object(&mut self, name: &str) -> Result<ComponentId> {
        if self.names.contains_key(name) {
            return Err(GroupError::DuplicateName(name.to_string()).into());
        }
        let id = self.records.insert(GroupRecord {
            name: name.to_string(),
            blocks: Vec::new(),
            cells: Vec::new(),
            frame: None,
        });
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Registers a new name owning the explicit range `[start, start + size)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the range overlaps any
    /// range already reserved.
    pub fn add_fixed_range(&mut self, name: &str, start: i32, size: i32) -> Result<ComponentId> {
        let end = start + size.max(1);
        for record in self.records.values() {
            if record.blocks.iter().any(|b| b.overlaps(start, end)) {
                return Err(GroupError::RangeOverlap {
                    name: name.to_string(),
                    start,
                    end,
                    other: record.name.clone(),
                }
                .into());
            }
        }
        let id = self.add_object(name)?;
        self.records[id].blocks.push(CellBlock {
            start,
            next: start,
            end,
        });
        self.high_water = self.high_water.max(end);
        debug!(name, start, end, "fixed cell range reserved");
        Ok(id)
    }

    /// True when `name` is registered.
    #[must_use]
    pub fn has_object(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Key of a registered name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered.
    pub fn id(&self, name: &str) -> Result<ComponentId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| GroupError::NameNotFound(name.to_string()).into())
    }

    /// Name of a registered key.
    #[must_use]
    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.records.get(id).map(|r| r.name.as_str())
    }

    fn record_mut(&mut self, name: &str) -> Result<&mut GroupRecord> {
        let id = self.id(name)?;
        self.records
            .get_mut(id)
            .ok_or_else(|| GroupError::NameNotFound(name.to_string()).into())
    }

    fn record(&self, name: &str) -> Result<&GroupRecord> {
        let id = self.id(name)?;
        self.records
            .get(id)
            .ok_or_else(|| GroupError::NameNotFound(name.to_string()).into())
    }

    fn reserve_block(&mut self, name: &str) -> Result<CellBlock> {
        let quantum = self.quantum;
        let start = (self.high_water + quantum - 1).div_euclid(quantum).max(1) * quantum;
        let block = CellBlock {
            start,
            next: start,
            end: start + quantum,
        };
        self.record_mut(name)?.blocks.push(block);
        self.high_water = block.end;
        debug!(name, start = block.start, end = block.end, "cell block reserved");
        Ok(block)
    }

    /// Base of the first block of `name`, reserving it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered.
    pub fn build_index(&mut self, name: &str) -> Result<i32> {
        if let Some(first) = self.record(name)?.blocks.first() {
            return Ok(first.start);
        }
        Ok(self.reserve_block(name)?.start)
    }

    /// Hands out the next cell number of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered.
    pub fn cell(&mut self, name: &str) -> Result<i32> {
        let has_room = self
            .record(name)?
            .blocks
            .last()
            .is_some_and(|b| b.next < b.end);
        if !has_room {
            self.reserve_block(name)?;
        }
        let record = self.record_mut(name)?;
        let Some(block) = record.blocks.last_mut() else {
            return Err(GroupError::NameNotFound(name.to_string()).into());
        };
        let cell = block.next;
        block.next += 1;
        record.cells.push(cell);
        self.active.insert(cell);
        Ok(cell)
    }

    /// Every cell number handed to `name`, in allocation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered.
    pub fn object_range(&self, name: &str) -> Result<&[i32]> {
        Ok(&self.record(name)?.cells)
    }

    /// Records `cell` as belonging to `name` without drawing it from a block.
    /// Used for hand-numbered cells inside a fixed range. Later calls to
    /// [`ObjectGroups::cell`] skip past it.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered, or if `cell` lies
    /// outside the name's own blocks.
    pub fn add_cell(&mut self, name: &str, cell: i32) -> Result<()> {
        if let Some(other) = self.owner(cell).filter(|&o| o != name) {
            return Err(GroupError::RangeOverlap {
                name: name.to_string(),
                start: cell,
                end: cell + 1,
                other: other.to_string(),
            }
            .into());
        }
        let record = self.record_mut(name)?;
        let Some(block) = record.blocks.iter_mut().find(|b| b.contains(cell)) else {
            return Err(GroupError::CellOutOfRange {
                name: name.to_string(),
                cell,
            }
            .into());
        };
        block.next = block.next.max(cell + 1);
        if !record.cells.contains(&cell) {
            record.cells.push(cell);
        }
        self.active.insert(cell);
        Ok(())
    }

    /// Span `[start, end)` of the first block of `name`, where its surface
    /// handles live.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or has no block yet.
    pub fn surf_span(&self, name: &str) -> Result<(i32, i32)> {
        self.record(name)?
            .blocks
            .first()
            .map(|b| (b.start, b.end))
            .ok_or_else(|| GroupError::NoRange(name.to_string()).into())
    }

    /// Checks that the `count` handles from `first` on all fall in the
    /// surface span of `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError::SurfaceOutOfRange`] naming the first
    /// offending handle.
    pub fn check_surf_span(&self, name: &str, first: i32, count: i32) -> Result<()> {
        let (start, end) = self.surf_span(name)?;
        let last = first.saturating_add(count.max(1) - 1);
        let bad = if first < start {
            Some(first)
        } else if last >= end {
            Some(last)
        } else {
            None
        };
        match bad {
            Some(handle) => Err(GeometryError::SurfaceOutOfRange {
                owner: name.to_string(),
                handle,
                start,
                end,
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Name owning the block that contains `cell`.
    #[must_use]
    pub fn owner(&self, cell: i32) -> Option<&str> {
        self.records
            .values()
            .find(|r| r.blocks.iter().any(|b| b.contains(cell)))
            .map(|r| r.name.as_str())
    }

    /// Marks a cell as part of the model.
    pub fn activate(&mut self, cell: i32) {
        self.active.insert(cell);
    }

    /// Removes a cell from the active set, returning whether it was active.
    pub fn deactivate(&mut self, cell: i32) -> bool {
        self.active.remove(&cell)
    }

    /// True when the cell is in the active set.
    #[must_use]
    pub fn is_active(&self, cell: i32) -> bool {
        self.active.contains(&cell)
    }

    /// Active cells in number order.
    pub fn active_cells(&self) -> impl Iterator<Item = i32> + '_ {
        self.active.iter().copied()
    }

    /// Stores the finished frame of `name` so later components can chain onto it.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered.
    pub fn set_frame(&mut self, name: &str, frame: Frame) -> Result<()> {
        self.record_mut(name)?.frame = Some(frame);
        Ok(())
    }

    /// The stored frame of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or has no stored frame.
    pub fn frame(&self, name: &str) -> Result<&Frame> {
        self.record(name)?
            .frame
            .as_ref()
            .ok_or_else(|| GroupError::FrameMissing(name.to_string()).into())
    }

    /// Registered names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }
}
