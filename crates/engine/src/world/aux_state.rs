//! Auxiliary per-position state for entity-backed block types.
//!
//! The world owns these records; everything else refers to them through an
//! [`AuxHandle`], which is just the position they are attached to.

use super::position::BlockPos;

/// Identifies what kind of block entity an [`AuxState`] belongs to
/// (`"chest"`, `"barrel"`, ...). Compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuxKind(pub &'static str);

/// Handle to the aux state stored at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuxHandle(pub BlockPos);

impl AuxHandle {
    pub const fn pos(self) -> BlockPos {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub item: String,
    pub count: u8,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u8) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// Mutable record attached to one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxState {
    pub kind: AuxKind,
    pub slots: Vec<Option<ItemStack>>,
    /// Number of players currently looking into this container.
    pub viewers: u32,
    /// Lid openness in `0.0..=1.0`, driven by a ticker.
    pub openness: f32,
    /// Ticks this record has been ticked.
    pub age: u64,
}

impl AuxState {
    /// A record with no inventory.
    pub fn new(kind: AuxKind) -> Self {
        Self::container(kind, 0)
    }

    pub fn container(kind: AuxKind, size: usize) -> Self {
        Self {
            kind,
            slots: vec![None; size],
            viewers: 0,
            openness: 0.0,
            age: 0,
        }
    }

    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Put `stack` into `index`, returning whatever was there. Out-of-range
    /// indices hand the stack straight back.
    pub fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        match self.slots.get_mut(index) {
            Some(slot) => std::mem::replace(slot, stack),
            None => stack,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
