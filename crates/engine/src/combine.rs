//! Pairing of two adjacent cells into one logical object (double chests).
//!
//! A combinable type declares a horizontal `facing` property and a pairing
//! property valued `single`, `left` or `right`. A `left` cell looks for its
//! partner clockwise of its facing, a `right` cell counter-clockwise, so a
//! matched pair always points at each other. The `left` cell is the
//! primary half no matter which half asked.
//!
//! Resolution is a read-only projection over a [`BlockView`]: it never
//! writes, and an unmatched or half-loaded pair is reported as
//! [`CombineResult::NoCombination`] rather than an error.

use serde::Deserialize;

use crate::registry::BlockRegistry;
use crate::state::BlockCell;
use crate::world::access::BlockView;
use crate::world::aux_state::{AuxHandle, AuxState, ItemStack};
use crate::world::position::{BlockPos, Direction};

/// Which property names carry orientation and pairing for a combinable type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CombineRule {
    #[serde(default = "default_facing")]
    pub facing: String,
    #[serde(default = "default_pairing")]
    pub pairing: String,
}

fn default_facing() -> String {
    "facing".to_string()
}

fn default_pairing() -> String {
    "type".to_string()
}

impl Default for CombineRule {
    fn default() -> Self {
        Self {
            facing: default_facing(),
            pairing: default_pairing(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pairing {
    Single,
    Left,
    Right,
}

impl Pairing {
    pub const ALL: [Pairing; 3] = [Pairing::Single, Pairing::Left, Pairing::Right];

    pub const fn name(self) -> &'static str {
        match self {
            Pairing::Single => "single",
            Pairing::Left => "left",
            Pairing::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<Pairing> {
        Pairing::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The pairing the partner of a cell with this pairing must have.
    pub const fn complement(self) -> Pairing {
        match self {
            Pairing::Single => Pairing::Single,
            Pairing::Left => Pairing::Right,
            Pairing::Right => Pairing::Left,
        }
    }

    /// Direction from a cell with this pairing towards its partner.
    pub const fn partner_direction(self, facing: Direction) -> Option<Direction> {
        match self {
            Pairing::Single => None,
            Pairing::Left => Some(facing.clockwise()),
            Pairing::Right => Some(facing.counter_clockwise()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineResult {
    Single(AuxHandle),
    Combined {
        primary: AuxHandle,
        secondary: AuxHandle,
    },
    NoCombination,
}

impl CombineResult {
    pub fn primary(&self) -> Option<AuxHandle> {
        match *self {
            CombineResult::Single(handle) => Some(handle),
            CombineResult::Combined { primary, .. } => Some(primary),
            CombineResult::NoCombination => None,
        }
    }

    /// Handles in primary-then-secondary order.
    pub fn handles(&self) -> Vec<AuxHandle> {
        match *self {
            CombineResult::Single(handle) => vec![handle],
            CombineResult::Combined { primary, secondary } => vec![primary, secondary],
            CombineResult::NoCombination => Vec::new(),
        }
    }

    pub fn is_combined(&self) -> bool {
        matches!(self, CombineResult::Combined { .. })
    }
}

/// Override predicate: `true` forces the cell at the position out of any
/// pairing.
pub type BlockedFn<'a> = &'a dyn Fn(&dyn BlockView, BlockPos) -> bool;

/// Predicate that never blocks.
pub fn never_blocked(_: &dyn BlockView, _: BlockPos) -> bool {
    false
}

/// Orientation and pairing of a combinable cell. `None` when the type is
/// not combinable or either property reads as something unexpected.
pub fn orientation(cell: &BlockCell<'_>) -> Option<(Direction, Pairing)> {
    let rule = cell.ty.combine.as_ref()?;
    let facing = cell.direction(&rule.facing)?;
    let pairing = Pairing::from_name(cell.value(&rule.pairing)?)?;
    Some((facing, pairing))
}

/// Direction from `cell` to the partner it claims, if any.
pub fn connected_direction(cell: &BlockCell<'_>) -> Option<Direction> {
    let (facing, pairing) = orientation(cell)?;
    pairing.partner_direction(facing)
}

/// Resolve the logical object the cell at `pos` belongs to.
pub fn combine(
    registry: &BlockRegistry,
    view: &dyn BlockView,
    pos: BlockPos,
    blocked: BlockedFn<'_>,
) -> CombineResult {
    let cell = registry.cell_at(view, pos);
    if !view.has_aux(pos) {
        tracing::trace!("combine {:?}: no aux state", pos);
        return CombineResult::NoCombination;
    }

    let (Some((facing, pairing)), Some(dir)) = (orientation(&cell), connected_direction(&cell))
    else {
        return CombineResult::Single(AuxHandle(pos));
    };

    let neighbor_pos = pos.offset(dir);
    let neighbor = registry.cell_at(view, neighbor_pos);
    let matched = neighbor.is_type(&cell)
        && orientation(&neighbor) == Some((facing, pairing.complement()))
        && view.has_aux(neighbor_pos)
        && !blocked(view, pos)
        && !blocked(view, neighbor_pos);
    if !matched {
        tracing::trace!("combine {:?}: partner at {:?} does not match", pos, neighbor_pos);
        return CombineResult::NoCombination;
    }

    let (primary, secondary) = match pairing {
        Pairing::Left => (pos, neighbor_pos),
        _ => (neighbor_pos, pos),
    };
    CombineResult::Combined {
        primary: AuxHandle(primary),
        secondary: AuxHandle(secondary),
    }
}

/// Read-only view over the slots of a single or combined container,
/// primary half first.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerView {
    parts: Vec<(AuxHandle, AuxState)>,
}

impl ContainerView {
    /// Snapshot the records behind `result`. `None` for
    /// [`CombineResult::NoCombination`] or when a record has vanished.
    pub fn open(view: &dyn BlockView, result: &CombineResult) -> Option<ContainerView> {
        let handles = result.handles();
        if handles.is_empty() {
            return None;
        }
        let parts = handles
            .into_iter()
            .map(|handle| view.aux_snapshot(handle.pos()).map(|state| (handle, state)))
            .collect::<Option<Vec<_>>>()?;
        Some(ContainerView { parts })
    }

    pub fn len(&self) -> usize {
        self.parts.iter().map(|(_, state)| state.slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_double(&self) -> bool {
        self.parts.len() == 2
    }

    /// Which record holds overall slot `index`, and the index within it.
    pub fn locate(&self, mut index: usize) -> Option<(AuxHandle, usize)> {
        for (handle, state) in &self.parts {
            if index < state.slots.len() {
                return Some((*handle, index));
            }
            index -= state.slots.len();
        }
        None
    }

    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        let (handle, local) = self.locate(index)?;
        self.parts
            .iter()
            .find(|(h, _)| *h == handle)
            .and_then(|(_, state)| state.slot(local))
    }

    pub fn viewers(&self) -> u32 {
        self.parts.iter().map(|(_, state)| state.viewers).sum()
    }
}
