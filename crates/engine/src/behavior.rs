//! Per-type behavior table consulted by the generic block-processing code.
//!
//! Each block type carries one [`BlockBehavior`]: a small record of
//! strategies picked at registration. Every entry is a pure function of the
//! cell and a read-only view of its surroundings; types never reach into
//! each other's tables.

use serde::Deserialize;

use crate::combine::CombineResult;
use crate::registry::BlockRegistry;
use crate::state::BlockCell;
use crate::weathering;
use crate::world::access::BlockView;
use crate::world::block::BlockId;
use crate::world::position::BlockPos;

/// Axis-aligned box in block units (`0.0..=1.0` spans one cell).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub const FULL: Aabb = Aabb {
        min: [0.0; 3],
        max: [1.0; 3],
    };

    /// Build from sixteenth-of-a-block coordinates, the way block models
    /// are usually authored.
    pub fn from_pixels(from: [f32; 3], to: [f32; 3]) -> Self {
        Self {
            min: from.map(|v| v / 16.0),
            max: to.map(|v| v / 16.0),
        }
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Empty,
    Full,
    Boxes(Vec<Aabb>),
}

impl Shape {
    pub fn is_full(&self) -> bool {
        matches!(self, Shape::Full)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Shape::Empty => true,
            Shape::Full => false,
            Shape::Boxes(boxes) => boxes.is_empty(),
        }
    }
}

/// How the renderer should draw a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderShape {
    Invisible,
    #[default]
    Model,
    /// Drawn by a block-entity renderer (animated lids and the like).
    EntityAnimated,
}

/// Outcome of using (right-clicking) a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionResult {
    /// Not handled; the caller may try something else.
    Pass,
    /// Handled with no further effect.
    Consume,
    /// Open the container formed by this cell and, maybe, its partner.
    OpenContainer(CombineResult),
    /// Replace the used cell with this state.
    Transform(BlockId),
}

pub struct UseContext<'a> {
    pub registry: &'a BlockRegistry,
    pub view: &'a dyn BlockView,
    pub cell: BlockCell<'a>,
    /// Name of the item in hand, if any.
    pub held: Option<&'a str>,
}

pub type ShapeFn = fn(&BlockCell<'_>, &dyn BlockView) -> Shape;
pub type UseFn = fn(&UseContext<'_>) -> InteractionResult;
pub type TickPredicateFn = fn(&BlockRegistry, &BlockCell<'_>) -> bool;

#[derive(Clone, Copy)]
pub enum ShapeRule {
    Fixed(FixedShape),
    Computed(ShapeFn),
}

/// Shapes that can be stated as data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedShape {
    Empty,
    Full,
    Box(Aabb),
}

#[derive(Clone, Copy)]
pub struct BlockBehavior {
    pub shape: ShapeRule,
    pub render: RenderShape,
    pub on_use: UseFn,
    /// `None` derives the flag from the shape: anything but a full cube lets
    /// skylight through.
    pub propagates_skylight: Option<bool>,
    /// Overrides random-tick eligibility. `None` means "tick while there is
    /// a weathering stage left".
    pub random_ticks: Option<TickPredicateFn>,
}

impl BlockBehavior {
    /// A solid, opaque cube that ignores interaction.
    pub const CUBE: BlockBehavior = BlockBehavior {
        shape: ShapeRule::Fixed(FixedShape::Full),
        render: RenderShape::Model,
        on_use: pass,
        propagates_skylight: None,
        random_ticks: None,
    };

    pub const fn air() -> Self {
        BlockBehavior {
            shape: ShapeRule::Fixed(FixedShape::Empty),
            render: RenderShape::Invisible,
            on_use: pass,
            propagates_skylight: Some(true),
            random_ticks: None,
        }
    }

    pub const fn with_shape(mut self, shape: ShapeRule) -> Self {
        self.shape = shape;
        self
    }

    pub const fn with_render(mut self, render: RenderShape) -> Self {
        self.render = render;
        self
    }

    pub const fn with_use(mut self, on_use: UseFn) -> Self {
        self.on_use = on_use;
        self
    }

    pub const fn with_skylight(mut self, propagates: bool) -> Self {
        self.propagates_skylight = Some(propagates);
        self
    }

    pub const fn with_random_ticks(mut self, predicate: TickPredicateFn) -> Self {
        self.random_ticks = Some(predicate);
        self
    }
}

impl Default for BlockBehavior {
    fn default() -> Self {
        Self::CUBE
    }
}

impl std::fmt::Debug for BlockBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self.shape {
            ShapeRule::Fixed(shape) => format!("{shape:?}"),
            ShapeRule::Computed(_) => "Computed".to_string(),
        };
        f.debug_struct("BlockBehavior")
            .field("shape", &shape)
            .field("render", &self.render)
            .field("propagates_skylight", &self.propagates_skylight)
            .field("random_ticks", &self.random_ticks.is_some())
            .finish()
    }
}

/// Default use handler.
pub fn pass(_: &UseContext<'_>) -> InteractionResult {
    InteractionResult::Pass
}

// ── Dispatch ─────────────────────────────────────────────────────────────

pub fn shape(cell: &BlockCell<'_>, view: &dyn BlockView) -> Shape {
    match cell.ty.behavior.shape {
        ShapeRule::Fixed(FixedShape::Empty) => Shape::Empty,
        ShapeRule::Fixed(FixedShape::Full) => Shape::Full,
        ShapeRule::Fixed(FixedShape::Box(aabb)) => Shape::Boxes(vec![aabb]),
        ShapeRule::Computed(f) => f(cell, view),
    }
}

pub fn render_shape(cell: &BlockCell<'_>) -> RenderShape {
    cell.ty.behavior.render
}

pub fn propagates_skylight(cell: &BlockCell<'_>, view: &dyn BlockView) -> bool {
    match cell.ty.behavior.propagates_skylight {
        Some(flag) => flag,
        None => !shape(cell, view).is_full(),
    }
}

/// Whether the cell should receive random ticks.
pub fn is_randomly_ticking(registry: &BlockRegistry, cell: &BlockCell<'_>) -> bool {
    match cell.ty.behavior.random_ticks {
        Some(predicate) => predicate(registry, cell),
        None => weathering::is_weathering_eligible(registry, cell),
    }
}

/// Use the block at `pos` with `held` in hand.
pub fn use_block(
    registry: &BlockRegistry,
    view: &dyn BlockView,
    pos: BlockPos,
    held: Option<&str>,
) -> InteractionResult {
    let ctx = UseContext {
        registry,
        view,
        cell: registry.cell_at(view, pos),
        held,
    };
    (ctx.cell.ty.behavior.on_use)(&ctx)
}
