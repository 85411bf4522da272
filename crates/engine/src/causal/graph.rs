use super::event::{Event, EventId, EventPayload};
use crate::world::block::BlockId;
use crate::world::position::BlockPos;
use slotmap::SlotMap;

/// A node in the causal DAG.
#[derive(Debug)]
pub struct EventNode {
    pub event: Event,
    pub parents: Vec<EventId>,
    pub children: Vec<EventId>,
    pub executed: bool,
}

/// The causal graph: an append-only DAG of events.
///
/// Invariant: if A is a parent of B, then A's world-write is visible before
/// B executes. A pairing update caused by a placement therefore always sees
/// the placed cell; events with no ancestry between them may run in any
/// order or in parallel.
pub struct CausalGraph {
    nodes: SlotMap<EventId, EventNode>,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, event: Event, parents: Vec<EventId>) -> EventId {
        let id = self.nodes.insert(EventNode {
            event,
            parents: parents.clone(),
            children: Vec::new(),
            executed: false,
        });

        for &parent_id in &parents {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.push(id);
            }
        }

        id
    }

    pub fn insert_root(&mut self, event: Event) -> EventId {
        self.insert(event, Vec::new())
    }

    /// Seed a batch of independent roots, e.g. one random-tick round.
    pub fn insert_roots(&mut self, events: impl IntoIterator<Item = Event>) -> Vec<EventId> {
        events.into_iter().map(|e| self.insert_root(e)).collect()
    }

    /// All events whose parents have all been executed, but which have not
    /// been executed themselves.
    pub fn frontier(&self) -> Vec<EventId> {
        self.nodes
            .iter()
            .filter(|(_, node)| {
                !node.executed
                    && node
                        .parents
                        .iter()
                        .all(|p| self.nodes.get(*p).is_some_and(|n| n.executed))
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub fn mark_executed(&mut self, id: EventId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.executed = true;
        }
    }

    pub fn get(&self, id: EventId) -> Option<&EventNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn executed_count(&self) -> usize {
        self.nodes.values().filter(|n| n.executed).count()
    }

    pub fn all_ids(&self) -> Vec<EventId> {
        self.nodes.keys().collect()
    }

    /// Every executed cell replacement as `(position, new state)`, in graph
    /// order. Later entries for the same position win.
    pub fn block_changes(&self) -> Vec<(BlockPos, BlockId)> {
        self.nodes
            .values()
            .filter(|node| node.executed)
            .filter_map(|node| match node.event.payload {
                EventPayload::BlockSet { pos, new, .. } => Some((pos, new)),
                _ => None,
            })
            .collect()
    }

    /// The chain of events that led to `id`, root first, following the
    /// first parent at each step.
    pub fn lineage(&self, id: EventId) -> Vec<EventId> {
        let mut chain = vec![id];
        let mut cursor = id;
        while let Some(&parent) = self.nodes.get(cursor).and_then(|n| n.parents.first()) {
            chain.push(parent);
            cursor = parent;
        }
        chain.reverse();
        chain
    }

    /// Export the graph in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from(
            "digraph causal {\n  rankdir=BT;\n  node [shape=box, fontname=\"monospace\", fontsize=10];\n",
        );
        for (id, node) in &self.nodes {
            let (label, color) = match &node.event.payload {
                EventPayload::BlockSet { pos, old, new } => (
                    format!(
                        "Set ({},{},{})\\n{} -> {}",
                        pos.x, pos.y, pos.z, old.0, new.0
                    ),
                    "#d4edda",
                ),
                EventPayload::BlockNotify { pos } => (
                    format!("Notify ({},{},{})", pos.x, pos.y, pos.z),
                    "#fff3cd",
                ),
                EventPayload::RandomTick { pos, roll } => (
                    format!("Tick ({},{},{})\\nroll {:.3}", pos.x, pos.y, pos.z, roll),
                    "#d1ecf1",
                ),
            };
            let fill = if node.executed { color } else { "#f8f9fa" };
            out.push_str(&format!(
                "  \"{id:?}\" [label=\"{label}\", style=filled, fillcolor=\"{fill}\"];\n"
            ));
            for parent in &node.parents {
                out.push_str(&format!("  \"{parent:?}\" -> \"{id:?}\";\n"));
            }
        }
        out.push_str("}\n");
        out
    }
}

impl Default for CausalGraph {
    fn default() -> Self {
        Self::new()
    }
}
