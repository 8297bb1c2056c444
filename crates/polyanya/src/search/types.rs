//! Data types for the interval search: successors, nodes, the node arena and
//! open-list entries.
//!
//! Kept small and `Copy` so the expansion loop can shuffle them through
//! scratch buffers without allocating.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::geometry::{Coords, Point};
use crate::mesh::{PolygonId, VertexId};

/// How a successor interval is seen from the current root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuccessorType {
    /// Reached by bending around the right end of the current interval.
    RightNonObservable,
    /// Directly visible from the current root.
    Observable,
    /// Reached by bending around the left end of the current interval.
    LeftNonObservable,
}

/// A candidate interval on one edge of the polygon being expanded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Successor {
    pub kind: SuccessorType,
    pub left: Point,
    pub right: Point,
    /// Index into the expanded polygon's `vertices`/`polygons` naming the
    /// edge `vertices[i-1] → vertices[i]` the interval lies on.
    pub poly_left_ind: usize,
}

impl fmt::Display for Successor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} [{}, {}] on edge {}",
            self.kind,
            Coords(self.left),
            Coords(self.right),
            self.poly_left_ind
        )
    }
}

/// Handle to a node in a [`NodeArena`]; only valid for the generation
/// (search) that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// A search node: the interval `left..right` on the edge into
/// `next_polygon`, seen from `root`.
///
/// `root == None` means the apex is the start point. Viewed from the apex
/// the interval never sweeps counterclockwise from `left` to `right`.
#[derive(Clone, Copy, Debug)]
pub struct SearchNode {
    pub parent: Option<NodeId>,
    pub root: Option<VertexId>,
    pub left: Point,
    pub right: Point,
    pub left_vertex: Option<VertexId>,
    pub right_vertex: Option<VertexId>,
    pub next_polygon: PolygonId,
    pub f: f64,
    pub g: f64,
}

impl fmt::Display for SearchNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(v) => write!(f, "root=V{v}")?,
            None => write!(f, "root=start")?,
        }
        write!(
            f,
            "; left={}; right={}; next=P{}; f={}, g={}",
            Coords(self.left),
            Coords(self.right),
            self.next_polygon,
            self.f,
            self.g
        )
    }
}

/// Bump storage for the nodes of one search.
///
/// `reclaim` drops every node at once and retires all outstanding ids.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
    generation: u32,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: SearchNode) -> NodeId {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeId {
            index,
            generation: self.generation,
        }
    }

    /// The node behind `id`, or `None` if `id` is from an earlier generation.
    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    pub fn reclaim(&mut self) {
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = SearchNode;

    fn index(&self, id: NodeId) -> &SearchNode {
        debug_assert_eq!(id.generation, self.generation, "stale node id");
        &self.nodes[id.index as usize]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut SearchNode {
        debug_assert_eq!(id.generation, self.generation, "stale node id");
        &mut self.nodes[id.index as usize]
    }
}

/// Open-list entry. `BinaryHeap` pops the smallest `f` first, preferring the
/// larger `g` among equal `f`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
    pub(crate) f: f64,
    pub(crate) g: f64,
    pub(crate) id: NodeId,
}

impl OpenEntry {
    pub(crate) fn new(id: NodeId, node: &SearchNode) -> Self {
        Self {
            f: node.f,
            g: node.g,
            id,
        }
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse on f to make BinaryHeap behave like a min-heap.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.g.total_cmp(&other.g))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}
