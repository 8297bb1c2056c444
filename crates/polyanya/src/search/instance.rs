//! One reusable search context bound to a mesh.
//!
//! A `SearchInstance` owns everything a query allocates (node arena, open
//! list, per-vertex pruning arrays, scratch buffers) so that repeated
//! `set_start_goal` + `search` calls reuse memory instead of reallocating.

use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::geometry::{approx_eq, cross, distance, Coords, Point, EPSILON};
use crate::mesh::{Mesh, PointLocation, PolygonId, VertexId};

use super::expansion::{get_h_value, get_successors};
use super::types::{NodeArena, NodeId, OpenEntry, SearchNode, Successor, SuccessorType};

/// Counters for the most recent `search()` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes stored in the arena.
    pub nodes_generated: usize,
    /// Nodes pushed onto the open list.
    pub nodes_pushed: usize,
    /// Nodes popped off the open list.
    pub nodes_popped: usize,
    /// Popped nodes discarded because their root was already reached cheaper.
    pub nodes_pruned_post_pop: usize,
    /// Calls to `get_successors`.
    pub successor_calls: usize,
}

/// Per-thread search state over a shared [`Mesh`].
pub struct SearchInstance<'m> {
    mesh: &'m Mesh,
    start: Point,
    goal: Point,

    arena: NodeArena,
    open: BinaryHeap<OpenEntry>,
    final_node: Option<NodeId>,
    end_polygon: Option<PolygonId>,

    // Best g seen per root vertex, valid where the matching id equals
    // `search_id`.
    root_g_values: Vec<f64>,
    root_search_ids: Vec<u32>,
    search_id: u32,

    successors: Vec<Successor>,
    nodes_to_push: Vec<SearchNode>,

    elapsed: Duration,
    stats: SearchStats,
}

impl<'m> SearchInstance<'m> {
    pub fn new(mesh: &'m Mesh) -> Self {
        let scratch = mesh.max_poly_sides() + 2;
        let num_vertices = mesh.vertices().len();
        Self {
            mesh,
            start: Point::zeros(),
            goal: Point::zeros(),
            arena: NodeArena::new(),
            open: BinaryHeap::new(),
            final_node: None,
            end_polygon: None,
            root_g_values: vec![0.0; num_vertices],
            root_search_ids: vec![0; num_vertices],
            search_id: 0,
            successors: Vec::with_capacity(scratch),
            nodes_to_push: Vec::with_capacity(scratch),
            elapsed: Duration::ZERO,
            stats: SearchStats::default(),
        }
    }

    pub fn with_start_goal(mesh: &'m Mesh, start: Point, goal: Point) -> Self {
        let mut si = Self::new(mesh);
        si.set_start_goal(start, goal);
        si
    }

    /// Sets the next query. Forgets the previous result.
    pub fn set_start_goal(&mut self, start: Point, goal: Point) {
        self.start = start;
        self.goal = goal;
        self.final_node = None;
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn mesh(&self) -> &'m Mesh {
        self.mesh
    }

    /// Runs the query set by `set_start_goal`. Returns whether a path exists.
    pub fn search(&mut self) -> bool {
        let timer = Instant::now();
        let found = self.run();
        self.elapsed = timer.elapsed();
        found
    }

    /// Length of the path found by the last `search`, or `-1` without one.
    pub fn get_cost(&self) -> f64 {
        self.cost().unwrap_or(-1.0)
    }

    pub fn cost(&self) -> Option<f64> {
        self.final_node.map(|id| self.arena[id].f)
    }

    /// Writes the path (start first, goal last) into `out`.
    ///
    /// Leaves `out` untouched when the last search found nothing.
    pub fn get_path_points(&self, out: &mut Vec<Point>) {
        let Some(final_node) = self.final_node else {
            return;
        };
        out.clear();
        out.push(self.goal);
        let mut cur = Some(final_node);
        while let Some(id) = cur {
            let node = &self.arena[id];
            let p = self.root_point(node.root);
            if out.last().map_or(true, |last| !approx_eq(&p, last)) {
                out.push(p);
            }
            cur = node.parent;
        }
        out.reverse();
    }

    pub fn path_points(&self) -> Vec<Point> {
        let mut out = Vec::new();
        self.get_path_points(&mut out);
        out
    }

    /// Wall time of the last `search`, in microseconds.
    pub fn get_search_micro(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e6
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// The node chain behind the last result, terminal node first.
    pub fn search_nodes(&self) -> Vec<SearchNode> {
        let mut out = Vec::new();
        let mut cur = self.final_node;
        while let Some(id) = cur {
            let node = self.arena[id];
            out.push(node);
            cur = node.parent;
        }
        out
    }

    /// Locates `p`, resolving ambiguous corner vertices to a neighbouring
    /// polygon by nudging the point up and to the right.
    pub fn get_point_location(&self, p: &Point) -> PointLocation {
        let loc = self.mesh.get_point_location(p);
        let PointLocation::OnCornerVertexAmbig { vertex, .. } = loc else {
            return loc;
        };
        let corrected = p + Point::new(10.0 * EPSILON, 10.0 * EPSILON);
        let corrected_loc = self.mesh.get_point_location(&corrected);
        tracing::debug!(point = %Coords(*p), %corrected_loc, "ambiguous point relocated");
        match corrected_loc {
            PointLocation::InPolygon(_)
            | PointLocation::OnMeshBorder { .. }
            | PointLocation::OnEdge { .. } => PointLocation::OnCornerVertexAmbig {
                vertex,
                poly: corrected_loc.poly1(),
            },
            PointLocation::NotOnMesh
            | PointLocation::OnCornerVertexAmbig { .. }
            | PointLocation::OnCornerVertexUnambig { .. }
            | PointLocation::OnNonCornerVertex { .. } => {
                tracing::warn!(point = %Coords(*p), "completely ambiguous point");
                loc
            }
        }
    }

    #[inline]
    fn root_point(&self, root: Option<VertexId>) -> Point {
        root.map_or(self.start, |r| self.mesh.vertices()[r].p)
    }

    fn init_search(&mut self) {
        self.arena.reclaim();
        self.search_id = self.search_id.wrapping_add(1);
        if self.search_id == 0 {
            // Wrapped: ids from 2^32 searches ago would look current.
            self.root_search_ids.fill(0);
            self.search_id = 1;
        }
        self.open.clear();
        self.final_node = None;
        self.stats = SearchStats::default();
        self.set_end_polygon();
        if self.end_polygon.is_some() {
            self.gen_initial_nodes();
        }
    }

    fn set_end_polygon(&mut self) {
        let goal = self.goal;
        self.end_polygon = self.get_point_location(&goal).poly1();
    }

    fn gen_initial_nodes(&mut self) {
        let start = self.start;
        match self.get_point_location(&start) {
            PointLocation::NotOnMesh | PointLocation::OnCornerVertexAmbig { poly: None, .. } => {}
            PointLocation::OnCornerVertexAmbig {
                poly: Some(poly), ..
            }
            | PointLocation::OnCornerVertexUnambig { poly, .. }
            | PointLocation::InPolygon(poly)
            | PointLocation::OnMeshBorder { poly, .. } => self.push_lazy(poly, None, None),
            PointLocation::OnEdge {
                poly1,
                poly2,
                left,
                right,
            } => {
                // Both sides, skipping the shared edge.
                self.push_lazy(poly2, Some(left), Some(right));
                if self.final_node.is_none() {
                    self.push_lazy(poly1, Some(right), Some(left));
                }
            }
            PointLocation::OnNonCornerVertex { vertex, .. } => {
                let mesh = self.mesh;
                for &poly in mesh.vertices()[vertex].polygons.iter().flatten() {
                    self.push_lazy(poly, Some(vertex), Some(vertex));
                    if self.final_node.is_some() {
                        return;
                    }
                }
            }
        }
    }

    /// Seeds the open list from a degenerate node sitting on the start point
    /// inside `poly`. Edges touching `left_vertex`/`right_vertex` are skipped.
    fn push_lazy(
        &mut self,
        poly: PolygonId,
        left_vertex: Option<VertexId>,
        right_vertex: Option<VertexId>,
    ) {
        let lazy = SearchNode {
            parent: None,
            root: None,
            left: self.start,
            right: self.start,
            left_vertex,
            right_vertex,
            next_polygon: poly,
            f: distance(&self.start, &self.goal),
            g: 0.0,
        };
        let lazy_id = self.arena.alloc(lazy);
        self.stats.nodes_generated += 1;
        if Some(poly) == self.end_polygon {
            tracing::debug!(poly, "start and goal share a polygon");
            self.final_node = Some(lazy_id);
            return;
        }

        let mesh = self.mesh;
        let vertices = &mesh.polygons()[poly].vertices;
        self.successors.clear();
        let mut last_vertex = vertices[vertices.len() - 1];
        for (i, &vertex) in vertices.iter().enumerate() {
            if Some(vertex) != right_vertex && Some(last_vertex) != left_vertex {
                self.successors.push(Successor {
                    kind: SuccessorType::Observable,
                    left: mesh.vertices()[vertex].p,
                    right: mesh.vertices()[last_vertex].p,
                    poly_left_ind: i,
                });
            }
            last_vertex = vertex;
        }
        self.succ_to_node(&lazy);
        self.push_nodes(lazy_id);
    }

    /// Turns `self.successors` (expanded from `parent`) into nodes in
    /// `self.nodes_to_push`.
    ///
    /// Drops successors into obstacles and into one-way polygons other than
    /// the goal's, and those whose new root was already reached cheaper.
    /// `f` is set to `g`; the heuristic is added when the node is pushed.
    fn succ_to_node(&mut self, parent: &SearchNode) {
        let Self {
            mesh,
            start,
            end_polygon,
            root_g_values,
            root_search_ids,
            search_id,
            successors,
            nodes_to_push,
            ..
        } = self;
        let mesh: &Mesh = mesh;
        let polygon = &mesh.polygons()[parent.next_polygon];
        let parent_root = parent.root.map_or(*start, |r| mesh.vertices()[r].p);

        let mut right_g = None;
        let mut left_g = None;
        nodes_to_push.clear();
        for succ in successors.iter() {
            let Some(next_polygon) = polygon.polygons[succ.poly_left_ind] else {
                continue;
            };
            if mesh.polygons()[next_polygon].is_one_way && Some(next_polygon) != *end_polygon {
                continue;
            }
            let left_vertex = polygon.vertices[succ.poly_left_ind];
            let right_vertex = polygon.prev_vertex(succ.poly_left_ind);

            let (root, g) = match succ.kind {
                SuccessorType::RightNonObservable => (
                    parent.right_vertex,
                    *right_g.get_or_insert_with(|| parent.g + distance(&parent_root, &parent.right)),
                ),
                SuccessorType::Observable => (parent.root, parent.g),
                SuccessorType::LeftNonObservable => (
                    parent.left_vertex,
                    *left_g.get_or_insert_with(|| parent.g + distance(&parent_root, &parent.left)),
                ),
            };

            if let Some(root) = root {
                if root_search_ids[root] != *search_id {
                    root_search_ids[root] = *search_id;
                    root_g_values[root] = g;
                } else if root_g_values[root] + EPSILON < g {
                    continue;
                } else {
                    root_g_values[root] = g;
                }
            }

            nodes_to_push.push(SearchNode {
                parent: None,
                root,
                left: succ.left,
                right: succ.right,
                left_vertex: Some(left_vertex),
                right_vertex: Some(right_vertex),
                next_polygon,
                f: g,
                g,
            });
        }
    }

    /// Adds the heuristic to every node in `self.nodes_to_push` and pushes it.
    ///
    /// A node that already carries a parent was allocated by the corridor walk
    /// and is `parent` itself; the rest are allocated here under `parent`.
    fn push_nodes(&mut self, parent: NodeId) {
        let mut reused = 0;
        for node in &self.nodes_to_push {
            let id = if node.parent.is_some() {
                reused += 1;
                parent
            } else {
                self.arena.alloc(SearchNode {
                    parent: Some(parent),
                    ..*node
                })
            };
            let n = &mut self.arena[id];
            let root = n.root.map_or(self.start, |r| self.mesh.vertices()[r].p);
            n.f += get_h_value(&root, &self.goal, &n.left, &n.right);
            tracing::trace!(node = %n, "pushing");
            self.open.push(OpenEntry::new(id, n));
        }
        let count = self.nodes_to_push.len();
        self.stats.nodes_generated += count - reused;
        self.stats.nodes_pushed += count;
    }

    fn run(&mut self) -> bool {
        self.init_search();
        let Some(end_polygon) = self.end_polygon else {
            tracing::debug!(goal = %Coords(self.goal), "goal is not on the mesh");
            return false;
        };
        if self.final_node.is_some() {
            return true;
        }

        while let Some(entry) = self.open.pop() {
            let node_id = entry.id;
            let node = self.arena[node_id];
            tracing::trace!(%node, "popped");
            self.stats.nodes_popped += 1;

            if node.next_polygon == end_polygon {
                self.finish(node_id, &node);
                return true;
            }

            if let Some(root) = node.root {
                if self.root_search_ids[root] == self.search_id
                    && self.root_g_values[root] + EPSILON < node.g
                {
                    tracing::trace!("node is dominated");
                    self.stats.nodes_pruned_post_pop += 1;
                    continue;
                }
            }

            self.expand(node_id, node, end_polygon);
        }

        tracing::debug!("open list exhausted");
        false
    }

    /// Expands `node`, then keeps expanding while there is exactly one
    /// successor ("pulling the string" along a corridor). Only nodes where
    /// the path turns are stored along the way.
    fn expand(&mut self, mut node_id: NodeId, node: SearchNode, end_polygon: PolygonId) {
        let mut cur = node;
        loop {
            // Never true on the first pass: the caller stops at the goal polygon.
            if cur.next_polygon == end_polygon {
                break;
            }
            get_successors(&cur, &self.start, self.mesh, &mut self.successors);
            self.stats.successor_calls += 1;
            self.succ_to_node(&cur);
            if self.nodes_to_push.len() != 1 {
                break;
            }
            let next = &mut self.nodes_to_push[0];
            if next.g != cur.g {
                // Turned: keep the corner in the arena so the path can be
                // reconstructed.
                next.parent = Some(node_id);
                node_id = self.arena.alloc(*next);
                self.stats.nodes_generated += 1;
            }
            cur = *next;
            tracing::trace!(node = %cur, "intermediate");
        }
        self.push_nodes(node_id);
    }

    /// Stores the terminal node after `node` reached the goal's polygon.
    ///
    /// Its root is whichever end of the interval the path bends around to
    /// reach the goal, or the parent's root when the goal is in plain view.
    fn finish(&mut self, node_id: NodeId, node: &SearchNode) {
        let root = self.root_point(node.root);
        let root_goal = self.goal - root;
        let final_root = if cross(&root_goal, &(node.left - root)) < -EPSILON {
            node.left_vertex
        } else if cross(&(node.right - root), &root_goal) < -EPSILON {
            node.right_vertex
        } else {
            node.root
        };
        let id = self.arena.alloc(SearchNode {
            parent: Some(node_id),
            root: final_root,
            left: self.goal,
            right: self.goal,
            left_vertex: None,
            right_vertex: None,
            next_polygon: node.next_polygon,
            f: node.f,
            g: node.g,
        });
        self.stats.nodes_generated += 1;
        self.final_node = Some(id);
        tracing::debug!(cost = node.f, "found end");
    }
}
