//! Interval expansion: the heuristic and successor generation.
//!
//! Purpose
//! - `get_h_value`: admissible estimate from a root through an interval to
//!   the goal.
//! - `get_successors`: split the far side of the polygon behind an interval
//!   into observable and non-observable successor intervals.
//!
//! Why this design
//! - Successors are written into a caller-owned buffer so the search loop can
//!   reuse one allocation for every expansion.
//! - Triangles get a closed case table; general polygons binary search for
//!   the two visibility transitions over a doubled index range.

use crate::geometry::{
    approx_eq, cross, distance, distance_sq, is_collinear, line_intersect,
    line_intersect_bound_check, orientation, reflect_point, Orientation, Point, ZeroOnePos,
    EPSILON,
};
use crate::mesh::{Mesh, Vertex, VertexId};

use super::types::{SearchNode, Successor, SuccessorType};

/// Lower bound on the length of a path from `root` through the segment
/// `l..r` to `goal`.
///
/// If `goal` is on the same side of the segment as `root` it is mirrored
/// first; then the straight line either crosses the segment or the bound
/// bends around the nearer endpoint.
pub fn get_h_value(root: &Point, goal: &Point, l: &Point, r: &Point) -> f64 {
    if approx_eq(root, l) || approx_eq(root, r) {
        return distance(root, goal);
    }
    let lr = r - l;
    let lroot = root - l;
    let mut goal = *goal;
    let mut lgoal = goal - l;
    if (cross(&lroot, &lr) > 0.0) == (cross(&lgoal, &lr) > 0.0) {
        goal = reflect_point(&goal, l, r);
        lgoal = goal - l;
    }

    let denom = cross(&(goal - root), &lr);
    if denom.abs() < EPSILON {
        // Root, goal and the segment are collinear.
        let root_l = distance_sq(root, l);
        let root_r = distance_sq(root, r);
        return if root_l < root_r {
            root_l.sqrt() + distance(l, &goal)
        } else {
            root_r.sqrt() + distance(r, &goal)
        };
    }

    let lr_num = cross(&lgoal, &lroot);
    match line_intersect_bound_check(lr_num, denom) {
        ZeroOnePos::LtZero => distance(root, l) + distance(l, &goal),
        ZeroOnePos::EqZero | ZeroOnePos::InRange | ZeroOnePos::EqOne => distance(root, &goal),
        ZeroOnePos::GtOne => distance(root, r) + distance(r, &goal),
    }
}

/// Maps an index of the doubled range `[0, 2n)` back into `[0, n)`.
#[inline]
fn normalise(index: usize, n: usize) -> usize {
    if index >= n {
        index - n
    } else {
        index
    }
}

/// Binary search over polygon positions `lower..=upper` (un-normalised).
///
/// With `is_upper_bound` it returns the last position matching `pred`,
/// otherwise the first. The predicate is assumed monotone on the range and
/// to hold somewhere in it. A one-element range is returned as is.
fn binary_search(
    poly_vertices: &[VertexId],
    mesh_vertices: &[Vertex],
    lower: usize,
    upper: usize,
    pred: impl Fn(&Vertex) -> bool,
    is_upper_bound: bool,
) -> Option<usize> {
    if lower == upper {
        return Some(lower);
    }
    let n = poly_vertices.len();
    let (mut lower, mut upper) = (lower as isize, upper as isize);
    let mut best_so_far = None;
    while lower <= upper {
        let mid = lower + (upper - lower) / 2;
        let matches = pred(&mesh_vertices[poly_vertices[normalise(mid as usize, n)]]);
        if matches {
            best_so_far = Some(mid as usize);
        }
        if matches == is_upper_bound {
            lower = mid + 1;
        } else {
            upper = mid - 1;
        }
    }
    best_so_far
}

/// Decides which end of a degenerate (collinear) interval the root is
/// closer to, comparing coordinate magnitudes instead of distances.
#[inline]
fn collinear_turns_left(root_l: &Point, root_r: &Point, root_eq_l: bool, root_eq_r: bool) -> bool {
    root_eq_l
        || (!root_eq_r
            && if (root_l.x - root_r.x).abs() < EPSILON {
                root_l.y.abs() < root_r.y.abs()
            } else {
                root_l.x.abs() < root_r.x.abs()
            })
}

/// Third vertex of a triangle entered through `right_vertex..left_vertex`,
/// plus the edge indices `(p1, p2)` of the edges `t1→t2` and `t2→t3`.
#[inline]
fn triangle_apex(
    vertices: &[VertexId],
    left_vertex: VertexId,
    right_vertex: VertexId,
) -> (VertexId, usize, usize) {
    if vertices[0] == right_vertex {
        (vertices[1], 1, 2)
    } else if vertices[0] == left_vertex {
        (vertices[2], 2, 0)
    } else {
        (vertices[0], 0, 1)
    }
}

#[inline]
fn succ(kind: SuccessorType, left: Point, right: Point, poly_left_ind: usize) -> Successor {
    Successor {
        kind,
        left,
        right,
        poly_left_ind,
    }
}

/// Generates the successors of `node` into `out` (cleared first) and returns
/// how many were written.
///
/// Successors come out ordered right to left: right non-observable,
/// observable, then left non-observable. `start` stands in for the root when
/// `node.root` is `None`. At most `max_poly_sides + 2` successors are
/// produced.
pub fn get_successors(
    node: &SearchNode,
    start: &Point,
    mesh: &Mesh,
    out: &mut Vec<Successor>,
) -> usize {
    use SuccessorType::{LeftNonObservable, Observable, RightNonObservable};

    out.clear();
    let (Some(left_vertex), Some(right_vertex)) = (node.left_vertex, node.right_vertex) else {
        debug_assert!(false, "expanding a node without interval vertices: {node}");
        return 0;
    };
    let polygon = &mesh.polygons()[node.next_polygon];
    let mesh_vertices = mesh.vertices();
    let v = &polygon.vertices;
    let n = v.len();
    let point = |i: usize| mesh_vertices[v[i]].p;

    let root = node.root.map_or(*start, |r| mesh_vertices[r].p);
    debug_assert_ne!(
        orientation(&root, &node.left, &node.right),
        Orientation::Ccw,
        "interval sweeps the wrong way: {node}"
    );

    // Degenerate interval: the root is on the interval's line, so the only
    // way forward is turning at whichever end is closer.
    let root_l = node.left - root;
    let root_r = node.right - root;
    let root_eq_l = root_l.x.abs() < EPSILON && root_l.y.abs() < EPSILON;
    let root_eq_r = root_r.x.abs() < EPSILON && root_r.y.abs() < EPSILON;
    if root_eq_l || root_eq_r || is_collinear(&root, &node.right, &node.left) {
        let kind = if collinear_turns_left(&root_l, &root_r, root_eq_l, root_eq_r) {
            if !mesh_vertices[left_vertex].is_corner {
                return 0;
            }
            LeftNonObservable
        } else {
            if !mesh_vertices[right_vertex].is_corner {
                return 0;
            }
            RightNonObservable
        };

        // Every edge except the one we came through.
        let mut last_vertex = v[n - 1];
        for (i, &this_vertex) in v.iter().enumerate() {
            if this_vertex != right_vertex {
                out.push(succ(
                    kind,
                    mesh_vertices[this_vertex].p,
                    mesh_vertices[last_vertex].p,
                    i,
                ));
            }
            last_vertex = this_vertex;
        }
        return out.len();
    }

    if n == 3 {
        triangle_successors(node, &root, mesh_vertices, v, left_vertex, right_vertex, out);
        debug_assert!(out.len() <= 3);
        return out.len();
    }

    // General polygon. Positions run over the doubled range so that
    // right_ind < A <= B < left_ind without wrapping.
    let Some(right_ind) = v.iter().position(|&x| x == right_vertex) else {
        debug_assert!(false, "right vertex not on polygon: {node}");
        return 0;
    };
    let left_ind = n + right_ind - 1;
    debug_assert_eq!(v[normalise(left_ind, n)], left_vertex);

    let right_vertex_obj = &mesh_vertices[right_vertex];
    let left_vertex_obj = &mesh_vertices[left_vertex];
    let right_lies_vertex = approx_eq(&right_vertex_obj.p, &node.right);
    let left_lies_vertex = approx_eq(&left_vertex_obj.p, &node.left);

    // A: first position p with root-right-p strictly counterclockwise. The
    // right transition lies on the edge (A-1, A).
    let root_right = node.right - root;
    let a = if right_lies_vertex
        && cross(&root_right, &(point(normalise(right_ind + 1, n)) - node.right)) > -EPSILON
    {
        Some(right_ind + 1)
    } else {
        binary_search(
            v,
            mesh_vertices,
            right_ind + 1,
            left_ind,
            |vx| cross(&root_right, &(vx.p - node.right)) > EPSILON,
            false,
        )
    };
    let Some(a) = a else {
        debug_assert!(false, "no right transition: {node}");
        return 0;
    };
    let norm_a = normalise(a, n);
    let norm_am1 = normalise(a - 1, n);
    let a_p = point(norm_a);
    let am1_p = point(norm_am1);
    let right_intersect = if right_lies_vertex && a == right_ind + 1 {
        node.right
    } else {
        line_intersect(&a_p, &am1_p, &root, &node.right)
    };

    // B: last position p with root-left-p strictly clockwise. The left
    // transition lies on the edge (B, B+1).
    let root_left = node.left - root;
    let b = if left_lies_vertex
        && cross(&root_left, &(point(normalise(left_ind - 1, n)) - node.left)) < EPSILON
    {
        Some(left_ind - 1)
    } else {
        binary_search(
            v,
            mesh_vertices,
            a - 1,
            left_ind - 1,
            |vx| cross(&root_left, &(vx.p - node.left)) < -EPSILON,
            true,
        )
    };
    let Some(b) = b else {
        debug_assert!(false, "no left transition: {node}");
        return 0;
    };
    let norm_b = normalise(b, n);
    let norm_bp1 = normalise(b + 1, n);
    let b_p = point(norm_b);
    let bp1_p = point(norm_bp1);
    let left_intersect = if left_lies_vertex && b == left_ind - 1 {
        node.left
    } else {
        line_intersect(&b_p, &bp1_p, &root, &node.left)
    };

    let advance = |i: usize| if i + 1 == n { 0 } else { i + 1 };

    if right_lies_vertex && right_vertex_obj.is_corner {
        let mut last_ind = right_ind;
        let mut cur_ind = normalise(right_ind + 1, n);
        while last_ind != norm_am1 {
            out.push(succ(RightNonObservable, point(cur_ind), point(last_ind), cur_ind));
            last_ind = cur_ind;
            cur_ind = advance(cur_ind);
        }
        debug_assert_eq!(cur_ind, norm_a);
        if !approx_eq(&right_intersect, &am1_p) {
            out.push(succ(RightNonObservable, right_intersect, am1_p, norm_a));
        }
    }

    if a == b + 2 {
        // Nothing is observable.
    } else if a == b + 1 {
        out.push(succ(Observable, left_intersect, right_intersect, norm_a));
    } else {
        out.push(succ(Observable, a_p, right_intersect, norm_a));
        let mut last_ind = norm_a;
        let mut cur_ind = normalise(a + 1, n);
        while last_ind != norm_b {
            out.push(succ(Observable, point(cur_ind), point(last_ind), cur_ind));
            last_ind = cur_ind;
            cur_ind = advance(cur_ind);
        }
        out.push(succ(Observable, left_intersect, b_p, norm_bp1));
    }

    if left_lies_vertex && left_vertex_obj.is_corner {
        if !approx_eq(&left_intersect, &bp1_p) {
            out.push(succ(LeftNonObservable, bp1_p, left_intersect, norm_bp1));
        }
        let mut last_ind = norm_bp1;
        let mut cur_ind = normalise(b + 2, n);
        let norm_left = normalise(left_ind, n);
        while last_ind != norm_left {
            out.push(succ(LeftNonObservable, point(cur_ind), point(last_ind), cur_ind));
            last_ind = cur_ind;
            cur_ind = advance(cur_ind);
        }
    }

    debug_assert!(out.len() <= mesh.max_poly_sides() + 2);
    out.len()
}

/// Closed-form successors for a triangle `t1 t2 t3` entered through the edge
/// `t1 → t3` (`t1` = right vertex, `t3` = left vertex).
fn triangle_successors(
    node: &SearchNode,
    root: &Point,
    mesh_vertices: &[Vertex],
    v: &[VertexId],
    left_vertex: VertexId,
    right_vertex: VertexId,
    out: &mut Vec<Successor>,
) {
    use SuccessorType::{LeftNonObservable, Observable, RightNonObservable};

    let (t2_vertex, p1, p2) = triangle_apex(v, left_vertex, right_vertex);
    let t1 = mesh_vertices[right_vertex].p;
    let t2 = mesh_vertices[t2_vertex].p;
    let t3 = mesh_vertices[left_vertex].p;
    let (l, r) = (node.left, node.right);

    let can_turn_left = mesh_vertices[left_vertex].is_corner && approx_eq(&l, &t3);
    let can_turn_right = mesh_vertices[right_vertex].is_corner && approx_eq(&r, &t1);
    // Where root-R meets t1-t2, with R itself when it is t1.
    let right_on_12 = || {
        if approx_eq(&r, &t1) {
            t1
        } else {
            line_intersect(&t1, &t2, root, &r)
        }
    };

    match orientation(root, &l, &t2) {
        Orientation::Ccw => {
            // Both transitions are on t1-t2.
            let li = line_intersect(&t1, &t2, root, &l);
            let ri = right_on_12();
            out.push(succ(Observable, li, ri, p1));
            if can_turn_left {
                out.push(succ(LeftNonObservable, t2, li, p1));
                out.push(succ(LeftNonObservable, t3, t2, p2));
            }
        }
        Orientation::Collinear => {
            let ri = right_on_12();
            out.push(succ(Observable, t2, ri, p1));
            if can_turn_left {
                out.push(succ(LeftNonObservable, t3, t2, p2));
            }
        }
        Orientation::Cw => {
            let li = if approx_eq(&l, &t3) {
                t3
            } else {
                line_intersect(&t2, &t3, root, &l)
            };
            match orientation(root, &r, &t2) {
                Orientation::Cw => {
                    // Both transitions are on t2-t3.
                    let ri = line_intersect(&t2, &t3, root, &r);
                    if can_turn_right {
                        out.push(succ(RightNonObservable, t2, t1, p1));
                        out.push(succ(RightNonObservable, ri, t2, p2));
                    }
                    out.push(succ(Observable, li, ri, p2));
                }
                Orientation::Collinear => {
                    if can_turn_right {
                        out.push(succ(RightNonObservable, t2, t1, p1));
                    }
                    out.push(succ(Observable, li, t2, p2));
                }
                Orientation::Ccw => {
                    let ri = right_on_12();
                    out.push(succ(Observable, t2, ri, p1));
                    out.push(succ(Observable, li, t2, p2));
                }
            }
        }
    }
}
