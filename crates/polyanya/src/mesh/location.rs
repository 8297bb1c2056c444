//! Point-in-polygon and point-location queries.

use std::fmt;

use super::{Mesh, PolygonId, VertexId};
use crate::geometry::{approx_eq, cross, Point, EPSILON};

/// Where a point lies relative to one convex polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolyContainment {
    Outside,
    Inside,
    /// On the edge `right → left` (CCW order); `adjacent` is the polygon on
    /// the other side.
    OnEdge {
        adjacent: Option<PolygonId>,
        left: VertexId,
        right: VertexId,
    },
    OnVertex(VertexId),
}

impl fmt::Display for PolyContainment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outside => write!(f, "OUTSIDE"),
            Self::Inside => write!(f, "INSIDE"),
            Self::OnEdge {
                adjacent,
                left,
                right,
            } => write!(
                f,
                "ON_EDGE (poly {}, vertices {left}, {right})",
                fmt_opt(adjacent)
            ),
            Self::OnVertex(v) => write!(f, "ON_VERTEX ({v})"),
        }
    }
}

/// Where a point lies in the whole mesh.
///
/// For the edge variants `left`/`right` are the edge endpoints as seen from
/// inside `poly`/`poly1`.
#[derive(Clone, Copy, Debug)]
pub enum PointLocation {
    NotOnMesh,
    InPolygon(PolygonId),
    /// On an edge whose other side is an obstacle.
    OnMeshBorder {
        poly: PolygonId,
        left: VertexId,
        right: VertexId,
    },
    /// On an edge shared by two traversable polygons.
    OnEdge {
        poly1: PolygonId,
        poly2: PolygonId,
        left: VertexId,
        right: VertexId,
    },
    /// On a pinch vertex. `poly` starts as `None`; the search may resolve it.
    OnCornerVertexAmbig {
        vertex: VertexId,
        poly: Option<PolygonId>,
    },
    OnCornerVertexUnambig {
        vertex: VertexId,
        poly: PolygonId,
    },
    OnNonCornerVertex {
        vertex: VertexId,
        poly: PolygonId,
    },
}

impl PointLocation {
    /// The polygon the point is considered to be in, if any.
    pub fn poly1(&self) -> Option<PolygonId> {
        match *self {
            Self::NotOnMesh => None,
            Self::InPolygon(p) => Some(p),
            Self::OnMeshBorder { poly, .. } => Some(poly),
            Self::OnEdge { poly1, .. } => Some(poly1),
            Self::OnCornerVertexAmbig { poly, .. } => poly,
            Self::OnCornerVertexUnambig { poly, .. } | Self::OnNonCornerVertex { poly, .. } => {
                Some(poly)
            }
        }
    }
}

/// Equality up to the viewing side: an edge seen from either polygon is the
/// same location, and vertex locations compare the vertex only.
impl PartialEq for PointLocation {
    fn eq(&self, other: &Self) -> bool {
        use PointLocation::*;
        match (*self, *other) {
            (NotOnMesh, NotOnMesh) => true,
            (InPolygon(a), InPolygon(b)) => a == b,
            (
                OnMeshBorder { poly, left, right },
                OnMeshBorder {
                    poly: o_poly,
                    left: o_left,
                    right: o_right,
                },
            ) => {
                poly == o_poly
                    && ((left == o_left && right == o_right)
                        || (left == o_right && right == o_left))
            }
            (
                OnEdge {
                    poly1,
                    poly2,
                    left,
                    right,
                },
                OnEdge {
                    poly1: o1,
                    poly2: o2,
                    left: ol,
                    right: or,
                },
            ) => {
                (poly1 == o1 && poly2 == o2 && left == ol && right == or)
                    || (poly1 == o2 && poly2 == o1 && left == or && right == ol)
            }
            (OnCornerVertexAmbig { vertex: a, .. }, OnCornerVertexAmbig { vertex: b, .. })
            | (OnCornerVertexUnambig { vertex: a, .. }, OnCornerVertexUnambig { vertex: b, .. })
            | (OnNonCornerVertex { vertex: a, .. }, OnNonCornerVertex { vertex: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for PointLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOnMesh => write!(f, "NOT_ON_MESH"),
            Self::InPolygon(p) => write!(f, "IN_POLYGON ({p})"),
            Self::OnMeshBorder { poly, left, right } => {
                write!(f, "ON_MESH_BORDER (poly {poly}, vertices {left}, {right})")
            }
            Self::OnEdge {
                poly1,
                poly2,
                left,
                right,
            } => write!(
                f,
                "ON_EDGE (polys {poly1}, {poly2}, vertices {left}, {right})"
            ),
            Self::OnCornerVertexAmbig { vertex, poly } => {
                write!(f, "ON_CORNER_VERTEX_AMBIG ({vertex}, poly? {})", fmt_opt(poly))
            }
            Self::OnCornerVertexUnambig { vertex, poly } => {
                write!(f, "ON_CORNER_VERTEX_UNAMBIG ({vertex}, poly {poly})")
            }
            Self::OnNonCornerVertex { vertex, poly } => {
                write!(f, "ON_NON_CORNER_VERTEX ({vertex}, poly {poly})")
            }
        }
    }
}

fn fmt_opt(p: &Option<usize>) -> String {
    p.map_or_else(|| "-1".to_string(), |p| p.to_string())
}

impl Mesh {
    /// Classifies `p` against the convex polygon `poly`.
    ///
    /// Walks the CCW edges; a negative cross product means outside, a zero
    /// one means `p` is on the edge line and a direction check decides
    /// between "on the edge" and "beyond an endpoint".
    pub fn poly_contains_point(&self, poly: PolygonId, p: &Point) -> PolyContainment {
        let polygon = &self.polygons[poly];
        if !polygon.bounds.contains_eps(p) {
            return PolyContainment::Outside;
        }
        let zero = Point::zeros();
        let mut last_index = polygon.vertices[polygon.vertices.len() - 1];
        let mut last = self.vertices[last_index].p - p;
        if approx_eq(&last, &zero) {
            return PolyContainment::OnVertex(last_index);
        }

        for (i, &point_index) in polygon.vertices.iter().enumerate() {
            let cur = self.vertices[point_index].p - p;
            if approx_eq(&cur, &zero) {
                return PolyContainment::OnVertex(point_index);
            }
            let cur_a = cross(&last, &cur);
            if cur_a.abs() < EPSILON {
                // p is on the line through this edge. It is on the edge itself
                // only when cur and last point in opposite directions.
                let same_side = if cur.x != 0.0 {
                    (cur.x > 0.0) == (last.x > 0.0)
                } else {
                    (cur.y > 0.0) == (last.y > 0.0)
                };
                if same_side {
                    last = cur;
                    last_index = point_index;
                    continue;
                }
                return PolyContainment::OnEdge {
                    adjacent: polygon.polygons[i],
                    left: point_index,
                    right: last_index,
                };
            }
            if cur_a < 0.0 {
                return PolyContainment::Outside;
            }
            last = cur;
            last_index = point_index;
        }
        PolyContainment::Inside
    }

    /// Locates `p` using the slab index.
    pub fn get_point_location(&self, p: &Point) -> PointLocation {
        if !self.bounds.contains_eps(p) {
            return PointLocation::NotOnMesh;
        }
        // A point within EPSILON left of a breakpoint belongs to its slab.
        let slab_idx = self.slabs.partition_point(|s| s.x <= p.x + EPSILON);
        if slab_idx == 0 {
            return PointLocation::NotOnMesh;
        }
        let polys = &self.slabs[slab_idx - 1].polygons;
        let ps = polys.len() as isize;
        let close = polys.partition_point(|&i| self.polygons[i].bounds.y_sum() < p.y * 2.0);
        let close = close as isize;
        let close = close - isize::from(close == ps);

        // Probe close, close+1, close-1, close+2, ... and once one side runs
        // out keep walking in the other direction.
        let mut i = close;
        let mut next_delta: isize = 1;
        let mut walk_delta: isize = 0;
        while i >= 0 && i < ps {
            let polygon = polys[i as usize];
            if let Some(loc) = self.classify(polygon, p) {
                return loc;
            }
            if walk_delta == 0 {
                let next_i = if next_delta & 1 == 1 {
                    i + next_delta
                } else {
                    i - next_delta
                };
                if next_i < 0 {
                    walk_delta = 1;
                } else if next_i >= ps {
                    walk_delta = -1;
                } else {
                    i = next_i;
                    next_delta += 1;
                }
            }
            if walk_delta != 0 {
                i += walk_delta;
            }
        }
        PointLocation::NotOnMesh
    }

    /// O(P) scan over every polygon. Reference answer for `get_point_location`.
    pub fn get_point_location_naive(&self, p: &Point) -> PointLocation {
        (0..self.polygons.len())
            .find_map(|poly| self.classify(poly, p))
            .unwrap_or(PointLocation::NotOnMesh)
    }

    /// Mesh-level location of `p` if `polygon` contains it.
    fn classify(&self, polygon: PolygonId, p: &Point) -> Option<PointLocation> {
        match self.poly_contains_point(polygon, p) {
            PolyContainment::Outside => None,
            PolyContainment::Inside => Some(PointLocation::InPolygon(polygon)),
            PolyContainment::OnEdge {
                adjacent,
                left,
                right,
            } => Some(match adjacent {
                None => PointLocation::OnMeshBorder {
                    poly: polygon,
                    left,
                    right,
                },
                Some(other) => PointLocation::OnEdge {
                    poly1: polygon,
                    poly2: other,
                    left,
                    right,
                },
            }),
            PolyContainment::OnVertex(vertex) => {
                let v = &self.vertices[vertex];
                Some(if !v.is_corner {
                    PointLocation::OnNonCornerVertex {
                        vertex,
                        poly: polygon,
                    }
                } else if v.is_ambig {
                    PointLocation::OnCornerVertexAmbig { vertex, poly: None }
                } else {
                    PointLocation::OnCornerVertexUnambig {
                        vertex,
                        poly: polygon,
                    }
                })
            }
        }
    }
}
