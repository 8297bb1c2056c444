//! Navigation mesh: convex polygons with adjacency, plus a slab index for
//! point location.
//!
//! Purpose
//! - Hold the immutable polygon/vertex graph that the search walks.
//! - Answer "where is this point" queries (`location`).
//!
//! Why this design
//! - A `Mesh` is built once (`Mesh::read`) and then only borrowed, so any
//!   number of searches can share it across threads.
//! - Missing neighbours are `None` instead of a sentinel index.
//!
//! References
//! - Code cross-refs: `search::expansion::get_successors`,
//!   `search::SearchInstance`, `PointLocation`

mod error;
mod location;
mod parse;

use std::fmt;

use crate::geometry::{Coords, Point, EPSILON};

pub use error::{MeshError, MeshResult};
pub use location::{PointLocation, PolyContainment};

/// Index into [`Mesh::vertices`].
pub type VertexId = usize;
/// Index into [`Mesh::polygons`].
pub type PolygonId = usize;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Aabb {
    pub fn from_point(p: &Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    pub fn grow(&mut self, p: &Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&mut self, other: &Aabb) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Containment in the box expanded by [`EPSILON`] on every side.
    #[inline]
    pub fn contains_eps(&self, p: &Point) -> bool {
        p.x >= self.min_x - EPSILON
            && p.x <= self.max_x + EPSILON
            && p.y >= self.min_y - EPSILON
            && p.y <= self.max_y + EPSILON
    }

    /// Twice the mid-y; the slab sort key.
    #[inline]
    fn y_sum(&self) -> f64 {
        self.min_y + self.max_y
    }

    #[inline]
    fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Mesh vertex.
#[derive(Clone, Debug)]
pub struct Vertex {
    pub p: Point,
    /// Incident polygons in circular order; `None` marks an obstacle wedge.
    pub polygons: Vec<Option<PolygonId>>,
    /// At least one incident wedge is an obstacle.
    pub is_corner: bool,
    /// Obstacle wedges form two or more separate runs (a pinch point).
    pub is_ambig: bool,
}

impl Vertex {
    pub(crate) fn new(p: Point, polygons: Vec<Option<PolygonId>>) -> Self {
        let is_corner = polygons.iter().any(Option::is_none);
        let is_ambig = obstacle_runs(&polygons) >= 2;
        Self {
            p,
            polygons,
            is_corner,
            is_ambig,
        }
    }
}

/// Number of maximal circular runs of `None` in the incidence list.
fn obstacle_runs(polygons: &[Option<PolygonId>]) -> usize {
    let n = polygons.len();
    (0..n)
        .filter(|&i| polygons[i].is_none() && polygons[(i + n - 1) % n].is_some())
        .count()
        .max(usize::from(n > 0 && polygons.iter().all(Option::is_none)))
}

/// Convex polygon with counterclockwise vertices.
#[derive(Clone, Debug)]
pub struct Polygon {
    pub vertices: Vec<VertexId>,
    /// `polygons[j]` lies across the edge `vertices[j-1] → vertices[j]`
    /// (the edge into `vertices[0]` comes from the last vertex).
    pub polygons: Vec<Option<PolygonId>>,
    pub bounds: Aabb,
    /// At most one traversable edge: a dead end that is only worth
    /// entering when it holds the goal.
    pub is_one_way: bool,
}

impl Polygon {
    pub(crate) fn new(
        vertices: Vec<VertexId>,
        polygons: Vec<Option<PolygonId>>,
        mesh_vertices: &[Vertex],
    ) -> Self {
        debug_assert_eq!(vertices.len(), polygons.len());
        let mut bounds = Aabb::from_point(&mesh_vertices[vertices[0]].p);
        for &v in &vertices[1..] {
            bounds.grow(&mesh_vertices[v].p);
        }
        let is_one_way = polygons.iter().filter(|p| p.is_some()).count() <= 1;
        Self {
            vertices,
            polygons,
            bounds,
            is_one_way,
        }
    }

    /// Vertex id at the end of the edge that precedes `ind`.
    #[inline]
    pub(crate) fn prev_vertex(&self, ind: usize) -> VertexId {
        if ind == 0 {
            self.vertices[self.vertices.len() - 1]
        } else {
            self.vertices[ind - 1]
        }
    }
}

/// One vertical slab of the point-location index.
#[derive(Clone, Debug)]
pub(crate) struct Slab {
    pub(crate) x: f64,
    /// Polygons overlapping the slab, by mid-y ascending, wider first on ties.
    pub(crate) polygons: Vec<PolygonId>,
}

/// Immutable navigation mesh.
#[derive(Clone, Debug)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    polygons: Vec<Polygon>,
    max_poly_sides: usize,
    bounds: Aabb,
    slabs: Vec<Slab>,
}

impl Mesh {
    /// Assembles a mesh from already validated parts and builds the slab index.
    pub(crate) fn from_parts(vertices: Vec<Vertex>, polygons: Vec<Polygon>) -> Self {
        let max_poly_sides = polygons.iter().map(|p| p.vertices.len()).max().unwrap_or(0);
        let mut bounds = polygons
            .first()
            .map(|p| p.bounds)
            .unwrap_or_else(|| Aabb::from_point(&Point::zeros()));
        for p in &polygons {
            bounds.union(&p.bounds);
        }
        let mut mesh = Self {
            vertices,
            polygons,
            max_poly_sides,
            bounds,
            slabs: Vec::new(),
        };
        mesh.precalc_point_location();
        mesh
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Largest vertex count of any polygon.
    #[inline]
    pub fn max_poly_sides(&self) -> usize {
        self.max_poly_sides
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// (Re)builds the slab index used by `get_point_location`.
    ///
    /// One breakpoint per distinct vertex x; a polygon joins every slab whose
    /// x lies in `[min_x, max_x]`.
    pub fn precalc_point_location(&mut self) {
        let mut xs: Vec<f64> = self.vertices.iter().map(|v| v.p.x).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        let mut slabs: Vec<Slab> = xs
            .into_iter()
            .map(|x| Slab {
                x,
                polygons: Vec::new(),
            })
            .collect();

        for (i, poly) in self.polygons.iter().enumerate() {
            let lo = slabs.partition_point(|s| s.x < poly.bounds.min_x);
            let hi = slabs.partition_point(|s| s.x <= poly.bounds.max_x);
            for slab in &mut slabs[lo..hi] {
                slab.polygons.push(i);
            }
        }

        let polygons = &self.polygons;
        for slab in &mut slabs {
            slab.polygons.sort_by(|&a, &b| {
                let (ab, bb) = (&polygons[a].bounds, &polygons[b].bounds);
                ab.y_sum()
                    .total_cmp(&bb.y_sum())
                    .then_with(|| bb.height().total_cmp(&ab.height()))
            });
        }
        self.slabs = slabs;
    }

    /// `P<i> [V<a> (x, y), ...]`, for debug output.
    pub fn describe_polygon(&self, index: PolygonId) -> String {
        let verts: Vec<String> = self.polygons[index]
            .vertices
            .iter()
            .map(|&v| format!("V{} {}", v, Coords(self.vertices[v].p)))
            .collect();
        format!("P{} [{}]", index, verts.join(", "))
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "mesh with {} vertices, {} polygons",
            self.vertices.len(),
            self.polygons.len()
        )?;
        writeln!(f, "vertices:")?;
        for v in &self.vertices {
            writeln!(f, "{} {}", Coords(v.p), v.is_corner)?;
        }
        writeln!(f)?;
        writeln!(f, "polygons:")?;
        for poly in &self.polygons {
            let pts: Vec<String> = poly
                .vertices
                .iter()
                .map(|&v| Coords(self.vertices[v].p).to_string())
                .collect();
            writeln!(f, "{}", pts.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
