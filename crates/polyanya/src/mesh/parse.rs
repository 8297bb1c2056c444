//! Reader for the whitespace-separated `mesh 2` text format.
//!
//! ```text
//! mesh
//! 2
//! V P
//! x y n  p_1 .. p_n          (V vertex lines, n >= 2, p = -1 or polygon)
//! n  v_1 .. v_n  q_1 .. q_n  (P polygon lines, n >= 3, CCW vertices)
//! ```

use std::io::Read;
use std::str::{FromStr, SplitWhitespace};

use super::{Mesh, MeshError, MeshResult, Polygon, PolygonId, Vertex, VertexId};
use crate::geometry::Point;

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn next_str(&mut self, what: &'static str) -> MeshResult<&'a str> {
        self.inner.next().ok_or(MeshError::UnexpectedEof(what))
    }

    fn next<T: FromStr>(&mut self, what: &'static str) -> MeshResult<T> {
        let token = self.next_str(what)?;
        token.parse().map_err(|_| MeshError::Parse {
            what,
            token: token.to_string(),
        })
    }
}

/// `-1` maps to `None`; anything else must index a polygon.
fn polygon_ref(
    index: i64,
    count: usize,
    owner: impl FnOnce() -> String,
) -> MeshResult<Option<PolygonId>> {
    match index {
        -1 => Ok(None),
        i if i >= 0 && (i as usize) < count => Ok(Some(i as usize)),
        _ => Err(MeshError::PolygonIndex {
            owner: owner(),
            index,
            count,
        }),
    }
}

impl Mesh {
    /// Parses a mesh and builds its point-location index.
    pub fn read<R: Read>(mut reader: R) -> MeshResult<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        text.parse()
    }
}

impl FromStr for Mesh {
    type Err = MeshError;

    fn from_str(text: &str) -> MeshResult<Self> {
        let mut tok = Tokens::new(text);

        let header = tok.next_str("header")?;
        if header != "mesh" {
            return Err(MeshError::Header(header.to_string()));
        }
        let version: i64 = tok.next("version")?;
        if version != 2 {
            return Err(MeshError::Version(version));
        }

        let num_vertices: i64 = tok.next("vertex count")?;
        let num_polygons: i64 = tok.next("polygon count")?;
        if num_vertices < 1 {
            return Err(MeshError::VertexCount(num_vertices));
        }
        if num_polygons < 1 {
            return Err(MeshError::PolygonCount(num_polygons));
        }
        let (nv, np) = (num_vertices as usize, num_polygons as usize);
        // Each record takes at least one byte of input.
        let cap = |n: usize| n.min(text.len());

        let mut vertices = Vec::with_capacity(cap(nv));
        for vi in 0..nv {
            let x: f64 = tok.next("vertex x")?;
            let y: f64 = tok.next("vertex y")?;
            let count: i64 = tok.next("vertex neighbour count")?;
            if count < 2 {
                return Err(MeshError::VertexNeighbours { vertex: vi, count });
            }
            let mut polygons = Vec::with_capacity(cap(count as usize));
            for _ in 0..count {
                let index: i64 = tok.next("vertex neighbour")?;
                polygons.push(polygon_ref(index, np, || format!("vertex {vi}"))?);
            }
            vertices.push(Vertex::new(Point::new(x, y), polygons));
        }

        let mut polygons = Vec::with_capacity(cap(np));
        for pi in 0..np {
            let count: i64 = tok.next("polygon vertex count")?;
            if count < 3 {
                return Err(MeshError::PolygonSize { polygon: pi, count });
            }
            let n = count as usize;
            let mut poly_vertices: Vec<VertexId> = Vec::with_capacity(cap(n));
            for _ in 0..n {
                let index: i64 = tok.next("polygon vertex")?;
                if index < 0 || index as usize >= nv {
                    return Err(MeshError::VertexIndex {
                        polygon: pi,
                        index,
                        count: nv,
                    });
                }
                poly_vertices.push(index as usize);
            }
            let mut neighbours = Vec::with_capacity(cap(n));
            for _ in 0..n {
                let index: i64 = tok.next("polygon neighbour")?;
                neighbours.push(polygon_ref(index, np, || format!("polygon {pi}"))?);
            }
            polygons.push(Polygon::new(poly_vertices, neighbours, &vertices));
        }

        if let Some(extra) = tok.inner.next() {
            return Err(MeshError::TrailingData(extra.to_string()));
        }

        Ok(Mesh::from_parts(vertices, polygons))
    }
}
