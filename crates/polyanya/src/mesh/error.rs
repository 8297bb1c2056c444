//! Errors raised while reading a mesh file.

use thiserror::Error;

/// Result alias for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh file that cannot be turned into a [`super::Mesh`].
///
/// Every variant is fatal: no partially built mesh is ever returned.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read mesh input: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("could not parse {what} from '{token}'")]
    Parse { what: &'static str, token: String },

    #[error("invalid header '{0}' (expecting 'mesh')")]
    Header(String),

    #[error("invalid version {0} (expecting 2)")]
    Version(i64),

    #[error("invalid number of vertices: {0}")]
    VertexCount(i64),

    #[error("invalid number of polygons: {0}")]
    PolygonCount(i64),

    #[error("vertex {vertex} has {count} neighbours (expecting at least 2)")]
    VertexNeighbours { vertex: usize, count: i64 },

    #[error("polygon {polygon} has {count} vertices (expecting at least 3)")]
    PolygonSize { polygon: usize, count: i64 },

    #[error("{owner} refers to polygon {index}, but the mesh has {count} polygons")]
    PolygonIndex {
        owner: String,
        index: i64,
        count: usize,
    },

    #[error("polygon {polygon} refers to vertex {index}, but the mesh has {count} vertices")]
    VertexIndex {
        polygon: usize,
        index: i64,
        count: usize,
    },

    #[error("unexpected trailing data '{0}' after the last polygon")]
    TrailingData(String),
}
