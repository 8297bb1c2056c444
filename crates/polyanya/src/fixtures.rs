//! Small hand-checked meshes shared by the unit tests (see `data/`).

use crate::mesh::Mesh;

pub(crate) const SQUARE: &str = include_str!("../data/square.mesh");
pub(crate) const RING_QUADS: &str = include_str!("../data/ring_quads.mesh");
pub(crate) const RING_TRIS: &str = include_str!("../data/ring_tris.mesh");
pub(crate) const CORRIDOR: &str = include_str!("../data/corridor.mesh");
pub(crate) const PINCH: &str = include_str!("../data/pinch.mesh");
pub(crate) const ISLANDS: &str = include_str!("../data/islands.mesh");

pub(crate) fn mesh(text: &str) -> Mesh {
    text.parse().expect("fixture mesh parses")
}
