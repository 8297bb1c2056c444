//! Interval search over a navigation mesh.
//!
//! Purpose
//! - Find the Euclidean shortest path between two points of a `Mesh`.
//!
//! Why this design
//! - Nodes are intervals on polygon edges seen from a root (the start or a
//!   corner vertex), expanded best-first by `g + h`.
//! - Roots carry a best-known `g`; nodes reaching a root at a worse cost are
//!   pruned both when generated and when popped.
//! - Runs of single-successor expansions are walked inline without touching
//!   the open list.
//!
//! References
//! - Harabor, Grastien, Öz, Aksakalli: "Optimal Any-Angle Pathfinding In
//!   Practice" (JAIR 2017).
//! - Code cross-refs: `Mesh::get_point_location`, `expansion::get_successors`

mod expansion;
mod instance;
mod types;

pub use expansion::{get_h_value, get_successors};
pub use instance::{SearchInstance, SearchStats};
pub use types::{NodeArena, NodeId, SearchNode, Successor, SuccessorType};
