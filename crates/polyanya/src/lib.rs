//! Optimal any-angle pathfinding on navigation meshes (Polyanya).
//!
//! A [`Mesh`] of convex polygons is loaded once and shared read-only; each
//! thread drives its own [`SearchInstance`] over it:
//!
//! ```no_run
//! use polyanya::prelude::*;
//!
//! let mesh = Mesh::read(std::fs::File::open("arena.mesh")?)?;
//! let mut si = SearchInstance::new(&mesh);
//! si.set_start_goal(Point::new(1.0, 1.0), Point::new(9.0, 9.0));
//! if si.search() {
//!     println!("cost {} via {:?}", si.get_cost(), si.path_points());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! API Policy
//! - `geometry` is a small kernel of pure functions with one shared
//!   tolerance, `geometry::EPSILON`.
//! - Unreachable goals and off-mesh points are ordinary results
//!   (`search()` returns `false`, `get_cost()` returns `-1`), not errors.
//!   Only malformed input files are errors.

pub mod geometry;
pub mod mesh;
pub mod scenario;
pub mod search;

#[cfg(test)]
mod fixtures;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geometry::{Point, EPSILON};
pub use mesh::{Mesh, MeshError, PointLocation};
pub use scenario::{load_scenarios, random_scenarios, Scenario, ScenarioError};
pub use search::{SearchInstance, SearchStats};

/// Common exports for callers.
pub mod prelude {
    pub use crate::geometry::{distance, Point, EPSILON};
    pub use crate::mesh::{Mesh, MeshError, PointLocation};
    pub use crate::scenario::{load_scenarios, random_scenarios, Scenario};
    pub use crate::search::{SearchInstance, SearchStats};
}
