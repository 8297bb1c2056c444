//! Shortest path around the hole of the ring fixture, with search counters.
//!
//! Run: `cargo run -p polyanya --example ring_path`

use polyanya::geometry::Coords;
use polyanya::prelude::*;

fn main() -> Result<(), MeshError> {
    let mesh: Mesh = include_str!("../data/ring_quads.mesh").parse()?;
    println!("{mesh}");

    let mut si = SearchInstance::new(&mesh);
    si.set_start_goal(Point::new(0.5, 1.5), Point::new(2.5, 1.5));
    if !si.search() {
        println!("no path");
        return Ok(());
    }

    let path: Vec<String> = si
        .path_points()
        .into_iter()
        .map(|p| Coords(p).to_string())
        .collect();
    println!("cost={:.9} path={}", si.get_cost(), path.join(" "));
    println!("{:?} in {:.1}us", si.stats(), si.get_search_micro());
    for node in si.search_nodes() {
        println!("{node}  {}", mesh.describe_polygon(node.next_polygon));
    }
    Ok(())
}
