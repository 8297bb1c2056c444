use super::*;
use crate::fixtures::{self, CORRIDOR, ISLANDS, PINCH, RING_QUADS, RING_TRIS, SQUARE};
use nalgebra::vector;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn parses_square() {
    let mesh = fixtures::mesh(SQUARE);
    assert_eq!(mesh.vertices().len(), 4);
    assert_eq!(mesh.polygons().len(), 1);
    assert_eq!(mesh.max_poly_sides(), 4);
    assert_eq!(
        *mesh.bounds(),
        Aabb {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 10.0,
            max_y: 10.0
        }
    );
    let poly = &mesh.polygons()[0];
    assert_eq!(poly.vertices, vec![0, 1, 2, 3]);
    assert!(poly.polygons.iter().all(Option::is_none));
    assert!(poly.is_one_way);
    assert!(mesh.vertices().iter().all(|v| v.is_corner && !v.is_ambig));
}

#[test]
fn vertex_flags_follow_obstacle_wedges() {
    let pinch = fixtures::mesh(PINCH);
    let centre = &pinch.vertices()[2];
    assert_eq!(centre.polygons, vec![Some(1), None, Some(0), None]);
    assert!(centre.is_corner);
    assert!(centre.is_ambig);
    assert!(!pinch.vertices()[0].is_ambig);

    let ring = fixtures::mesh(RING_QUADS);
    let inner = &ring.vertices()[4];
    assert!(inner.is_corner);
    assert!(!inner.is_ambig);

    // Adjacent obstacle wedges form a single run.
    let v = Vertex::new(vector![0.0, 0.0], vec![Some(0), None, None]);
    assert!(v.is_corner && !v.is_ambig);
    let v = Vertex::new(vector![0.0, 0.0], vec![Some(0), Some(1)]);
    assert!(!v.is_corner && !v.is_ambig);
}

#[test]
fn one_way_polygons_have_a_single_traversable_edge() {
    let mesh = fixtures::mesh(CORRIDOR);
    let flags: Vec<bool> = mesh.polygons().iter().map(|p| p.is_one_way).collect();
    assert_eq!(flags, vec![true, false, false, false, true]);
}

#[test]
fn parse_rejects_malformed_input() {
    let cases: &[(&str, fn(&MeshError) -> bool)] = &[
        ("", |e| matches!(e, MeshError::UnexpectedEof(_))),
        ("grid 2 1 1", |e| matches!(e, MeshError::Header(h) if h == "grid")),
        ("mesh 3 1 1", |e| matches!(e, MeshError::Version(3))),
        ("mesh two", |e| matches!(e, MeshError::Parse { .. })),
        ("mesh 2 0 1", |e| matches!(e, MeshError::VertexCount(0))),
        ("mesh 2 3 0", |e| matches!(e, MeshError::PolygonCount(0))),
        ("mesh 2 3 1  0 0 1 0", |e| {
            matches!(e, MeshError::VertexNeighbours { vertex: 0, count: 1 })
        }),
        ("mesh 2 3 1  0 0 2 0 5", |e| {
            matches!(e, MeshError::PolygonIndex { index: 5, .. })
        }),
        ("mesh 2 3 1  0 0 2 0 -2", |e| {
            matches!(e, MeshError::PolygonIndex { index: -2, .. })
        }),
        (
            "mesh 2 3 1  0 0 2 0 -1  1 0 2 0 -1  0 1 2 0 -1  2 0 1 -1 -1",
            |e| matches!(e, MeshError::PolygonSize { polygon: 0, count: 2 }),
        ),
        (
            "mesh 2 3 1  0 0 2 0 -1  1 0 2 0 -1  0 1 2 0 -1  3 0 1 3 -1 -1 -1",
            |e| matches!(e, MeshError::VertexIndex { index: 3, count: 3, .. }),
        ),
        (
            "mesh 2 3 1  0 0 2 0 -1  1 0 2 0 -1  0 1 2 0 -1  3 0 1 2 -1 -1",
            |e| matches!(e, MeshError::UnexpectedEof(_)),
        ),
        (
            "mesh 2 3 1  0 0 2 0 -1  1 0 2 0 -1  0 1 2 0 -1  3 0 1 2 -1 -1 -1 7",
            |e| matches!(e, MeshError::TrailingData(t) if t == "7"),
        ),
    ];
    for (text, check) in cases {
        let err = text.parse::<Mesh>().expect_err(text);
        assert!(check(&err), "unexpected error for {text:?}: {err}");
    }
}

#[test]
fn read_from_reader_matches_from_str() {
    let mesh = Mesh::read(RING_TRIS.as_bytes()).unwrap();
    assert_eq!(mesh.polygons().len(), 8);
    assert_eq!(mesh.max_poly_sides(), 3);
}

#[test]
fn slabs_are_sorted_by_mid_y_then_width() {
    let mesh = fixtures::mesh(RING_TRIS);
    let xs: Vec<f64> = mesh.slabs.iter().map(|s| s.x).collect();
    assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    for slab in &mesh.slabs {
        for pair in slab.polygons.windows(2) {
            let (a, b) = (&mesh.polygons()[pair[0]].bounds, &mesh.polygons()[pair[1]].bounds);
            assert!(
                a.y_sum() < b.y_sum() || (a.y_sum() == b.y_sum() && a.height() >= b.height()),
                "slab {} out of order",
                slab.x
            );
        }
        for &p in &slab.polygons {
            let b = &mesh.polygons()[p].bounds;
            assert!(b.min_x <= slab.x && slab.x <= b.max_x);
        }
    }
}

#[test]
fn poly_contains_point_cases() {
    let mesh = fixtures::mesh(SQUARE);
    assert_eq!(
        mesh.poly_contains_point(0, &vector![5.0, 5.0]),
        PolyContainment::Inside
    );
    assert_eq!(
        mesh.poly_contains_point(0, &vector![11.0, 5.0]),
        PolyContainment::Outside
    );
    assert_eq!(
        mesh.poly_contains_point(0, &vector![0.0, 0.0]),
        PolyContainment::OnVertex(0)
    );
    assert_eq!(
        mesh.poly_contains_point(0, &vector![10.0, 10.0 + 1e-9]),
        PolyContainment::OnVertex(2)
    );
    assert_eq!(
        mesh.poly_contains_point(0, &vector![5.0, 0.0]),
        PolyContainment::OnEdge {
            adjacent: None,
            left: 1,
            right: 0
        }
    );

    let ring = fixtures::mesh(RING_QUADS);
    // Inside the AABB of polygon 0 but across its slanted edge.
    assert_eq!(
        ring.poly_contains_point(0, &vector![2.9, 0.9]),
        PolyContainment::Outside
    );
    assert_eq!(
        ring.poly_contains_point(0, &vector![2.5, 0.5]),
        PolyContainment::OnEdge {
            adjacent: Some(1),
            left: 5,
            right: 1
        }
    );
}

#[test]
fn point_location_variants() {
    let square = fixtures::mesh(SQUARE);
    assert_eq!(
        square.get_point_location(&vector![5.0, 5.0]),
        PointLocation::InPolygon(0)
    );
    assert_eq!(
        square.get_point_location(&vector![5.0, 0.0]),
        PointLocation::OnMeshBorder {
            poly: 0,
            left: 1,
            right: 0
        }
    );
    assert_eq!(
        square.get_point_location(&vector![0.0, 0.0]),
        PointLocation::OnCornerVertexUnambig { vertex: 0, poly: 0 }
    );
    assert_eq!(
        square.get_point_location(&vector![-1.0, 5.0]),
        PointLocation::NotOnMesh
    );

    let ring = fixtures::mesh(RING_QUADS);
    assert_eq!(
        ring.get_point_location(&vector![1.5, 0.5]),
        PointLocation::InPolygon(0)
    );
    let on_edge = ring.get_point_location(&vector![2.5, 0.5]);
    assert_eq!(
        on_edge,
        PointLocation::OnEdge {
            poly1: 0,
            poly2: 1,
            left: 5,
            right: 1
        }
    );
    // The same edge seen from the other polygon.
    assert_eq!(
        on_edge,
        PointLocation::OnEdge {
            poly1: 1,
            poly2: 0,
            left: 1,
            right: 5
        }
    );
    assert_eq!(on_edge.poly1(), Some(0));
    // Inside the hole.
    assert_eq!(
        ring.get_point_location(&vector![1.5, 1.5]),
        PointLocation::NotOnMesh
    );

    let pinch = fixtures::mesh(PINCH);
    let ambig = pinch.get_point_location(&vector![1.0, 1.0]);
    assert_eq!(
        ambig,
        PointLocation::OnCornerVertexAmbig {
            vertex: 2,
            poly: None
        }
    );
    assert_eq!(ambig.poly1(), None);

    let islands = fixtures::mesh(ISLANDS);
    assert_eq!(
        islands.get_point_location(&vector![3.0, 0.2]),
        PointLocation::NotOnMesh
    );
    assert_eq!(
        islands.get_point_location(&vector![5.2, 0.2]),
        PointLocation::InPolygon(1)
    );
}

#[test]
fn non_corner_vertex_location() {
    let ring = fixtures::mesh(RING_TRIS);
    // (0, 0) touches two triangles and the outside.
    assert!(matches!(
        ring.get_point_location(&vector![0.0, 0.0]),
        PointLocation::OnCornerVertexUnambig { vertex: 0, .. }
    ));

    let corridor = fixtures::mesh(CORRIDOR);
    // Interior vertex of the strip lies on the border, so it is a corner too.
    assert!(matches!(
        corridor.get_point_location(&vector![2.0, 1.0]),
        PointLocation::OnCornerVertexUnambig { vertex: 8, .. }
    ));

    let fan: Mesh = "mesh 2 5 4
        0 0 4 0 1 2 3
        1 0 3 0 3 -1
        0 1 3 1 0 -1
        -1 0 3 2 1 -1
        0 -1 3 3 2 -1
        3 0 1 2 1 3 -1
        3 0 2 3 2 0 -1
        3 0 3 4 3 1 -1
        3 0 4 1 0 2 -1"
        .parse()
        .unwrap();
    assert!(!fan.vertices()[0].is_corner);
    let loc = fan.get_point_location(&vector![0.0, 0.0]);
    assert!(matches!(
        loc,
        PointLocation::OnNonCornerVertex { vertex: 0, .. }
    ));
    assert_eq!(loc, fan.get_point_location_naive(&vector![0.0, 0.0]));
}

fn assert_matches_naive(mesh: &Mesh, p: Point) {
    let fast = mesh.get_point_location(&p);
    let naive = mesh.get_point_location_naive(&p);
    assert_eq!(fast, naive, "mismatch at ({}, {}): {fast} vs {naive}", p.x, p.y);
}

#[test]
fn slab_location_agrees_with_naive_on_grid() {
    for text in [RING_QUADS, RING_TRIS, CORRIDOR, PINCH] {
        let mesh = fixtures::mesh(text);
        let b = *mesh.bounds();
        let steps_x = ((b.max_x - b.min_x + 1.0) / 0.25) as usize;
        let steps_y = ((b.max_y - b.min_y + 1.0) / 0.25) as usize;
        for i in 0..=steps_x {
            for j in 0..=steps_y {
                let p = vector![b.min_x - 0.5 + 0.25 * i as f64, b.min_y - 0.5 + 0.25 * j as f64];
                assert_matches_naive(&mesh, p);
            }
        }
    }
}

#[test]
fn slab_location_agrees_with_naive_randomized_seeded() {
    let mut rng = StdRng::seed_from_u64(7);
    for text in [RING_QUADS, RING_TRIS, ISLANDS] {
        let mesh = fixtures::mesh(text);
        let b = *mesh.bounds();
        for _ in 0..2000 {
            let p = vector![
                rng.gen_range(b.min_x - 0.5..b.max_x + 0.5),
                rng.gen_range(b.min_y - 0.5..b.max_y + 0.5)
            ];
            assert_matches_naive(&mesh, p);
        }
    }
}

#[test]
fn points_just_left_of_a_breakpoint_use_its_slab() {
    let half = EPSILON / 2.0;
    let square = fixtures::mesh(SQUARE);
    let p = vector![-half, 0.0];
    assert_matches_naive(&square, p);
    assert_eq!(square.get_point_location(&p).poly1(), Some(0));
    assert_matches_naive(&square, vector![-half, 5.0]);

    // x = 5 is interior: the second island starts there.
    let islands = fixtures::mesh(ISLANDS);
    let p = vector![5.0 - half, 0.5];
    assert_matches_naive(&islands, p);
    assert_eq!(islands.get_point_location(&p).poly1(), Some(1));
    assert_matches_naive(&islands, vector![-half, 0.5]);

    let ring = fixtures::mesh(RING_QUADS);
    for p in [vector![1.0 - half, 0.5], vector![2.0 - half, 2.5], vector![3.0 - half, 1.5]] {
        assert_matches_naive(&ring, p);
        assert_ne!(ring.get_point_location(&p), PointLocation::NotOnMesh);
    }
}

#[test]
fn search_from_just_off_the_left_border() {
    let mesh = fixtures::mesh(SQUARE);
    let start = vector![-EPSILON / 2.0, 0.0];
    let mut si = crate::search::SearchInstance::with_start_goal(&mesh, start, vector![5.0, 5.0]);
    assert!(si.search());
    assert!((si.get_cost() - 50f64.sqrt()).abs() < 1e-6);
}

#[test]
fn precalc_is_repeatable() {
    let mut mesh = fixtures::mesh(RING_TRIS);
    let before: Vec<PointLocation> = (0..12)
        .map(|i| mesh.get_point_location(&vector![0.25 * i as f64, 0.4]))
        .collect();
    mesh.precalc_point_location();
    let after: Vec<PointLocation> = (0..12)
        .map(|i| mesh.get_point_location(&vector![0.25 * i as f64, 0.4]))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn display_and_describe() {
    let mesh = fixtures::mesh(SQUARE);
    assert_eq!(
        mesh.describe_polygon(0),
        "P0 [V0 (0, 0), V1 (10, 0), V2 (10, 10), V3 (0, 10)]"
    );
    let text = mesh.to_string();
    assert!(text.starts_with("mesh with 4 vertices, 1 polygons\nvertices:\n(0, 0) true\n"));
    assert!(text.ends_with("polygons:\n(0, 0) (10, 0) (10, 10) (0, 10)\n"));

    let loc = PointLocation::OnCornerVertexAmbig {
        vertex: 2,
        poly: None,
    };
    assert_eq!(loc.to_string(), "ON_CORNER_VERTEX_AMBIG (2, poly? -1)");
    assert_eq!(
        PolyContainment::OnEdge {
            adjacent: Some(1),
            left: 5,
            right: 1
        }
        .to_string(),
        "ON_EDGE (poly 1, vertices 5, 1)"
    );
}
