use nodetool::{DeleteStatus, Geometry, Point, VertexPosition};

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn line() -> Geometry {
    Geometry::LineString(pts(&[(1.0, 1.0), (2.0, 1.0), (3.0, 2.0)]))
}

fn multi_line() -> Geometry {
    Geometry::MultiLineString(vec![
        pts(&[(1.0, 1.0), (2.0, 1.0), (3.0, 2.0)]),
        pts(&[(3.0, 3.0), (4.0, 3.0), (4.0, 2.0)]),
    ])
}

fn square() -> Geometry {
    Geometry::Polygon(vec![pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])])
}

#[test]
fn line_endpoints_and_neighbours() {
    let g = line();
    assert!(g.is_endpoint(0));
    assert!(!g.is_endpoint(1));
    assert!(g.is_endpoint(2));
    assert_eq!(g.adjacent_vertices(0), (None, Some(1)));
    assert_eq!(g.adjacent_vertices(1), (Some(0), Some(2)));
    assert_eq!(g.adjacent_vertices(2), (Some(1), None));
    assert_eq!(g.adjacent_vertices(3), (None, None));
    assert_eq!(g.vertex_at(3), None);
}

#[test]
fn multi_line_parts_do_not_leak_into_each_other() {
    let g = multi_line();
    assert_eq!(g.vertex_count(), 6);
    assert!(g.is_endpoint(3), "first vertex of second part is an endpoint");
    assert!(g.is_endpoint(2));
    assert!(!g.is_endpoint(4));
    assert_eq!(g.adjacent_vertices(2), (Some(1), None));
    assert_eq!(g.adjacent_vertices(3), (None, Some(4)));
    assert_eq!(g.position_of(4), Some(VertexPosition { part: 1, vertex: 1 }));
    assert_eq!(g.part_offset(1), Some(3));
    assert_eq!(g.adjacent_to_endpoint(5), Some(4));
    assert_eq!(g.adjacent_to_endpoint(4), None);
}

#[test]
fn edges_stay_within_parts() {
    let g = multi_line();
    let froms: Vec<usize> = g.edges().iter().map(|(from, _, _)| *from).collect();
    assert_eq!(froms, vec![0, 1, 3, 4]);
}

#[test]
fn ring_neighbours_wrap_past_the_closing_point() {
    let g = square();
    assert_eq!(g.distinct_vertex_indices(), vec![0, 1, 2, 3]);
    assert_eq!(g.adjacent_vertices(0), (Some(3), Some(1)));
    assert_eq!(g.adjacent_vertices(4), (Some(3), Some(1)));
    assert_eq!(g.adjacent_vertices(2), (Some(1), Some(3)));
    assert!(!g.is_endpoint(0));
}

#[test]
fn moving_ring_start_keeps_ring_closed() {
    let mut g = square();
    assert!(g.move_vertex(-1.0, -1.0, 0));
    assert_eq!(g.vertex_at(0), Some(Point::new(-1.0, -1.0)));
    assert_eq!(g.vertex_at(4), Some(Point::new(-1.0, -1.0)));
    assert!(!g.move_vertex(f64::NAN, 0.0, 1));
    assert!(!g.move_vertex(0.0, 0.0, 9));
}

#[test]
fn insert_before_vertex_and_on_closing_edge() {
    let mut g = line();
    assert!(g.insert_vertex(1.5, 0.0, 1));
    assert_eq!(g.vertex_count(), 4);
    assert_eq!(g.vertex_at(1), Some(Point::new(1.5, 0.0)));

    let mut r = square();
    // Closing edge 3 -> 4
    assert!(r.insert_vertex(0.0, 5.0, 4));
    let Geometry::Polygon(rings) = &r else { panic!("still a polygon") };
    assert_eq!(rings[0].len(), 6);
    assert_eq!(rings[0][4], Point::new(0.0, 5.0));
    assert_eq!(rings[0].first(), rings[0].last());
}

#[test]
fn tagged_insert_appends_past_line_end_only() {
    let mut g = line();
    assert!(g.insert_vertex_tagged(VertexPosition { part: 0, vertex: 3 }, Point::new(4.0, 2.0)));
    assert_eq!(g.vertex_at(3), Some(Point::new(4.0, 2.0)));
    assert!(!g.insert_vertex_tagged(VertexPosition { part: 0, vertex: 9 }, Point::new(0.0, 0.0)));
    assert!(!g.insert_vertex_tagged(VertexPosition { part: 1, vertex: 0 }, Point::new(0.0, 0.0)));

    let mut p = Geometry::Point(Some(Point::new(0.0, 0.0)));
    assert!(!p.insert_vertex_tagged(VertexPosition { part: 0, vertex: 0 }, Point::new(1.0, 1.0)));
}

#[test]
fn deleting_single_point_is_empty_geometry_not_failure() {
    let mut g = Geometry::Point(Some(Point::new(5.0, 5.0)));
    assert_eq!(g.delete_vertex(0), DeleteStatus::EmptyGeometry);
    assert!(g.is_empty());
    assert_eq!(g.delete_vertex(0), DeleteStatus::Failure);
}

#[test]
fn line_collapses_below_two_points() {
    let mut g = Geometry::LineString(pts(&[(0.0, 0.0), (1.0, 0.0)]));
    assert_eq!(g.delete_vertex(1), DeleteStatus::EmptyGeometry);
    assert!(g.is_empty());

    let mut m = multi_line();
    assert_eq!(m.delete_vertex(4), DeleteStatus::Success);
    assert_eq!(m.delete_vertex(4), DeleteStatus::Success);
    // Second part had one point left and was dropped
    assert_eq!(m.vertex_count(), 3);
    assert_eq!(m.delete_vertex(7), DeleteStatus::Failure);
}

#[test]
fn ring_delete_recloses_and_drops_degenerate_rings() {
    let mut g = square();
    assert_eq!(g.delete_vertex(0), DeleteStatus::Success);
    let Geometry::Polygon(rings) = &g else { panic!("still a polygon") };
    assert_eq!(rings[0], pts(&[(10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (10.0, 0.0)]));
    // Triangle: any further delete removes the exterior ring
    assert_eq!(g.delete_vertex(1), DeleteStatus::EmptyGeometry);

    let mut holed = Geometry::Polygon(vec![
        pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
        pts(&[(2.0, 2.0), (3.0, 2.0), (3.0, 3.0), (2.0, 2.0)]),
    ]);
    assert_eq!(holed.delete_vertex(6), DeleteStatus::Success);
    assert_eq!(holed.vertex_count(), 5, "hole dropped, exterior kept");
}

#[test]
fn multipoint_insert_and_delete() {
    let mut g = Geometry::MultiPoint(pts(&[(0.0, 0.0), (1.0, 1.0)]));
    assert!(g.insert_vertex(0.5, 0.5, 1));
    assert_eq!(g.vertex_at(1), Some(Point::new(0.5, 0.5)));
    assert_eq!(g.adjacent_vertices(1), (None, None));
    assert_eq!(g.delete_vertex(0), DeleteStatus::Success);
    assert_eq!(g.delete_vertex(0), DeleteStatus::Success);
    assert_eq!(g.delete_vertex(0), DeleteStatus::EmptyGeometry);
}
