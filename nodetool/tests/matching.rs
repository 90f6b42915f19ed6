use nodetool::algorithms::matching::{endpoint_marker_center, is_near_edge_center, Matcher};
use nodetool::algorithms::topology::find_companions;
use nodetool::{
    Crs, FeatureStore, Geometry, Locator, Match, MemoryLayer, MemoryLocator, Point, PointerEvent, Project, Scene,
    Target, ToolConfig, VertexOp, VertexRef,
};

fn at(x: f64, y: f64) -> PointerEvent {
    PointerEvent::left(x, -y)
}

fn line(coords: &[(f64, f64)]) -> Geometry {
    Geometry::LineString(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
}

fn project(layers: Vec<MemoryLayer>, topological: bool) -> Project {
    let mut p = Project::new();
    p.set_topological_editing(topological);
    for l in layers {
        p.add_layer(Box::new(l));
    }
    p
}

fn corner_project() -> Project {
    let layer = MemoryLayer::new(1, "roads", Crs::map(0))
        .with_feature(1, line(&[(0.0, 0.0), (100.0, 0.0)]))
        .with_feature(2, line(&[(100.0, 0.0), (100.0, 100.0)]))
        .with_feature(3, Geometry::Point(Some(Point::new(60.0, 8.0))));
    project(vec![layer], false)
}

fn feature(p: &Project, layer: u32, fid: u64) -> Geometry {
    p.layer(layer).and_then(|l| l.get_feature(fid)).expect("feature exists")
}

#[test]
fn locator_prefers_vertices_and_skips_other_layers() {
    let p = corner_project();
    let loc = MemoryLocator;
    let m = loc.nearest_vertex_or_edge(&p, Point::new(98.0, 3.0), 10.0, &[1], &mut |_: &Match| true).expect("match");
    assert!(m.is_vertex());
    assert_eq!(m.point, Point::new(100.0, 0.0));

    let m = loc.nearest_vertex_or_edge(&p, Point::new(30.0, 2.0), 10.0, &[1], &mut |_: &Match| true).expect("match");
    assert_eq!((m.fid, m.edge_vertices()), (1, Some((0, 1))));
    assert_eq!(m.point, Point::new(30.0, 0.0));
    assert!(loc.nearest_vertex_or_edge(&p, Point::new(30.0, 2.0), 10.0, &[2], &mut |_: &Match| true).is_none());

    let all = loc.nearest_vertex(&p, Point::new(100.0, 0.0), 0.0, &[1], &mut |_: &Match| true);
    assert_eq!(all.iter().map(|m| (m.fid, m.vertex_index())).collect::<Vec<_>>(), vec![(1, Some(1)), (2, Some(0))]);
}

#[test]
fn ring_closing_vertex_is_not_matched_twice() {
    let sq = Geometry::Polygon(vec![vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
        Point::new(0.0, 0.0),
    ]]);
    let p = project(vec![MemoryLayer::new(1, "parcels", Crs::map(0)).with_feature(1, sq)], false);
    let all = MemoryLocator.nearest_vertex(&p, Point::new(0.0, 0.0), 0.0, &[1], &mut |_: &Match| true);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].vertex_index(), Some(0));
}

#[test]
fn matcher_sticks_to_previous_feature_at_shared_vertex() {
    let p = corner_project();
    let mut matcher = Matcher::new();
    let m = matcher.match_near(&p, &MemoryLocator, Point::new(100.0, 50.0), 10.0).expect("edge of 2");
    assert_eq!(m.fid, 2);
    let m = matcher.match_near(&p, &MemoryLocator, Point::new(100.0, 0.0), 10.0).expect("shared vertex");
    assert_eq!((m.fid, m.vertex_index()), (2, Some(0)), "equal distance keeps the previous feature");

    matcher.reset();
    let m = matcher.match_near(&p, &MemoryLocator, Point::new(100.0, 0.0), 10.0).expect("shared vertex");
    assert_eq!((m.fid, m.vertex_index()), (1, Some(1)));
    assert_eq!(matcher.last_feature(), Some((1, 1)));
}

#[test]
fn matcher_switches_when_global_is_better() {
    let p = corner_project();
    let mut matcher = Matcher::new();
    let m = matcher.match_near(&p, &MemoryLocator, Point::new(50.0, 5.0), 10.0).expect("edge of 1");
    assert_eq!((m.fid, m.is_edge()), (1, true));
    // A vertex elsewhere beats an edge of the sticky feature
    let m = matcher.match_near(&p, &MemoryLocator, Point::new(57.0, 5.0), 10.0).expect("point 3");
    assert_eq!((m.fid, m.is_vertex()), (3, true));
    // Sticky feature out of reach
    let m = matcher.match_near(&p, &MemoryLocator, Point::new(104.0, 30.0), 10.0).expect("edge of 2");
    assert_eq!(m.fid, 2);
    assert!(matcher.match_near(&p, &MemoryLocator, Point::new(500.0, 500.0), 10.0).is_none());
    assert_eq!(matcher.last_feature(), None);
}

#[test]
fn hover_highlight_follows_sticky_feature() {
    let mut s = Scene::new(corner_project(), ToolConfig::default());
    s.move_to(at(100.0, 50.0));
    s.move_to(at(100.0, 0.0));
    assert_eq!(s.feedback.highlight, Some(line(&[(100.0, 0.0), (100.0, 100.0)])));
    assert_eq!(s.feedback.snap, Some(Point::new(100.0, 0.0)));
    s.move_to(at(30.0, 1.0));
    assert_eq!(s.feedback.snap, None);
    assert_eq!(s.feedback.edge_center, Some(Point::new(50.0, 0.0)));
    s.move_to(at(500.0, 500.0));
    assert_eq!(s.feedback.highlight, None);
    assert_eq!(s.feedback.edge_center, None);
}

#[test]
fn edge_center_zone_and_endpoint_marker() {
    let m = Match {
        layer: 1,
        fid: 1,
        target: Target::Edge { from: 0, a: Point::new(0.0, 0.0), b: Point::new(100.0, 0.0) },
        point: Point::new(45.0, 0.0),
        distance: 0.0,
    };
    assert!(is_near_edge_center(&m, Point::new(45.0, 0.0), 8.0));
    assert!(is_near_edge_center(&m, Point::new(42.0, 0.0), 8.0), "boundary inclusive");
    assert!(!is_near_edge_center(&m, Point::new(41.0, 0.0), 8.0));

    let g = line(&[(0.0, 0.0), (0.0, 10.0)]);
    assert_eq!(endpoint_marker_center(&g, 1, 5.0), Some(Point::new(0.0, 15.0)));
    assert_eq!(endpoint_marker_center(&g, 0, 5.0), Some(Point::new(0.0, -5.0)));
    let degenerate = line(&[(1.0, 1.0), (1.0, 1.0)]);
    assert_eq!(endpoint_marker_center(&degenerate, 0, 5.0), None);
}

fn topo_layers() -> Vec<MemoryLayer> {
    let a = MemoryLayer::new(1, "a", Crs::map(0))
        .with_feature(1, line(&[(0.0, 0.0), (100.0, 0.0)]))
        .with_feature(2, line(&[(100.0, 0.0), (200.0, 0.0)]));
    // Half-size storage: (50, 0) sits on map (100, 0)
    let b = MemoryLayer::new(2, "b", Crs { code: 3, scale: 2.0, offset: Point::new(0.0, 0.0) })
        .with_feature(5, line(&[(50.0, 0.0), (50.0, 50.0)]));
    vec![a, b]
}

#[test]
fn companions_are_exact_coincidences_minus_primary() {
    let p = project(topo_layers(), true);
    let primary = MemoryLocator
        .nearest_vertex_or_edge(&p, Point::new(100.0, 0.0), 0.0, &[1], &mut |_: &Match| true)
        .expect("vertex");
    let companions = find_companions(&p, &MemoryLocator, &primary);
    assert_eq!(companions, vec![VertexRef::moving(1, 2, 0), VertexRef::moving(2, 5, 0)]);

    let edge = MemoryLocator
        .nearest_vertex_or_edge(&p, Point::new(50.0, 1.0), 5.0, &[1], &mut |_: &Match| true)
        .expect("edge");
    assert!(find_companions(&p, &MemoryLocator, &edge).is_empty());
}

#[test]
fn topological_move_drags_all_coincident_vertices() {
    let mut s = Scene::new(project(topo_layers(), true), ToolConfig::default());
    s.click(at(100.0, 0.0));
    let drag = s.tool.drag().expect("dragging");
    assert_eq!(drag.primary, VertexRef::moving(1, 1, 1));
    assert_eq!(drag.companions.len(), 2);
    assert_eq!(drag.band_count(), 3);

    s.click(at(100.0, -40.0));
    assert_eq!(feature(&s.project, 1, 1), line(&[(0.0, 0.0), (100.0, -40.0)]));
    assert_eq!(feature(&s.project, 1, 2), line(&[(100.0, -40.0), (200.0, 0.0)]));
    assert_eq!(feature(&s.project, 2, 5), line(&[(50.0, -20.0), (50.0, 50.0)]));
    let report = s.tool.last_report().expect("committed");
    assert_eq!(report.committed, vec![1, 2]);
    assert_eq!(s.project.memory_layer(1).expect("memory layer").geometry_writes(), 2);
}

#[test]
fn without_topological_editing_only_the_primary_moves() {
    let mut s = Scene::new(project(topo_layers(), false), ToolConfig::default());
    s.click(at(100.0, 0.0));
    assert!(s.tool.drag().expect("dragging").companions.is_empty());
    s.click(at(100.0, -40.0));
    assert_eq!(feature(&s.project, 1, 2), line(&[(100.0, 0.0), (200.0, 0.0)]));
    assert_eq!(feature(&s.project, 2, 5), line(&[(50.0, 0.0), (50.0, 50.0)]));
}

#[test]
fn self_touching_feature_gets_one_replacement() {
    let ring_line = line(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 0.0)]);
    let mut s = Scene::new(project(vec![MemoryLayer::new(1, "a", Crs::map(0)).with_feature(1, ring_line)], true), ToolConfig::default());
    s.click(at(0.0, 0.0));
    let drag = s.tool.drag().expect("dragging");
    assert_eq!(drag.primary.op, VertexOp::Move(0));
    assert_eq!(drag.companions, vec![VertexRef::moving(1, 1, 3)]);
    s.click(at(-30.0, -30.0));
    assert_eq!(feature(&s.project, 1, 1), line(&[(-30.0, -30.0), (100.0, 0.0), (100.0, 100.0), (-30.0, -30.0)]));
    assert_eq!(s.project.memory_layer(1).expect("memory layer").geometry_writes(), 1);
}

#[test]
fn edge_drag_never_collects_companions() {
    let mut s = Scene::new(project(topo_layers(), true), ToolConfig::default());
    s.click(at(50.0, 1.0));
    let drag = s.tool.drag().expect("dragging");
    assert_eq!(drag.primary.op, VertexOp::InsertBeforeEdge(1));
    assert!(drag.companions.is_empty());
}
