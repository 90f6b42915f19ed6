use nodetool::{
    Crs, FeatureStore, Geometry, Key, MemoryLayer, Point, PointerEvent, Project, Scene, ToolConfig, ToolState,
    VertexOp, VertexRef,
};

fn at(x: f64, y: f64) -> PointerEvent {
    PointerEvent::left(x, -y)
}

fn line(coords: &[(f64, f64)]) -> Geometry {
    Geometry::LineString(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
}

fn scene() -> Scene {
    let layer = MemoryLayer::new(1, "roads", Crs::map(0))
        .with_feature(1, line(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (150.0, 0.0)]))
        .with_feature(2, Geometry::Point(Some(Point::new(300.0, 300.0))));
    let mut p = Project::new();
    p.add_layer(Box::new(layer));
    Scene::new(p, ToolConfig::default())
}

/// Drag a selection rectangle between two map corners.
fn select_rect(s: &mut Scene, a: (f64, f64), b: (f64, f64)) {
    s.press(at(a.0, a.1));
    s.move_to(at(b.0, b.1));
    s.release(at(b.0, b.1));
}

fn selected(s: &Scene) -> Vec<(u64, usize)> {
    s.tool.selection().entries().iter().map(|r| (r.fid, r.index())).collect()
}

fn feature(s: &Scene, fid: u64) -> Geometry {
    s.project.layer(1).and_then(|l| l.get_feature(fid)).expect("feature exists")
}

#[test]
fn rectangle_selects_contained_vertices_including_boundary() {
    let mut s = scene();
    s.press(at(40.0, -30.0));
    assert!(matches!(s.tool.state(), ToolState::RectCandidate { .. }));
    s.move_to(at(41.0, -30.0));
    assert!(matches!(s.tool.state(), ToolState::RectCandidate { .. }), "below threshold");
    s.move_to(at(100.0, 20.0));
    assert!(matches!(s.tool.state(), ToolState::SelectingRect { .. }));
    assert!(s.feedback.rect.is_some());
    s.release(at(100.0, 20.0));

    assert_eq!(s.tool.state(), &ToolState::Idle);
    assert_eq!(s.feedback.rect, None);
    assert_eq!(selected(&s), vec![(1, 1), (1, 2)]);
    assert_eq!(s.feedback.marker_points(), vec![Point::new(50.0, 0.0), Point::new(100.0, 0.0)]);
}

#[test]
fn boundary_containment_is_repeatable() {
    let mut first = None;
    for _ in 0..3 {
        let mut s = scene();
        select_rect(&mut s, (100.0, -20.0), (150.0, 0.0));
        let got = selected(&s);
        assert_eq!(got, vec![(1, 2), (1, 3)]);
        if let Some(prev) = &first {
            assert_eq!(prev, &got);
        }
        first = Some(got);
    }
}

#[test]
fn selection_never_holds_duplicates() {
    let mut s = scene();
    let refs = vec![VertexRef::moving(1, 1, 2), VertexRef::moving(1, 1, 2), VertexRef::moving(1, 1, 9)];
    let nodetool::Scene { project, tool, feedback, .. } = &mut s;
    let mut cache = tool.cache().clone();
    let mut sel = nodetool::SelectionSet::new();
    sel.set(refs, &mut cache, project, feedback);
    assert_eq!(sel.len(), 1, "duplicate and missing vertices dropped");
    assert_eq!(feedback.markers.len(), 1);
    sel.clear(feedback);
    assert!(feedback.markers.is_empty());
}

#[test]
fn delete_selection_removes_all_highest_first() {
    let mut s = scene();
    select_rect(&mut s, (40.0, -30.0), (100.0, 20.0));
    assert!(s.key(Key::Delete));
    assert_eq!(feature(&s, 1), line(&[(0.0, 0.0), (150.0, 0.0)]));
    assert!(s.tool.selection().is_empty(), "several deleted: nothing reselected");
    assert!(s.feedback.markers.is_empty());
    assert_eq!(s.project.memory_layer(1).expect("memory layer").command_history(), ["Deleted vertex".to_string()]);
}

#[test]
fn single_delete_reselects_previous_vertex() {
    let mut s = scene();
    select_rect(&mut s, (85.0, -15.0), (115.0, 15.0));
    assert_eq!(selected(&s), vec![(1, 2)]);
    assert!(s.key(Key::Backspace));
    assert_eq!(feature(&s, 1), line(&[(0.0, 0.0), (50.0, 0.0), (150.0, 0.0)]));
    assert_eq!(selected(&s), vec![(1, 1)]);
    assert_eq!(s.feedback.marker_points(), vec![Point::new(50.0, 0.0)]);
}

#[test]
fn deleting_last_vertex_leaves_no_highlight() {
    let mut s = scene();
    select_rect(&mut s, (290.0, 290.0), (310.0, 310.0));
    assert_eq!(selected(&s), vec![(2, 0)]);
    assert!(s.key(Key::Delete));
    assert_eq!(feature(&s, 2), Geometry::Point(None));
    assert!(s.tool.selection().is_empty());
    assert!(s.feedback.markers.is_empty());
    assert!(s.tool.last_report().expect("committed").is_clean());
}

#[test]
fn comma_and_period_step_through_vertices() {
    let mut s = scene();
    select_rect(&mut s, (35.0, -15.0), (65.0, 15.0));
    assert_eq!(selected(&s), vec![(1, 1)]);
    assert!(s.key(Key::Period));
    assert_eq!(selected(&s), vec![(1, 2)]);
    assert!(s.key(Key::Comma));
    assert!(s.key(Key::Comma));
    assert_eq!(selected(&s), vec![(1, 0)]);
    assert!(!s.key(Key::Comma), "no vertex before the first");
    assert_eq!(selected(&s), vec![(1, 0)]);
    assert_eq!(s.feedback.markers.len(), 1);
}

#[test]
fn stepping_needs_exactly_one_selected() {
    let mut s = scene();
    assert!(!s.key(Key::Period));
    select_rect(&mut s, (-10.0, -10.0), (60.0, 10.0));
    assert_eq!(selected(&s).len(), 2);
    assert!(!s.key(Key::Period));
}

#[test]
fn escape_clears_selection_and_dismisses_rectangle() {
    let mut s = scene();
    select_rect(&mut s, (35.0, -15.0), (65.0, 15.0));
    assert!(s.key(Key::Escape));
    assert!(s.tool.selection().is_empty());
    assert!(s.feedback.markers.is_empty());

    s.press(at(40.0, -30.0));
    s.move_to(at(90.0, 30.0));
    assert!(s.feedback.rect.is_some());
    assert!(s.key(Key::Escape));
    assert_eq!(s.tool.state(), &ToolState::Idle);
    assert_eq!(s.feedback.rect, None);
    s.release(at(90.0, 30.0));
    assert!(s.tool.selection().is_empty());
}

#[test]
fn new_press_clears_selection() {
    let mut s = scene();
    select_rect(&mut s, (35.0, -15.0), (65.0, 15.0));
    s.press(at(150.0, 0.0));
    assert!(s.tool.selection().is_empty());
    assert_eq!(s.tool.drag().map(|d| d.primary.op), Some(VertexOp::Move(3)));
}

#[test]
fn reselect_stays_in_the_deleted_vertex_part() {
    let pts = |c: &[(f64, f64)]| c.iter().map(|&(x, y)| Point::new(x, y)).collect::<Vec<_>>();
    let layer = MemoryLayer::new(1, "roads", Crs::map(0))
        .with_feature(3, Geometry::MultiLineString(vec![
            pts(&[(0.0, 200.0), (50.0, 200.0), (100.0, 200.0)]),
            pts(&[(0.0, 300.0), (50.0, 300.0), (100.0, 300.0)]),
        ]))
        .with_feature(4, Geometry::MultiLineString(vec![
            pts(&[(0.0, 400.0), (50.0, 400.0), (100.0, 400.0)]),
            pts(&[(200.0, 400.0), (250.0, 400.0)]),
        ]));
    let mut p = Project::new();
    p.add_layer(Box::new(layer));
    let mut s = Scene::new(p, ToolConfig::default());

    // First vertex of the second part: its successor takes over, not the
    // last vertex of the first part
    select_rect(&mut s, (-15.0, 285.0), (15.0, 315.0));
    assert_eq!(selected(&s), vec![(3, 3)]);
    assert!(s.key(Key::Delete));
    assert_eq!(selected(&s), vec![(3, 3)]);
    assert_eq!(s.feedback.marker_points(), vec![Point::new(50.0, 300.0)]);

    // The whole part collapses: fall back to vertex 0
    select_rect(&mut s, (235.0, 385.0), (265.0, 415.0));
    assert_eq!(selected(&s), vec![(4, 4)]);
    assert!(s.key(Key::Delete));
    assert_eq!(feature(&s, 4), Geometry::MultiLineString(vec![pts(&[(0.0, 400.0), (50.0, 400.0), (100.0, 400.0)])]));
    assert_eq!(selected(&s), vec![(4, 0)]);
    assert_eq!(s.feedback.marker_points(), vec![Point::new(0.0, 400.0)]);
}
