//! The interactive vertex tool: pointer/keyboard handling on top of the
//! matcher, cache, selection and commit machinery.
//!
//! Interaction is click-click: a press on a vertex (or an edge midpoint, or
//! an endpoint's append indicator) picks it up, pointer moves drag rubber
//! bands, and the next left press drops it and commits. A press on empty
//! canvas followed by a drag selects vertices with a rectangle.
use crate::algorithms::locator::{Locator, Match, Target};
use crate::algorithms::matching::{endpoint_marker_center, is_near_edge_center, Matcher};
use crate::algorithms::topology::find_companions;
use crate::cache::GeometryCache;
use crate::canvas::MapCanvas;
use crate::commit::{commit, BatchBuilder, CommitReport};
use crate::config::ToolConfig;
use crate::feedback::{BandId, Feedback};
use crate::geometry::tolerance::{rect_contains, within_tolerance, EPS_COORD};
use crate::geometry::vertices::DeleteStatus;
use crate::layers::Project;
use crate::model::{FeatureId, Geometry, LayerId, Point, Rect};
use crate::selection::{vertex_map_point, SelectionSet};
use crate::vertex_ref::{OpKind, VertexRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    /// Select the previous vertex of the single selected one.
    Comma,
    /// Select the next vertex of the single selected one.
    Period,
}

/// Pointer event in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub screen: Point,
    pub button: Button,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, button: Button) -> Self {
        PointerEvent { screen: Point::new(x, y), button }
    }
    pub fn left(x: f64, y: f64) -> Self {
        Self::new(x, y, Button::Left)
    }
    pub fn right(x: f64, y: f64) -> Self {
        Self::new(x, y, Button::Right)
    }
}

/// Host collaborators handed to every event handler.
pub struct EditContext<'a> {
    pub project: &'a mut Project,
    pub canvas: &'a MapCanvas,
    pub locator: &'a dyn Locator,
    pub feedback: &'a mut dyn Feedback,
}

/// A vertex picked up and following the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct Drag {
    pub primary: VertexRef,
    /// Coincident vertices moved in lock-step (topological editing).
    pub companions: Vec<VertexRef>,
    bands: Vec<BandId>,
}

impl Drag {
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn refs(&self) -> impl Iterator<Item = &VertexRef> {
        std::iter::once(&self.primary).chain(self.companions.iter())
    }

    // Existing vertices being dragged; never snap onto their old spot.
    fn is_dragged_vertex(&self, m: &Match) -> bool {
        let Some(index) = m.vertex_index() else { return false };
        self.refs().any(|r| r.is_move() && r.key() == (m.layer, m.fid, index))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ToolState {
    Idle,
    /// Left press on empty canvas; turns into a rectangle after enough travel.
    RectCandidate { origin: Point },
    SelectingRect { origin: Point, corner: Point },
    Dragging(Drag),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EndpointHover {
    layer: LayerId,
    fid: FeatureId,
    endpoint: usize,
    center: Point,
}

pub struct NodeTool {
    config: ToolConfig,
    cache: GeometryCache,
    matcher: Matcher,
    state: ToolState,
    selection: SelectionSet,
    endpoint_hover: Option<EndpointHover>,
    last_report: Option<CommitReport>,
}

impl Default for NodeTool {
    fn default() -> Self {
        NodeTool::new(ToolConfig::default())
    }
}

fn map_geometry(project: &Project, layer: LayerId, geom: &Geometry) -> Option<Geometry> {
    let crs = project.layer(layer)?.crs();
    Some(geom.map_points(|p| crs.to_map(p)))
}

impl NodeTool {
    pub fn new(config: ToolConfig) -> Self {
        NodeTool {
            config,
            cache: GeometryCache::new(),
            matcher: Matcher::new(),
            state: ToolState::Idle,
            selection: SelectionSet::new(),
            endpoint_hover: None,
            last_report: None,
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }
    pub fn state(&self) -> &ToolState {
        &self.state
    }
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ToolState::Dragging(_))
    }
    pub fn drag(&self) -> Option<&Drag> {
        match &self.state {
            ToolState::Dragging(d) => Some(d),
            _ => None,
        }
    }
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }
    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }
    /// Outcome of the most recent commit, if any.
    pub fn last_report(&self) -> Option<&CommitReport> {
        self.last_report.as_ref()
    }

    fn search_tolerance(&self, canvas: &MapCanvas) -> f64 {
        canvas.tolerance(self.config.search_radius_px)
    }

    // ----- pointer events -----

    pub fn press(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) {
        self.cache.sync(ctx.project);
        let map_pt = ctx.canvas.to_map(ev.screen);
        let dragging = self.is_dragging();
        match ev.button {
            Button::Left if dragging => self.confirm_drag(ctx, map_pt),
            Button::Right if dragging => self.cancel_drag(ctx),
            Button::Left if self.state == ToolState::Idle => {
                self.selection.clear(ctx.feedback);
                if !self.try_start_drag(ctx, map_pt) {
                    self.state = ToolState::RectCandidate { origin: ev.screen };
                }
            }
            Button::Right if self.state != ToolState::Idle => self.dismiss_rect(ctx),
            _ => {}
        }
    }

    /// Double-click on an edge inserts a vertex there, midpoint zone or not.
    pub fn double_click(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) {
        if ev.button != Button::Left {
            return;
        }
        if matches!(self.state, ToolState::RectCandidate { .. }) {
            self.state = ToolState::Idle;
        }
        if self.state != ToolState::Idle {
            return;
        }
        self.cache.sync(ctx.project);
        let map_pt = ctx.canvas.to_map(ev.screen);
        let tol = self.search_tolerance(ctx.canvas);
        if let Some(m) = self.matcher.match_near(ctx.project, ctx.locator, map_pt, tol) {
            if m.is_edge() {
                self.start_insert(ctx, &m, map_pt);
            }
        }
    }

    pub fn move_to(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) {
        self.cache.sync(ctx.project);
        let map_pt = ctx.canvas.to_map(ev.screen);
        match self.state.clone() {
            ToolState::Dragging(drag) => {
                let snap = self.snap_match(ctx, map_pt, Some(&drag));
                let free = snap.map_or(map_pt, |m| m.point);
                for band in &drag.bands {
                    ctx.feedback.move_band(*band, free);
                }
                ctx.feedback.set_snap_indicator(snap.map(|m| m.point));
            }
            ToolState::RectCandidate { origin } => {
                if origin.distance(&ev.screen) > self.config.rect_threshold_px {
                    self.state = ToolState::SelectingRect { origin, corner: ev.screen };
                    ctx.feedback.set_selection_rect(Some(ctx.canvas.rect_to_map(origin, ev.screen)));
                }
            }
            ToolState::SelectingRect { origin, .. } => {
                self.state = ToolState::SelectingRect { origin, corner: ev.screen };
                ctx.feedback.set_selection_rect(Some(ctx.canvas.rect_to_map(origin, ev.screen)));
            }
            ToolState::Idle => self.hover(ctx, map_pt),
        }
    }

    pub fn release(&mut self, ctx: &mut EditContext<'_>, ev: PointerEvent) {
        match self.state {
            ToolState::SelectingRect { origin, .. } => {
                self.cache.sync(ctx.project);
                ctx.feedback.set_selection_rect(None);
                self.state = ToolState::Idle;
                let map_rect = ctx.canvas.rect_to_map(origin, ev.screen);
                let refs = self.vertices_in_rect(ctx, map_rect);
                tracing::debug!(count = refs.len(), "rectangle selection");
                self.selection.set(refs, &mut self.cache, ctx.project, ctx.feedback);
            }
            ToolState::RectCandidate { .. } => self.state = ToolState::Idle,
            _ => {}
        }
    }

    // ----- keyboard -----

    /// Returns true when the key was consumed.
    pub fn key(&mut self, ctx: &mut EditContext<'_>, key: Key) -> bool {
        self.cache.sync(ctx.project);
        match key {
            Key::Delete | Key::Backspace => {
                if !self.selection.is_empty() {
                    self.delete_selection(ctx);
                    true
                } else if self.is_dragging() {
                    self.delete_dragged(ctx);
                    true
                } else {
                    false
                }
            }
            Key::Escape => {
                match self.state {
                    ToolState::Dragging(_) => self.cancel_drag(ctx),
                    ToolState::RectCandidate { .. } | ToolState::SelectingRect { .. } => self.dismiss_rect(ctx),
                    ToolState::Idle => self.selection.clear(ctx.feedback),
                }
                true
            }
            Key::Comma | Key::Period => {
                if self.is_dragging() {
                    return false;
                }
                let offset = if key == Key::Comma { -1 } else { 1 };
                self.selection.step_adjacent(offset, &mut self.cache, ctx.project, ctx.feedback)
            }
        }
    }

    /// Drop every transient state and feedback item.
    pub fn deactivate(&mut self, ctx: &mut EditContext<'_>) {
        match self.state {
            ToolState::Dragging(_) => self.cancel_drag(ctx),
            ToolState::RectCandidate { .. } | ToolState::SelectingRect { .. } => self.dismiss_rect(ctx),
            ToolState::Idle => {}
        }
        self.clear_hover(ctx.feedback);
        self.selection.clear(ctx.feedback);
        self.matcher.reset();
    }

    // ----- hover -----

    fn clear_hover(&mut self, feedback: &mut dyn Feedback) {
        feedback.set_snap_indicator(None);
        feedback.set_edge_center_indicator(None);
        feedback.set_endpoint_indicator(None);
        feedback.set_feature_highlight(None);
        self.endpoint_hover = None;
    }

    fn hover(&mut self, ctx: &mut EditContext<'_>, map_pt: Point) {
        let tol = self.search_tolerance(ctx.canvas);
        if let Some(ep) = self.endpoint_hover {
            if within_tolerance(ep.center.distance(&map_pt), tol) {
                return;
            }
        }
        let m = self.matcher.match_near(ctx.project, ctx.locator, map_pt, tol);
        ctx.feedback.set_snap_indicator(m.filter(|m| m.is_vertex()).map(|m| m.point));
        ctx.feedback.set_edge_center_indicator(m.and_then(|m| m.edge_midpoint()));
        self.endpoint_hover = None;
        let Some(m) = m else {
            ctx.feedback.set_feature_highlight(None);
            ctx.feedback.set_endpoint_indicator(None);
            return;
        };
        let outline = self
            .cache
            .get(ctx.project, m.layer, m.fid)
            .and_then(|g| map_geometry(ctx.project, m.layer, &g));
        ctx.feedback.set_feature_highlight(outline.as_ref());
        if let (Some(index), Some(geom)) = (m.vertex_index(), outline.as_ref()) {
            if geom.is_endpoint(index) {
                let offset = ctx.canvas.tolerance(self.config.endpoint_marker_offset_px);
                if let Some(center) = endpoint_marker_center(geom, index, offset) {
                    self.endpoint_hover = Some(EndpointHover { layer: m.layer, fid: m.fid, endpoint: index, center });
                }
            }
        }
        ctx.feedback.set_endpoint_indicator(self.endpoint_hover.map(|ep| ep.center));
    }

    fn snap_match(&self, ctx: &EditContext<'_>, map_pt: Point, drag: Option<&Drag>) -> Option<Match> {
        if !self.config.snapping {
            return None;
        }
        let project: &Project = &*ctx.project;
        let layers = project.editable_layers();
        let tol = self.search_tolerance(ctx.canvas);
        let mut not_dragged = |m: &Match| drag.map_or(true, |d| !d.is_dragged_vertex(m));
        ctx.locator
            .nearest_vertex(project, map_pt, tol, &layers, &mut not_dragged)
            .into_iter()
            .next()
    }

    // ----- drag lifecycle -----

    fn try_start_drag(&mut self, ctx: &mut EditContext<'_>, map_pt: Point) -> bool {
        let tol = self.search_tolerance(ctx.canvas);
        if let Some(ep) = self.endpoint_hover {
            if within_tolerance(ep.center.distance(&map_pt), tol) && self.start_append(ctx, ep, map_pt) {
                return true;
            }
        }
        let Some(m) = self.matcher.match_near(ctx.project, ctx.locator, map_pt, tol) else {
            return false;
        };
        if m.is_vertex() {
            return self.start_move(ctx, &m);
        }
        let center_radius = ctx.canvas.tolerance(self.config.edge_center_radius_px);
        if is_near_edge_center(&m, map_pt, center_radius) {
            return self.start_insert(ctx, &m, map_pt);
        }
        false
    }

    fn anchors_of(&mut self, project: &mut Project, vref: &VertexRef) -> Vec<Point> {
        let Some(geom) = self.cache.get(project, vref.layer, vref.fid) else {
            return Vec::new();
        };
        let (prev, next) = geom.adjacent_vertices(vref.index());
        [prev, next]
            .into_iter()
            .flatten()
            .filter_map(|i| vertex_map_point(&mut self.cache, project, vref.layer, vref.fid, i))
            .collect()
    }

    fn begin_drag(&mut self, ctx: &mut EditContext<'_>, drag: Drag) {
        self.clear_hover(ctx.feedback);
        tracing::debug!(primary = ?drag.primary, companions = drag.companions.len(), bands = drag.bands.len(), "drag started");
        self.state = ToolState::Dragging(drag);
    }

    fn start_move(&mut self, ctx: &mut EditContext<'_>, m: &Match) -> bool {
        let Some(index) = m.vertex_index() else { return false };
        let primary = VertexRef::moving(m.layer, m.fid, index);
        let companions = if ctx.project.topological_editing() {
            find_companions(ctx.project, ctx.locator, m)
        } else {
            Vec::new()
        };
        let mut bands = Vec::new();
        for vref in std::iter::once(&primary).chain(companions.iter()) {
            for anchor in self.anchors_of(ctx.project, vref) {
                bands.push(ctx.feedback.add_band(anchor, m.point));
            }
        }
        self.begin_drag(ctx, Drag { primary, companions, bands });
        true
    }

    fn start_insert(&mut self, ctx: &mut EditContext<'_>, m: &Match, map_pt: Point) -> bool {
        let Some((_, to)) = m.edge_vertices() else { return false };
        let Target::Edge { a, b, .. } = m.target else { return false };
        let primary = VertexRef::inserting(m.layer, m.fid, to);
        let bands = vec![ctx.feedback.add_band(a, map_pt), ctx.feedback.add_band(b, map_pt)];
        self.begin_drag(ctx, Drag { primary, companions: Vec::new(), bands });
        true
    }

    fn start_append(&mut self, ctx: &mut EditContext<'_>, ep: EndpointHover, map_pt: Point) -> bool {
        let Some(geom) = self.cache.get(ctx.project, ep.layer, ep.fid) else { return false };
        let Some(primary) = VertexRef::appending(ep.layer, ep.fid, &geom, ep.endpoint) else { return false };
        let Some(anchor) = vertex_map_point(&mut self.cache, ctx.project, ep.layer, ep.fid, ep.endpoint) else {
            return false;
        };
        let bands = vec![ctx.feedback.add_band(anchor, map_pt)];
        self.begin_drag(ctx, Drag { primary, companions: Vec::new(), bands });
        true
    }

    /// Leave Dragging, removing its bands. Returns the drag if there was one.
    fn end_drag(&mut self, feedback: &mut dyn Feedback) -> Option<Drag> {
        if !self.is_dragging() {
            return None;
        }
        let ToolState::Dragging(drag) = std::mem::replace(&mut self.state, ToolState::Idle) else {
            return None;
        };
        for band in &drag.bands {
            feedback.remove_band(*band);
        }
        feedback.set_snap_indicator(None);
        Some(drag)
    }

    fn cancel_drag(&mut self, ctx: &mut EditContext<'_>) {
        if self.end_drag(ctx.feedback).is_some() {
            tracing::debug!("drag cancelled");
        }
    }

    fn dismiss_rect(&mut self, ctx: &mut EditContext<'_>) {
        ctx.feedback.set_selection_rect(None);
        self.state = ToolState::Idle;
    }

    /// Destination for one dragged vertex in its layer's CRS: the snapped
    /// vertex's own stored coordinate when both layers share a CRS, otherwise
    /// the (snapped) map point reprojected.
    fn destination(&mut self, project: &mut Project, snap: Option<&Match>, layer: LayerId, map_pt: Point) -> Point {
        let Some(crs) = project.layer(layer).map(|l| l.crs()) else {
            return map_pt;
        };
        if let Some(s) = snap {
            let same_crs = project.layer(s.layer).is_some_and(|l| l.crs().same_as(&crs));
            if let (true, Some(index)) = (same_crs, s.vertex_index()) {
                if let Some(p) = self.cache.vertex(project, s.layer, s.fid, index) {
                    return p;
                }
            }
        }
        crs.to_layer(snap.map_or(map_pt, |s| s.point))
    }

    fn confirm_drag(&mut self, ctx: &mut EditContext<'_>, map_pt: Point) {
        let snap = match self.drag() {
            Some(drag) => self.snap_match(ctx, map_pt, Some(drag)),
            None => return,
        };
        let Some(drag) = self.end_drag(ctx.feedback) else { return };
        let label = match drag.primary.op.kind() {
            OpKind::Move => "Moved vertex",
            OpKind::Insert | OpKind::Append => "Added vertex",
        };
        let mut builder = BatchBuilder::new(label);
        for vref in drag.refs() {
            let p = self.destination(ctx.project, snap.as_ref(), vref.layer, map_pt);
            // Failures are logged and mark the layer for rollback.
            let _ = builder.apply(&mut self.cache, ctx.project, vref, p);
        }
        self.finish_commit(ctx, builder);
    }

    fn finish_commit(&mut self, ctx: &mut EditContext<'_>, builder: BatchBuilder) -> CommitReport {
        let report = commit(ctx.project, builder.finish());
        self.cache.sync(ctx.project);
        self.last_report = Some(report.clone());
        report
    }

    fn delete_dragged(&mut self, ctx: &mut EditContext<'_>) {
        let Some(drag) = self.end_drag(ctx.feedback) else { return };
        if !drag.primary.is_move() {
            // Nothing exists yet for an insert/append; deleting just drops it.
            tracing::debug!("pending insertion discarded");
            return;
        }
        let refs: Vec<VertexRef> = drag.refs().copied().collect();
        self.delete_refs(ctx, &refs);
    }

    fn delete_selection(&mut self, ctx: &mut EditContext<'_>) {
        let refs = self.selection.entries().to_vec();
        self.selection.clear(ctx.feedback);
        // Part-local position of a lone vertex, read before it disappears.
        let lone = match refs.as_slice() {
            [only] => self
                .cache
                .get(ctx.project, only.layer, only.fid)
                .and_then(|g| Some((g.position_of(only.index())?, g.part_count()))),
            _ => None,
        };
        let statuses = self.delete_refs(ctx, &refs);
        // A lone deleted vertex hands the selection to its predecessor in the
        // same part, or to vertex 0 once that part is gone.
        if let ([only], Some((pos, parts_before))) = (refs.as_slice(), lone) {
            let ok = statuses.get(&(only.layer, only.fid)) == Some(&DeleteStatus::Success)
                && self.last_report.as_ref().is_some_and(|r| r.committed.contains(&only.layer));
            if ok {
                let index = self
                    .cache
                    .get(ctx.project, only.layer, only.fid)
                    .filter(|g| g.part_count() == parts_before)
                    .and_then(|g| g.part_offset(pos.part))
                    .map_or(0, |offset| offset + pos.vertex.saturating_sub(1));
                let next = VertexRef::moving(only.layer, only.fid, index);
                self.selection.set(vec![next], &mut self.cache, ctx.project, ctx.feedback);
            }
        }
    }

    fn delete_refs(&mut self, ctx: &mut EditContext<'_>, refs: &[VertexRef]) -> BTreeMap<(LayerId, FeatureId), DeleteStatus> {
        let mut groups: BTreeMap<(LayerId, FeatureId), Vec<usize>> = BTreeMap::new();
        for r in refs {
            groups.entry((r.layer, r.fid)).or_default().push(r.index());
        }
        let mut builder = BatchBuilder::new("Deleted vertex");
        let mut statuses = BTreeMap::new();
        for ((layer, fid), indices) in groups {
            let status = builder
                .delete(&mut self.cache, ctx.project, layer, fid, &indices)
                .unwrap_or(DeleteStatus::Failure);
            statuses.insert((layer, fid), status);
        }
        self.finish_commit(ctx, builder);
        statuses
    }

    // ----- rectangle selection -----

    fn vertices_in_rect(&mut self, ctx: &mut EditContext<'_>, map_rect: Rect) -> Vec<VertexRef> {
        let mut refs = Vec::new();
        for layer in ctx.project.editable_layers() {
            let Some(store) = ctx.project.layer(layer) else { continue };
            let layer_rect = store.crs().rect_to_layer(&map_rect);
            let probe = layer_rect.expanded(EPS_COORD);
            for fid in store.feature_ids() {
                let Some(geom) = self.cache.get(ctx.project, layer, fid) else { continue };
                if !geom.bbox().is_some_and(|bb| bb.intersects(&probe)) {
                    continue;
                }
                for index in geom.distinct_vertex_indices() {
                    if geom.vertex_at(index).is_some_and(|v| rect_contains(&layer_rect, v)) {
                        refs.push(VertexRef::moving(layer, fid, index));
                    }
                }
            }
        }
        refs
    }
}
